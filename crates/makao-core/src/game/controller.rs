use crate::game::event::GameEvent;
use crate::model::card::Card;
use crate::model::hand::{Hand, HandError};
use crate::model::pile::Pile;
use crate::model::player::{PlayerState, Seat};
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use thiserror::Error;

/// One submitted move. `Play` indexes are zero-based positions in the hand,
/// in the order the cards go on the pile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Move {
    Pass,
    Play {
        indexes: Vec<usize>,
        declare_last_card: bool,
    },
}

impl Move {
    pub fn single(index: usize) -> Self {
        Move::Play {
            indexes: vec![index],
            declare_last_card: false,
        }
    }

    pub fn declaring(mut self) -> Self {
        if let Move::Play {
            declare_last_card, ..
        } = &mut self
        {
            *declare_last_card = true;
        }
        self
    }
}

/// Answer to "you drew a playable card, play it now?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawnCardDecision {
    Keep,
    Play { declare_last_card: bool },
}

/// Why a submitted move was sent back. Nothing has been applied when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("no cards were selected")]
    NoCards,
    #[error("card {} does not exist (hand has {len})", .index + 1)]
    IndexOutOfRange { index: usize, len: usize },
    #[error("card {} was selected twice", .0 + 1)]
    DuplicateIndex(usize),
    #[error("only a single card can be played this turn")]
    SingleCardOnly,
    #[error("you cannot play a {0} this turn")]
    RankNotAllowed(Rank),
    #[error("you cannot put this card on top of the card pile")]
    IllegalCombo,
    #[error("the forced rank has to be between 5 and 10, got {0}")]
    RankOutsideJackRange(Rank),
}

impl From<HandError> for MoveError {
    fn from(value: HandError) -> Self {
        match value {
            HandError::IndexOutOfRange { index, len } => MoveError::IndexOutOfRange { index, len },
            HandError::DuplicateIndex(index) => MoveError::DuplicateIndex(index),
            HandError::Empty => MoveError::NoCards,
        }
    }
}

/// Read-only picture of the table handed to whoever is deciding.
#[derive(Debug, Clone, Copy)]
pub struct TurnView<'a> {
    pub seat: Seat,
    pub player: &'a PlayerState,
    pub players: &'a [PlayerState],
    pub pile: &'a Pile,
    pub deck_len: usize,
}

impl<'a> TurnView<'a> {
    pub fn hand(&self) -> &'a Hand {
        self.player.hand()
    }

    /// Whether `card` alone would be accepted as this player's move.
    pub fn is_playable(&self, card: Card) -> bool {
        self.player.may_play(card.rank) && self.pile.is_valid_combo(&[card])
    }

    pub fn playable_indexes(&self) -> Vec<usize> {
        self.hand()
            .iter()
            .enumerate()
            .filter(|(_, card)| self.is_playable(**card))
            .map(|(index, _)| index)
            .collect()
    }
}

/// The seam between the engine and whoever sits in a seat: a terminal
/// prompt, the automated opponent, or a scripted test double.
pub trait Controller {
    fn choose_move(&mut self, view: &TurnView<'_>) -> Move;

    /// Called right after this player's Ace lands on top.
    fn choose_suit(&mut self, view: &TurnView<'_>) -> Suit;

    /// Called right after this player's Jack lands on top.
    fn choose_rank(&mut self, view: &TurnView<'_>) -> Rank;

    fn decide_drawn_card(&mut self, view: &TurnView<'_>, card: Card) -> DrawnCardDecision;

    fn reject(&mut self, _view: &TurnView<'_>, _error: &MoveError) {}

    fn notify(&mut self, _event: &GameEvent) {}
}

#[cfg(test)]
mod tests {
    use super::{Move, MoveError, TurnView};
    use crate::model::card::Card;
    use crate::model::hand::{Hand, HandError};
    use crate::model::pile::Pile;
    use crate::model::player::{PlayerState, Seat, Status};
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    #[test]
    fn declaring_marks_play_moves_only() {
        assert_eq!(
            Move::single(2).declaring(),
            Move::Play {
                indexes: vec![2],
                declare_last_card: true
            }
        );
        assert_eq!(Move::Pass.declaring(), Move::Pass);
    }

    #[test]
    fn hand_errors_map_to_move_errors() {
        assert_eq!(MoveError::from(HandError::Empty), MoveError::NoCards);
        assert_eq!(
            MoveError::from(HandError::IndexOutOfRange { index: 6, len: 5 }).to_string(),
            "card 7 does not exist (hand has 5)"
        );
    }

    #[test]
    fn playable_indexes_honor_restrictions() {
        let hand = Hand::with_cards(vec![
            Card::new(Rank::Two, Suit::Hearts),
            Card::new(Rank::Four, Suit::Clubs),
            Card::new(Rank::Nine, Suit::Clubs),
        ]);
        let player = PlayerState::with_hand("Alice", hand);
        let pile = Pile::new(Card::new(Rank::Four, Suit::Hearts));
        let players = vec![player.clone()];
        let view = TurnView {
            seat: Seat::new(0),
            player: &player,
            players: &players,
            pile: &pile,
            deck_len: 10,
        };
        // sorted: 4C, 9C, 2H
        assert_eq!(view.playable_indexes(), vec![0, 2]);

        let mut restricted = player.clone();
        restricted.set_status(Status::Blocked);
        restricted.set_allowed_ranks(vec![Rank::Four]);
        let view = TurnView {
            player: &restricted,
            ..view
        };
        assert_eq!(view.playable_indexes(), vec![0]);
    }
}
