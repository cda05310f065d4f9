use crate::bot::{BotDifficulty, PlayPlanner, optimal_rank, optimal_suit};
use makao_core::game::controller::{Controller, DrawnCardDecision, Move, MoveError, TurnView};
use makao_core::model::card::Card;
use makao_core::model::rank::Rank;
use makao_core::model::suit::Suit;
use tracing::{Level, event};

/// Automated opponent: no lookahead, plays what the planner finds legal.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicPolicy {
    difficulty: BotDifficulty,
}

impl HeuristicPolicy {
    pub fn new(difficulty: BotDifficulty) -> Self {
        Self { difficulty }
    }

    pub fn easy() -> Self {
        Self::new(BotDifficulty::Easy)
    }

    pub fn normal() -> Self {
        Self::new(BotDifficulty::Normal)
    }

    pub fn difficulty(&self) -> BotDifficulty {
        self.difficulty
    }
}

impl Controller for HeuristicPolicy {
    fn choose_move(&mut self, view: &TurnView<'_>) -> Move {
        let Some(indexes) = PlayPlanner::choose(view, self.difficulty) else {
            log_play_decision(view, self.difficulty, &[], "no_legal_card");
            return Move::Pass;
        };
        let chosen: Vec<Card> = indexes
            .iter()
            .filter_map(|&index| view.hand().get(index))
            .collect();
        log_play_decision(view, self.difficulty, &chosen, play_reason(&indexes));

        let declare_last_card = view.hand().len() == indexes.len() + 1;
        Move::Play {
            indexes,
            declare_last_card,
        }
    }

    fn choose_suit(&mut self, view: &TurnView<'_>) -> Suit {
        let suit = optimal_suit(view.hand());
        event!(
            target: "makao_bot::play",
            Level::INFO,
            seat = view.seat.index(),
            %suit,
            "suit forced"
        );
        suit
    }

    fn choose_rank(&mut self, view: &TurnView<'_>) -> Rank {
        let rank = optimal_rank(view.hand());
        event!(
            target: "makao_bot::play",
            Level::INFO,
            seat = view.seat.index(),
            %rank,
            "rank forced"
        );
        rank
    }

    fn decide_drawn_card(&mut self, view: &TurnView<'_>, card: Card) -> DrawnCardDecision {
        log_play_decision(view, self.difficulty, &[card], "drawn_card");
        DrawnCardDecision::Play {
            declare_last_card: view.hand().len() == 2,
        }
    }

    fn reject(&mut self, view: &TurnView<'_>, error: &MoveError) {
        event!(
            target: "makao_bot::play",
            Level::WARN,
            seat = view.seat.index(),
            %error,
            "planned move was rejected"
        );
    }
}

fn play_reason(indexes: &[usize]) -> &'static str {
    if indexes.len() > 1 {
        "same_rank_group"
    } else {
        "first_legal"
    }
}

fn log_play_decision(
    view: &TurnView<'_>,
    difficulty: BotDifficulty,
    chosen: &[Card],
    reason: &str,
) {
    if !tracing::enabled!(target: "makao_bot::play", Level::INFO) {
        return;
    }

    let choice = chosen
        .iter()
        .map(|card| card.to_string())
        .collect::<Vec<_>>()
        .join(",");

    event!(
        target: "makao_bot::play",
        Level::INFO,
        seat = view.seat.index(),
        difficulty = difficulty.as_str(),
        hand_size = view.hand().len(),
        legal_count = view.playable_indexes().len(),
        status = %view.player.status(),
        top = %view.pile.top(),
        chosen = %choice,
        reason,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use makao_core::game::engine::TurnEngine;
    use makao_core::model::hand::Hand;
    use makao_core::model::pile::Pile;
    use makao_core::model::player::{PlayerState, Seat};

    fn with_view<T>(cards: Vec<Card>, top: Card, f: impl FnOnce(&TurnView<'_>) -> T) -> T {
        let player = PlayerState::with_hand("Bot", Hand::with_cards(cards));
        let players = vec![player.clone()];
        let pile = Pile::new(top);
        let view = TurnView {
            seat: Seat::new(1),
            player: &player,
            players: &players,
            pile: &pile,
            deck_len: 30,
        };
        f(&view)
    }

    #[test]
    fn declares_when_one_card_will_be_left() {
        let cards = vec![
            Card::new(Rank::Nine, Suit::Hearts),
            Card::new(Rank::Ten, Suit::Clubs),
        ];
        let chosen = with_view(cards, Card::new(Rank::Five, Suit::Hearts), |view| {
            HeuristicPolicy::easy().choose_move(view)
        });
        assert_eq!(chosen, Move::single(1).declaring());
    }

    #[test]
    fn group_plays_are_logged_as_groups() {
        let cards = vec![
            Card::new(Rank::Seven, Suit::Hearts),
            Card::new(Rank::Seven, Suit::Clubs),
            Card::new(Rank::Nine, Suit::Hearts),
        ];
        let chosen = with_view(cards, Card::new(Rank::Five, Suit::Hearts), |view| {
            HeuristicPolicy::normal().choose_move(view)
        });
        let Move::Play { indexes, .. } = chosen else {
            panic!("expected a play");
        };
        assert_eq!(indexes.len(), 2);
        assert_eq!(play_reason(&indexes), "same_rank_group");
        assert_eq!(play_reason(&[0]), "first_legal");
    }

    #[test]
    fn passes_without_a_legal_card() {
        let cards = vec![Card::new(Rank::Nine, Suit::Spades)];
        let chosen = with_view(cards, Card::new(Rank::Five, Suit::Hearts), |view| {
            HeuristicPolicy::normal().choose_move(view)
        });
        assert_eq!(chosen, Move::Pass);
    }

    #[test]
    fn always_plays_a_drawn_card() {
        let cards = vec![
            Card::new(Rank::Six, Suit::Hearts),
            Card::new(Rank::Ten, Suit::Clubs),
        ];
        let decision = with_view(cards, Card::new(Rank::Five, Suit::Hearts), |view| {
            HeuristicPolicy::easy().decide_drawn_card(view, Card::new(Rank::Six, Suit::Hearts))
        });
        assert_eq!(
            decision,
            DrawnCardDecision::Play {
                declare_last_card: true
            }
        );
    }

    #[test]
    fn bots_finish_a_seeded_game() {
        let mut engine = TurnEngine::new("Bot", 3, 2024).unwrap();
        let mut seats: Vec<Box<dyn Controller>> = vec![
            Box::new(HeuristicPolicy::easy()),
            Box::new(HeuristicPolicy::normal()),
            Box::new(HeuristicPolicy::easy()),
            Box::new(HeuristicPolicy::normal()),
        ];
        let result = engine.run(&mut seats, 5000).unwrap();
        assert_eq!(result.ranking.len(), 4);
        assert_eq!(engine.snapshot().card_count(), 52);
        if !result.stalled {
            assert_eq!(result.winners.len(), 3);
        }
    }
}
