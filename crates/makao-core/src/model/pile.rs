use crate::model::card::Card;
use crate::model::player::Seat;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use std::fmt;

/// Face-up discard pile plus the two forced constraints set by Aces and Jacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pile {
    history: Vec<Card>,
    forced_suit: Option<Suit>,
    forced_rank: Option<Rank>,
}

/// Who a card placed by the acting player can address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Addressing {
    pub previous: Seat,
    pub next: Seat,
    /// Every seat that has not won yet, in seating order.
    pub contenders: Vec<Seat>,
}

/// What a card did when it landed on the pile. The engine applies these in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardEffect {
    None,
    Draw { target: Seat, count: u32 },
    Block { target: Seat },
    /// King of Spades: five cards for the previous player, answered on the spot.
    KingOfSpades { target: Seat },
    /// King of Hearts: five cards for the next player at their own turn.
    KingOfHearts { target: Seat },
    /// Jack: every contender owes the rank the player is about to choose.
    JackPlayed { targets: Vec<Seat> },
    /// Ace: the player is about to choose a suit.
    AcePlayed,
}

impl Pile {
    pub fn new(seed: Card) -> Self {
        Self {
            history: vec![seed],
            forced_suit: None,
            forced_rank: None,
        }
    }

    pub fn top(&self) -> Card {
        // `history` always keeps at least the seed card.
        self.history[self.history.len() - 1]
    }

    pub fn history(&self) -> &[Card] {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn forced_suit(&self) -> Option<Suit> {
        self.forced_suit
    }

    pub fn forced_rank(&self) -> Option<Rank> {
        self.forced_rank
    }

    pub fn force_suit(&mut self, suit: Suit) {
        tracing::debug!(target: "makao_core::pile", %suit, "forced suit set");
        self.forced_suit = Some(suit);
    }

    pub fn force_rank(&mut self, rank: Rank) {
        tracing::debug!(target: "makao_core::pile", %rank, "forced rank set");
        self.forced_rank = Some(rank);
    }

    pub fn release_forced_rank(&mut self) {
        if self.forced_rank.take().is_some() {
            tracing::debug!(target: "makao_core::pile", "forced rank released");
        }
    }

    /// Whether `cards`, played in this order, may go on the pile right now.
    pub fn is_valid_combo(&self, cards: &[Card]) -> bool {
        let Some((&first, rest)) = cards.split_first() else {
            return false;
        };
        if !self.accepts_first(first) {
            return false;
        }
        let mut previous = first;
        for &card in rest {
            if !card.can_follow(previous) {
                return false;
            }
            previous = card;
        }
        true
    }

    fn accepts_first(&self, card: Card) -> bool {
        let top = self.top();
        if let Some(suit) = self.forced_suit {
            return card.rank == top.rank || card.suit == suit;
        }
        if let Some(rank) = self.forced_rank {
            return card.rank == rank || (card.rank == Rank::Jack && top.rank == Rank::Jack);
        }
        card.can_follow(top)
    }

    /// Appends `cards` one at a time and reports each card's effect in order.
    /// Any pending forced suit is consumed by the first card placed.
    pub fn add_cards_on_top(&mut self, cards: &[Card], addressing: &Addressing) -> Vec<CardEffect> {
        cards
            .iter()
            .map(|&card| {
                self.history.push(card);
                if self.forced_suit.take().is_some() {
                    tracing::debug!(target: "makao_core::pile", "forced suit consumed");
                }
                Self::effect_of(card, addressing)
            })
            .collect()
    }

    fn effect_of(card: Card, addressing: &Addressing) -> CardEffect {
        match card.rank {
            Rank::Two | Rank::Three => CardEffect::Draw {
                target: addressing.next,
                count: u32::from(card.rank.value()),
            },
            Rank::Four => CardEffect::Block {
                target: addressing.next,
            },
            Rank::Jack => CardEffect::JackPlayed {
                targets: addressing.contenders.clone(),
            },
            Rank::King if card.is_king_of_spades() => CardEffect::KingOfSpades {
                target: addressing.previous,
            },
            Rank::King if card.is_king_of_hearts() => CardEffect::KingOfHearts {
                target: addressing.next,
            },
            Rank::Ace => CardEffect::AcePlayed,
            _ => CardEffect::None,
        }
    }

    /// Hands every card except the top back for reshuffling.
    pub fn remove_bottom_cards(&mut self) -> Vec<Card> {
        let top = self.top();
        let mut donated = std::mem::replace(&mut self.history, vec![top]);
        donated.pop();
        donated
    }

    #[cfg(test)]
    pub(crate) fn push_unchecked(&mut self, card: Card) {
        self.history.push(card);
    }
}

impl fmt::Display for Pile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "The card at the top is {}", self.top())?;
        if let Some(suit) = self.forced_suit {
            write!(f, " (suit forced to {suit})")?;
        }
        if let Some(rank) = self.forced_rank {
            write!(f, " (rank forced to {rank})")?;
        }
        Ok(())
    }
}
