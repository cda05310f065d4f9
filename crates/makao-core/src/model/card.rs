use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CardError {
    #[error("{0} is not a valid card suit")]
    InvalidSuit(u8),
    #[error("a card's rank has to be between 1 and 13, got {0}")]
    RankOutOfRange(u8),
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    /// Builds a card from raw suit (1..=4) and rank (1..=13) values.
    pub fn from_values(suit: u8, rank: u8) -> Result<Self, CardError> {
        let suit = Suit::from_value(suit).ok_or(CardError::InvalidSuit(suit))?;
        let rank = Rank::from_value(rank).ok_or(CardError::RankOutOfRange(rank))?;
        Ok(Self { rank, suit })
    }

    /// Whether this card may be put on `top`. Queens go on anything and take anything.
    pub fn can_follow(self, top: Card) -> bool {
        self.rank == top.rank
            || self.suit == top.suit
            || self.rank == Rank::Queen
            || top.rank == Rank::Queen
    }

    pub const fn is_king_of_spades(self) -> bool {
        matches!(self.rank, Rank::King) && matches!(self.suit, Suit::Spades)
    }

    pub const fn is_king_of_hearts(self) -> bool {
        matches!(self.rank, Rank::King) && matches!(self.suit, Suit::Hearts)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit.symbol())
    }
}
