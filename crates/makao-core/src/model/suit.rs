use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Suit {
    Spades = 1,
    Diamonds = 2,
    Clubs = 3,
    Hearts = 4,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Diamonds, Suit::Clubs, Suit::Hearts];

    pub const fn from_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(Suit::Spades),
            2 => Some(Suit::Diamonds),
            3 => Some(Suit::Clubs),
            4 => Some(Suit::Hearts),
            _ => None,
        }
    }

    pub const fn value(self) -> u8 {
        self as u8
    }

    pub const fn is_red(self) -> bool {
        matches!(self, Suit::Diamonds | Suit::Hearts)
    }

    pub const fn symbol(self) -> char {
        match self {
            Suit::Spades => '\u{2660}',
            Suit::Diamonds => '\u{2666}',
            Suit::Clubs => '\u{2663}',
            Suit::Hearts => '\u{2665}',
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Suit::Spades => "Spades",
            Suit::Diamonds => "Diamonds",
            Suit::Clubs => "Clubs",
            Suit::Hearts => "Hearts",
        };
        f.write_str(name)
    }
}
