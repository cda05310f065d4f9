mod play;

pub use play::PlayPlanner;

use makao_core::game::engine::is_forceable;
use makao_core::model::hand::Hand;
use makao_core::model::rank::Rank;
use makao_core::model::suit::Suit;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BotDifficulty {
    /// First legal card, one card at a time.
    #[default]
    Easy,
    /// Sheds whole same-rank groups when the turn allows it.
    Normal,
}

impl BotDifficulty {
    pub fn from_env() -> Self {
        static CACHED: OnceLock<BotDifficulty> = OnceLock::new();
        *CACHED.get_or_init(|| {
            std::env::var("MAKAO_BOT_DIFFICULTY")
                .ok()
                .and_then(|raw| Self::parse(&raw))
                .unwrap_or_default()
        })
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "easy" | "legacy" => Some(BotDifficulty::Easy),
            "normal" | "default" => Some(BotDifficulty::Normal),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BotDifficulty::Easy => "easy",
            BotDifficulty::Normal => "normal",
        }
    }
}

pub(crate) fn count_cards_in_suit(hand: &Hand, suit: Suit) -> usize {
    hand.iter().filter(|card| card.suit == suit).count()
}

pub(crate) fn count_cards_of_rank(hand: &Hand, rank: Rank) -> usize {
    hand.iter().filter(|card| card.rank == rank).count()
}

/// Most common suit in `hand`; ties go to the earlier suit in Spades,
/// Diamonds, Clubs, Hearts order.
pub fn optimal_suit(hand: &Hand) -> Suit {
    let mut best = Suit::Spades;
    let mut best_count = 0;
    for suit in Suit::ALL {
        let count = count_cards_in_suit(hand, suit);
        if count > best_count {
            best = suit;
            best_count = count;
        }
    }
    best
}

/// Most common rank a Jack may force; ties go to the lower rank.
pub fn optimal_rank(hand: &Hand) -> Rank {
    let mut best = Rank::Five;
    let mut best_count = 0;
    for rank in Rank::ORDERED.into_iter().filter(|&rank| is_forceable(rank)) {
        let count = count_cards_of_rank(hand, rank);
        if count > best_count {
            best = rank;
            best_count = count;
        }
    }
    best
}
