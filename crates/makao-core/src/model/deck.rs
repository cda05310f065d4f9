use crate::model::card::Card;
use crate::model::pile::Pile;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeckError {
    #[error("the deck is empty")]
    EmptyDeck,
}

/// Draw source. Cards are drawn from the end of `cards`.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
    rng: StdRng,
}

impl Deck {
    pub fn standard_cards() -> Vec<Card> {
        let mut cards = Vec::with_capacity(52);
        for suit in Suit::ALL.iter().copied() {
            for rank in Rank::ORDERED.iter().copied() {
                cards.push(Card::new(rank, suit));
            }
        }
        cards
    }

    /// Unshuffled 52-card deck; `seed` drives later reshuffles.
    pub fn standard(seed: u64) -> Self {
        Self {
            cards: Self::standard_cards(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn shuffled_with_seed(seed: u64) -> Self {
        let mut deck = Self::standard(seed);
        deck.shuffle();
        deck
    }

    /// Deck that draws `cards` last-to-first. Used to stage deterministic deals.
    pub fn stacked(cards: Vec<Card>, seed: u64) -> Self {
        Self {
            cards,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn shuffle(&mut self) {
        self.cards.shuffle(&mut self.rng);
    }

    /// Restores the canonical 52 cards and shuffles them.
    pub fn refresh(&mut self) {
        self.cards = Self::standard_cards();
        self.shuffle();
    }

    /// Draws the next card, recycling everything under the pile's top card
    /// when the deck runs dry.
    pub fn draw(&mut self, pile: &mut Pile) -> Result<Card, DeckError> {
        if self.cards.is_empty() {
            let recycled = pile.remove_bottom_cards();
            if !recycled.is_empty() {
                tracing::debug!(
                    target: "makao_core::deck",
                    recycled = recycled.len(),
                    "deck empty, recycling pile"
                );
                self.cards = recycled;
                self.shuffle();
            }
        }
        self.cards.pop().ok_or(DeckError::EmptyDeck)
    }

    /// Draws straight from the deck without touching the pile. Only valid
    /// while dealing, before the pile holds anything worth recycling.
    pub(crate) fn draw_fresh(&mut self) -> Result<Card, DeckError> {
        self.cards.pop().ok_or(DeckError::EmptyDeck)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}
