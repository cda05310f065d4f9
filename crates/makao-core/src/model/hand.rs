use crate::model::card::Card;
use std::vec::Vec;
use thiserror::Error;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<Card>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandError {
    #[error("card index {index} is out of range for a hand of {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("card index {0} was given more than once")]
    DuplicateIndex(usize),
    #[error("no card indexes were given")]
    Empty,
}

impl Hand {
    pub fn new() -> Self {
        Self { cards: Vec::new() }
    }

    pub fn with_cards(cards: Vec<Card>) -> Self {
        let mut hand = Self { cards };
        hand.sort();
        hand
    }

    pub fn add(&mut self, card: Card) {
        self.cards.push(card);
        self.sort();
    }

    /// Checks `indexes` against the current hand without touching it.
    pub fn check_indexes(&self, indexes: &[usize]) -> Result<(), HandError> {
        if indexes.is_empty() {
            return Err(HandError::Empty);
        }
        for (position, &index) in indexes.iter().enumerate() {
            if index >= self.cards.len() {
                return Err(HandError::IndexOutOfRange {
                    index,
                    len: self.cards.len(),
                });
            }
            if indexes[..position].contains(&index) {
                return Err(HandError::DuplicateIndex(index));
            }
        }
        Ok(())
    }

    /// Removes every card named by `indexes` (positions in the hand before any
    /// removal) and returns them in the order the indexes were given.
    pub fn take(&mut self, indexes: &[usize]) -> Result<Vec<Card>, HandError> {
        self.check_indexes(indexes)?;
        let taken: Vec<Card> = indexes.iter().map(|&index| self.cards[index]).collect();
        let mut position = 0;
        self.cards.retain(|_| {
            let keep = !indexes.contains(&position);
            position += 1;
            keep
        });
        Ok(taken)
    }

    pub fn get(&self, index: usize) -> Option<Card> {
        self.cards.get(index).copied()
    }

    pub fn position(&self, card: Card) -> Option<usize> {
        self.cards.iter().position(|&c| c == card)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    fn sort(&mut self) {
        self.cards
            .sort_by(|a, b| a.suit.cmp(&b.suit).then(a.rank.cmp(&b.rank)));
    }
}

#[cfg(test)]
mod tests {
    use super::{Hand, HandError};
    use crate::model::card::Card;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    fn sample() -> Hand {
        Hand::with_cards(vec![
            Card::new(Rank::Two, Suit::Spades),
            Card::new(Rank::Nine, Suit::Diamonds),
            Card::new(Rank::Queen, Suit::Hearts),
            Card::new(Rank::Five, Suit::Clubs),
        ])
    }

    #[test]
    fn cards_are_sorted_by_suit_then_rank() {
        let mut hand = Hand::new();
        hand.add(Card::new(Rank::King, Suit::Hearts));
        hand.add(Card::new(Rank::Two, Suit::Spades));
        hand.add(Card::new(Rank::Ace, Suit::Spades));
        let ordered: Vec<_> = hand.iter().copied().collect();
        assert_eq!(ordered[0], Card::new(Rank::Ace, Suit::Spades));
        assert_eq!(ordered[1], Card::new(Rank::Two, Suit::Spades));
        assert_eq!(ordered[2], Card::new(Rank::King, Suit::Hearts));
    }

    #[test]
    fn take_uses_positions_before_removal() {
        let mut hand = sample();
        let taken = hand.take(&[3, 0]).unwrap();
        assert_eq!(
            taken,
            vec![
                Card::new(Rank::Queen, Suit::Hearts),
                Card::new(Rank::Two, Suit::Spades)
            ]
        );
        assert_eq!(
            hand.cards(),
            &[
                Card::new(Rank::Nine, Suit::Diamonds),
                Card::new(Rank::Five, Suit::Clubs)
            ]
        );
    }

    #[test]
    fn take_out_of_range_leaves_hand_untouched() {
        let mut hand = sample();
        let err = hand.take(&[1, 4]).unwrap_err();
        assert_eq!(err, HandError::IndexOutOfRange { index: 4, len: 4 });
        assert_eq!(hand.len(), 4);
    }

    #[test]
    fn take_rejects_duplicates_and_empty_selection() {
        let mut hand = sample();
        assert_eq!(hand.take(&[2, 2]), Err(HandError::DuplicateIndex(2)));
        assert_eq!(hand.take(&[]), Err(HandError::Empty));
        assert_eq!(hand.len(), 4);
    }
}
