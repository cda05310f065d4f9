use crate::model::card::Card;
use crate::model::hand::{Hand, HandError};
use crate::model::rank::Rank;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Position at the table, zero-based in seating order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seat(u8);

impl Seat {
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub fn all(count: usize) -> impl Iterator<Item = Seat> {
        (0..count as u8).map(Seat)
    }

    pub const fn next(self, count: usize) -> Seat {
        Seat(((self.0 as usize + 1) % count) as u8)
    }

    pub const fn previous(self, count: usize) -> Seat {
        Seat(((self.0 as usize + count - 1) % count) as u8)
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seat {}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Status {
    #[default]
    Clear,
    /// Owes the cards of one or more 2s and 3s.
    PendingDraw,
    Blocked,
    /// Owes the rank chosen after a Jack.
    ForcedRank,
    /// Owes five cards per King of Spades or Hearts.
    PendingDrawFive,
}

impl Status {
    /// Ranks that let a player answer this status instead of suffering it.
    pub fn escape_ranks(self) -> Vec<Rank> {
        match self {
            Status::Clear | Status::ForcedRank => Vec::new(),
            Status::PendingDraw => vec![Rank::Two, Rank::Three],
            Status::Blocked => vec![Rank::Four],
            Status::PendingDrawFive => vec![Rank::King],
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Status::Clear => "no effect",
            Status::PendingDraw => "about to draw",
            Status::Blocked => "blocked",
            Status::ForcedRank => "forced rank",
            Status::PendingDrawFive => "about to draw (king)",
        };
        f.write_str(label)
    }
}

/// Status plus counters, lifted out of one player and written into another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CarriedEffect {
    pub status: Status,
    pub block_turns_total: u32,
    pub block_turns_left: u32,
    pub draw_debt: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerState {
    name: String,
    hand: Hand,
    status: Status,
    block_turns_total: u32,
    block_turns_left: u32,
    draw_debt: u32,
    allowed_ranks: Vec<Rank>,
    has_won: bool,
    declared_last_card: bool,
}

impl PlayerState {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_hand(name, Hand::new())
    }

    pub fn with_hand(name: impl Into<String>, hand: Hand) -> Self {
        Self {
            name: name.into(),
            hand,
            status: Status::Clear,
            block_turns_total: 0,
            block_turns_left: 0,
            draw_debt: 0,
            allowed_ranks: Vec::new(),
            has_won: false,
            declared_last_card: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn block_turns_total(&self) -> u32 {
        self.block_turns_total
    }

    pub fn block_turns_left(&self) -> u32 {
        self.block_turns_left
    }

    pub fn draw_debt(&self) -> u32 {
        self.draw_debt
    }

    /// Empty means unrestricted.
    pub fn allowed_ranks(&self) -> &[Rank] {
        &self.allowed_ranks
    }

    pub fn is_restricted(&self) -> bool {
        !self.allowed_ranks.is_empty()
    }

    pub fn permits(&self, rank: Rank) -> bool {
        self.allowed_ranks.is_empty() || self.allowed_ranks.contains(&rank)
    }

    /// Rank check for this player's next card. A Jack always answers a forced rank.
    pub fn may_play(&self, rank: Rank) -> bool {
        self.permits(rank) || (self.status == Status::ForcedRank && rank == Rank::Jack)
    }

    pub fn has_won(&self) -> bool {
        self.has_won
    }

    pub fn declared_last_card(&self) -> bool {
        self.declared_last_card
    }

    pub fn is_blocked(&self) -> bool {
        self.status == Status::Blocked
    }

    pub fn add_card(&mut self, card: Card) {
        self.hand.add(card);
    }

    /// Removes the cards at `indexes` atomically; see [`Hand::take`].
    pub fn remove_cards(&mut self, indexes: &[usize]) -> Result<Vec<Card>, HandError> {
        self.hand.take(indexes)
    }

    pub fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    pub fn set_allowed_ranks(&mut self, ranks: Vec<Rank>) {
        self.allowed_ranks = ranks;
    }

    pub fn add_draw_debt(&mut self, status: Status, count: u32) {
        self.status = status;
        self.draw_debt += count;
    }

    /// Draw debt that comes with no status, such as the last-card penalty.
    pub fn add_penalty(&mut self, count: u32) {
        self.draw_debt += count;
    }

    pub fn add_block(&mut self) {
        self.status = Status::Blocked;
        self.block_turns_total += 1;
        self.block_turns_left += 1;
    }

    /// Serves one blocked turn; lifts the block once none are left.
    pub fn serve_block_turn(&mut self) -> u32 {
        self.block_turns_left = self.block_turns_left.saturating_sub(1);
        if self.block_turns_left == 0 {
            self.block_turns_total = 0;
            if self.status == Status::Blocked {
                self.clear_status();
            }
        }
        self.block_turns_left
    }

    /// Zeroes the draw debt after it was paid; discharges draw statuses.
    pub fn settle_draw_debt(&mut self) {
        self.draw_debt = 0;
        if matches!(self.status, Status::PendingDraw | Status::PendingDrawFive) {
            self.clear_status();
        }
    }

    /// The single discharge: status, counters and rank restriction reset together.
    pub fn clear_status(&mut self) {
        self.status = Status::Clear;
        self.block_turns_total = 0;
        self.block_turns_left = 0;
        self.draw_debt = 0;
        self.allowed_ranks.clear();
    }

    /// Lifts the current effect out of this player and discharges it.
    pub fn take_effect(&mut self) -> CarriedEffect {
        let carried = CarriedEffect {
            status: self.status,
            block_turns_total: self.block_turns_total,
            block_turns_left: self.block_turns_left,
            draw_debt: self.draw_debt,
        };
        self.clear_status();
        carried
    }

    /// Overwrites this player's status and counters with `carried`.
    pub fn receive_effect(&mut self, carried: CarriedEffect) {
        self.status = carried.status;
        self.block_turns_total = carried.block_turns_total;
        self.block_turns_left = carried.block_turns_left;
        self.draw_debt = carried.draw_debt;
    }

    pub fn declare_last_card(&mut self) {
        self.declared_last_card = true;
    }

    pub fn reset_declaration(&mut self) {
        self.declared_last_card = false;
    }

    pub fn win_game(&mut self) {
        self.has_won = true;
    }
}

/// Copies `from`'s effect onto `to` and discharges `from`.
pub fn transfer_effect(players: &mut [PlayerState], from: Seat, to: Seat) -> CarriedEffect {
    let carried = players[from.index()].take_effect();
    players[to.index()].receive_effect(carried);
    carried
}
