use crate::model::card::Card;
use crate::model::player::{Seat, Status};
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use serde::Serialize;

/// Everything observable that happens during a turn, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    TurnStarted {
        seat: Seat,
        turn: u64,
    },
    /// The acting player is told what they owe before choosing a move.
    Briefed {
        seat: Seat,
        status: Status,
        draw_debt: u32,
        block_turns_left: u32,
        can_escape: bool,
    },
    Played {
        seat: Seat,
        cards: Vec<Card>,
        cards_left: usize,
    },
    Passed {
        seat: Seat,
        drew: bool,
    },
    StatusGranted {
        seat: Seat,
        status: Status,
        draw_debt: u32,
        block_turns_left: u32,
    },
    EffectTransferred {
        from: Seat,
        to: Seat,
        status: Status,
    },
    EffectNegated {
        seat: Seat,
    },
    SuitForced {
        seat: Seat,
        suit: Suit,
    },
    RankForced {
        seat: Seat,
        rank: Rank,
    },
    ForcedRankReleased,
    SubTurn {
        seat: Seat,
    },
    CardsDrawn {
        seat: Seat,
        count: u32,
        hand_size: usize,
    },
    DeckExhausted {
        seat: Seat,
        missing: u32,
    },
    LastCardPenalty {
        seat: Seat,
    },
    BlockServed {
        seat: Seat,
        turns_left: u32,
    },
    Won {
        seat: Seat,
        place: usize,
    },
    GameFinished {
        ranking: Vec<Seat>,
    },
}

impl GameEvent {
    pub fn seat(&self) -> Option<Seat> {
        match self {
            GameEvent::TurnStarted { seat, .. }
            | GameEvent::Briefed { seat, .. }
            | GameEvent::Played { seat, .. }
            | GameEvent::Passed { seat, .. }
            | GameEvent::StatusGranted { seat, .. }
            | GameEvent::EffectNegated { seat }
            | GameEvent::SuitForced { seat, .. }
            | GameEvent::RankForced { seat, .. }
            | GameEvent::SubTurn { seat }
            | GameEvent::CardsDrawn { seat, .. }
            | GameEvent::DeckExhausted { seat, .. }
            | GameEvent::LastCardPenalty { seat }
            | GameEvent::BlockServed { seat, .. }
            | GameEvent::Won { seat, .. } => Some(*seat),
            GameEvent::EffectTransferred { from, .. } => Some(*from),
            GameEvent::ForcedRankReleased | GameEvent::GameFinished { .. } => None,
        }
    }
}
