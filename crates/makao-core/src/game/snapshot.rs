use super::engine::TurnEngine;
use crate::model::card::Card;
use crate::model::player::{Seat, Status};
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerSnapshot {
    pub seat: Seat,
    pub name: String,
    pub hand: Vec<Card>,
    pub status: Status,
    pub draw_debt: u32,
    pub block_turns_left: u32,
    pub block_turns_total: u32,
    pub allowed_ranks: Vec<Rank>,
    pub has_won: bool,
}

/// Read-only picture of a table, for logs and for comparing runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableSnapshot {
    pub seed: u64,
    pub turn_index: u64,
    pub top: Card,
    pub pile_len: usize,
    pub forced_suit: Option<Suit>,
    pub forced_rank: Option<Rank>,
    pub deck_len: usize,
    pub winners: Vec<Seat>,
    pub players: Vec<PlayerSnapshot>,
}

impl TableSnapshot {
    pub fn capture(engine: &TurnEngine) -> Self {
        let players = engine
            .players()
            .iter()
            .zip(Seat::all(engine.players().len()))
            .map(|(player, seat)| PlayerSnapshot {
                seat,
                name: player.name().to_string(),
                hand: player.hand().cards().to_vec(),
                status: player.status(),
                draw_debt: player.draw_debt(),
                block_turns_left: player.block_turns_left(),
                block_turns_total: player.block_turns_total(),
                allowed_ranks: player.allowed_ranks().to_vec(),
                has_won: player.has_won(),
            })
            .collect();

        TableSnapshot {
            seed: engine.seed(),
            turn_index: engine.turn_index(),
            top: engine.pile().top(),
            pile_len: engine.pile().len(),
            forced_suit: engine.pile().forced_suit(),
            forced_rank: engine.pile().forced_rank(),
            deck_len: engine.deck_len(),
            winners: engine.winners().to_vec(),
            players,
        }
    }

    /// Cards on the table in total; stays at 52 for a full deck.
    pub fn card_count(&self) -> usize {
        self.pile_len + self.deck_len + self.players.iter().map(|p| p.hand.len()).sum::<usize>()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::TableSnapshot;
    use crate::game::engine::TurnEngine;

    #[test]
    fn snapshot_serializes_to_json() {
        let engine = TurnEngine::new("Alice", 2, 99).unwrap();
        let json = engine.snapshot().to_json().unwrap();
        assert!(json.contains("\"seed\": 99"));
        assert!(json.contains("\"turn_index\": 0"));
        assert!(json.contains("\"name\": \"Player2\""));
    }

    #[test]
    fn snapshot_roundtrip_through_json() {
        let engine = TurnEngine::new("Alice", 3, 7).unwrap();
        let snapshot = TableSnapshot::capture(&engine);
        let parsed = TableSnapshot::from_json(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(parsed, snapshot);
    }

    #[test]
    fn fresh_deal_accounts_for_every_card() {
        let engine = TurnEngine::new("Alice", 3, 11).unwrap();
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.card_count(), 52);
        assert_eq!(snapshot.pile_len, 1);
        assert!(snapshot.players.iter().all(|p| p.hand.len() == 5));
    }
}
