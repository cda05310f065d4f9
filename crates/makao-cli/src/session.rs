use std::cell::Cell;
use std::io::{BufRead, Write};
use std::rc::Rc;

use anyhow::Result;
use makao_bot::automated_seats;
use makao_core::game::controller::Controller;
use makao_core::game::engine::{EngineError, GameResult, Step, TurnEngine, table_names};
use tracing::{Level, event};

use crate::config::GameConfig;
use crate::human::HumanController;
use crate::render;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub result: GameResult,
    /// The terminal closed before the game ended.
    pub input_closed: bool,
}

/// One game at a table: the engine plus whoever sits in each seat.
pub struct Session {
    engine: TurnEngine,
    seats: Vec<Box<dyn Controller>>,
    names: Vec<String>,
    max_turns: u64,
    echo: bool,
    hangup: Option<Rc<Cell<bool>>>,
}

impl Session {
    /// Every seat is a bot; events are echoed to the output.
    pub fn autoplay(config: &GameConfig, seed: u64) -> Result<Self, EngineError> {
        let names = table_names(&config.player_name, config.opponents);
        let engine = TurnEngine::with_config(names.clone(), seed, config.engine_config())?;
        let seats = automated_seats(names.len(), config.bot_difficulty());
        Ok(Self {
            engine,
            seats,
            names,
            max_turns: config.max_turns,
            echo: true,
            hangup: None,
        })
    }

    /// Seat 0 answers through `reader`/`writer`; the opponents are bots.
    pub fn interactive<R, W>(
        config: &GameConfig,
        seed: u64,
        reader: R,
        writer: W,
    ) -> Result<Self, EngineError>
    where
        R: BufRead + 'static,
        W: Write + 'static,
    {
        let names = table_names(&config.player_name, config.opponents);
        let engine = TurnEngine::with_config(names.clone(), seed, config.engine_config())?;
        let hangup = Rc::new(Cell::new(false));
        let human = HumanController::new(reader, writer, names.clone(), Rc::clone(&hangup));

        let mut seats: Vec<Box<dyn Controller>> = vec![Box::new(human)];
        seats.extend(automated_seats(config.opponents, config.bot_difficulty()));
        Ok(Self {
            engine,
            seats,
            names,
            max_turns: config.max_turns,
            echo: false,
            hangup: Some(hangup),
        })
    }

    pub fn engine(&self) -> &TurnEngine {
        &self.engine
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    fn input_closed(&self) -> bool {
        self.hangup.as_ref().is_some_and(|flag| flag.get())
    }

    /// Plays until someone is left holding cards, the turn limit is hit, or
    /// the terminal closes.
    pub fn run(&mut self, out: &mut impl Write) -> Result<SessionSummary> {
        event!(
            target: "makao_cli::session",
            Level::INFO,
            seed = self.engine.seed(),
            players = self.names.len(),
            max_turns = self.max_turns,
            "game started"
        );

        let mut consumed = 0;
        let mut stalled = false;
        let mut input_closed = false;
        while !self.engine.is_finished() {
            if consumed >= self.max_turns {
                event!(
                    target: "makao_cli::session",
                    Level::WARN,
                    turns = consumed,
                    "turn limit reached"
                );
                stalled = true;
                break;
            }
            let step = self.engine.step(&mut self.seats)?;
            consumed += 1;

            if self.echo {
                if let Step::Played { events, .. } = &step {
                    for game_event in events {
                        if let Some(line) = render::describe_event(game_event, &self.names) {
                            writeln!(out, "{line}")?;
                        }
                    }
                }
            }

            if self.input_closed() {
                input_closed = true;
                stalled = !self.engine.is_finished();
                break;
            }
        }

        let result = GameResult {
            ranking: self.engine.ranking(),
            winners: self.engine.winners().to_vec(),
            turns: self.engine.turn_index(),
            stalled,
        };
        event!(
            target: "makao_cli::session",
            Level::INFO,
            turns = result.turns,
            winners = result.winners.len(),
            stalled,
            input_closed,
            "game over"
        );
        Ok(SessionSummary {
            result,
            input_closed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Session;
    use crate::config::GameConfig;
    use std::io::{Cursor, sink};

    fn config(opponents: usize) -> GameConfig {
        GameConfig {
            opponents,
            ..GameConfig::default()
        }
    }

    #[test]
    fn autoplay_echoes_events_and_ranks_everyone() {
        let mut session = Session::autoplay(&config(2), 7).expect("session");
        let mut out = Vec::new();
        let summary = session.run(&mut out).expect("run");

        assert!(!summary.input_closed);
        assert_eq!(summary.result.ranking.len(), 3);
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains(" played "));
    }

    #[test]
    fn same_seed_replays_the_same_game() {
        let mut first = Vec::new();
        let mut second = Vec::new();
        let a = Session::autoplay(&config(3), 99)
            .expect("session")
            .run(&mut first)
            .expect("run");
        let b = Session::autoplay(&config(3), 99)
            .expect("session")
            .run(&mut second)
            .expect("run");
        assert_eq!(a, b);
        assert_eq!(first, second);
    }

    #[test]
    fn turn_limit_stalls_the_game() {
        let cfg = GameConfig {
            max_turns: 1,
            ..config(3)
        };
        let mut session = Session::autoplay(&cfg, 3).expect("session");
        let summary = session.run(&mut sink()).expect("run");
        assert!(summary.result.stalled);
        assert_eq!(summary.result.turns, 1);
        assert_eq!(summary.result.ranking.len(), 4);
    }

    #[test]
    fn closed_terminal_ends_the_session() {
        let mut session =
            Session::interactive(&config(1), 11, Cursor::new(&b""[..]), sink()).expect("session");
        let summary = session.run(&mut sink()).expect("run");
        assert!(summary.input_closed);
        assert!(summary.result.stalled);
        assert_eq!(session.names(), ["Player".to_string(), "Player1".to_string()]);
        assert!(session.engine().turn_index() >= 1);
    }
}
