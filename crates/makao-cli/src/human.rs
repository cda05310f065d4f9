use std::cell::Cell;
use std::io::{BufRead, Write};
use std::rc::Rc;

use makao_core::game::controller::{Controller, DrawnCardDecision, Move, MoveError, TurnView};
use makao_core::game::event::GameEvent;
use makao_core::model::card::Card;
use makao_core::model::rank::Rank;
use makao_core::model::suit::Suit;
use tracing::{Level, event};

use crate::input::{self, InputError};
use crate::render;

/// The seat driven from a terminal. Once input runs dry the `hangup` flag is
/// raised and every question is answered with the most passive option.
pub struct HumanController<R, W> {
    reader: R,
    writer: W,
    names: Vec<String>,
    hangup: Rc<Cell<bool>>,
}

impl<R: BufRead, W: Write> HumanController<R, W> {
    pub fn new(reader: R, writer: W, names: Vec<String>, hangup: Rc<Cell<bool>>) -> Self {
        Self {
            reader,
            writer,
            names,
            hangup,
        }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    fn hang_up(&mut self, reason: &str) {
        if !self.hangup.replace(true) {
            event!(target: "makao_cli::human", Level::INFO, reason, "terminal input closed");
        }
    }

    fn say(&mut self, text: &str) {
        if self.hangup.get() {
            return;
        }
        if writeln!(self.writer, "{text}").is_err() {
            self.hang_up("write failed");
        }
    }

    fn read_answer(&mut self, prompt: &str) -> Option<String> {
        if self.hangup.get() {
            return None;
        }
        if write!(self.writer, "{prompt}")
            .and_then(|()| self.writer.flush())
            .is_err()
        {
            self.hang_up("write failed");
            return None;
        }
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => {
                self.hang_up("end of input");
                None
            }
            Ok(_) => Some(line.trim().to_string()),
            Err(_) => {
                self.hang_up("read failed");
                None
            }
        }
    }

    /// Asks until `parse` accepts the answer or input closes.
    fn ask<T>(&mut self, prompt: &str, parse: impl Fn(&str) -> Result<T, InputError>) -> Option<T> {
        loop {
            let line = self.read_answer(prompt)?;
            match parse(&line) {
                Ok(value) => return Some(value),
                Err(err) => self.say(&format!("Invalid input: {err}")),
            }
        }
    }
}

impl<R: BufRead, W: Write> Controller for HumanController<R, W> {
    fn choose_move(&mut self, view: &TurnView<'_>) -> Move {
        let hand_len = view.hand().len();
        let prompt = render::turn_prompt(view);
        self.ask(&prompt, |line| input::parse_move(line, hand_len))
            .unwrap_or(Move::Pass)
    }

    fn choose_suit(&mut self, _view: &TurnView<'_>) -> Suit {
        let prompt = render::suit_prompt();
        self.ask(&prompt, input::parse_suit).unwrap_or(Suit::Spades)
    }

    fn choose_rank(&mut self, _view: &TurnView<'_>) -> Rank {
        self.ask(render::rank_prompt(), input::parse_rank)
            .unwrap_or(Rank::Five)
    }

    fn decide_drawn_card(&mut self, _view: &TurnView<'_>, card: Card) -> DrawnCardDecision {
        let prompt = render::drawn_card_prompt(card);
        self.ask(&prompt, input::parse_drawn_decision)
            .unwrap_or(DrawnCardDecision::Keep)
    }

    fn reject(&mut self, _view: &TurnView<'_>, error: &MoveError) {
        self.say(&format!("Not allowed: {error}"));
    }

    fn notify(&mut self, game_event: &GameEvent) {
        if let Some(line) = render::describe_event(game_event, &self.names) {
            self.say(&line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::HumanController;
    use makao_core::game::controller::{Controller, DrawnCardDecision, Move, MoveError, TurnView};
    use makao_core::game::event::GameEvent;
    use makao_core::model::card::Card;
    use makao_core::model::hand::Hand;
    use makao_core::model::pile::Pile;
    use makao_core::model::player::{PlayerState, Seat};
    use makao_core::model::rank::Rank;
    use makao_core::model::suit::Suit;
    use std::cell::Cell;
    use std::io::Cursor;
    use std::rc::Rc;

    type Terminal = HumanController<Cursor<&'static [u8]>, Vec<u8>>;

    fn terminal(script: &'static str) -> (Terminal, Rc<Cell<bool>>) {
        let hangup = Rc::new(Cell::new(false));
        let controller = HumanController::new(
            Cursor::new(script.as_bytes()),
            Vec::new(),
            vec!["Alice".to_string(), "Player1".to_string()],
            Rc::clone(&hangup),
        );
        (controller, hangup)
    }

    fn table() -> (Vec<PlayerState>, Pile) {
        let player = PlayerState::with_hand(
            "Alice",
            Hand::with_cards(vec![
                Card::new(Rank::Seven, Suit::Hearts),
                Card::new(Rank::Nine, Suit::Hearts),
            ]),
        );
        (vec![player], Pile::new(Card::new(Rank::Five, Suit::Hearts)))
    }

    fn output(controller: Terminal) -> String {
        String::from_utf8(controller.into_writer()).expect("utf8 output")
    }

    #[test]
    fn reprompts_until_a_move_parses() {
        let (players, pile) = table();
        let view = TurnView {
            seat: Seat::new(0),
            player: &players[0],
            players: &players,
            pile: &pile,
            deck_len: 30,
        };
        let (mut controller, hangup) = terminal("x\n9\n2 makao\n");
        assert_eq!(controller.choose_move(&view), Move::single(1).declaring());
        assert!(!hangup.get());

        let text = output(controller);
        assert!(text.contains("The card at the top is 5♥"));
        assert!(text.contains("Invalid input: 'x' is not a valid option"));
        assert!(text.contains("Invalid input: there is no option 9"));
    }

    #[test]
    fn closed_input_passes_and_raises_hangup() {
        let (players, pile) = table();
        let view = TurnView {
            seat: Seat::new(0),
            player: &players[0],
            players: &players,
            pile: &pile,
            deck_len: 30,
        };
        let (mut controller, hangup) = terminal("");
        assert_eq!(controller.choose_move(&view), Move::Pass);
        assert!(hangup.get());
        assert_eq!(controller.choose_suit(&view), Suit::Spades);
        assert_eq!(controller.choose_rank(&view), Rank::Five);
        assert_eq!(
            controller.decide_drawn_card(&view, Card::new(Rank::Six, Suit::Hearts)),
            DrawnCardDecision::Keep
        );
    }

    #[test]
    fn asks_for_suit_rank_and_drawn_card() {
        let (players, pile) = table();
        let view = TurnView {
            seat: Seat::new(0),
            player: &players[0],
            players: &players,
            pile: &pile,
            deck_len: 30,
        };
        let (mut controller, _) = terminal("hearts\n7\ny\n");
        assert_eq!(controller.choose_suit(&view), Suit::Hearts);
        assert_eq!(controller.choose_rank(&view), Rank::Seven);
        assert_eq!(
            controller.decide_drawn_card(&view, Card::new(Rank::Six, Suit::Hearts)),
            DrawnCardDecision::Play {
                declare_last_card: false
            }
        );
        assert!(output(controller).contains("You drew 6♥"));
    }

    #[test]
    fn prints_rejections_and_table_events() {
        let (players, pile) = table();
        let view = TurnView {
            seat: Seat::new(0),
            player: &players[0],
            players: &players,
            pile: &pile,
            deck_len: 30,
        };
        let (mut controller, _) = terminal("");
        controller.reject(&view, &MoveError::IllegalCombo);
        controller.notify(&GameEvent::Passed {
            seat: Seat::new(1),
            drew: true,
        });
        let text = output(controller);
        assert!(text.contains("Not allowed: you cannot put this card on top of the card pile"));
        assert!(text.contains("Player1 passed and drew a card"));
    }
}
