//! Parsing of the terminal prompts. Card numbers are 1-based; the number one
//! past the hand is the pass option, and a trailing `makao` declares the last
//! card. Nobody needs to call out a missed declaration: the engine applies the
//! penalty itself, so `stop`/`accuse` is answered with a dedicated error.

use makao_core::game::controller::{DrawnCardDecision, Move};
use makao_core::model::rank::Rank;
use makao_core::model::suit::Suit;
use thiserror::Error;

pub const DECLARE_TOKEN: &str = "makao";
pub const ACCUSE_TOKENS: [&str; 2] = ["stop", "accuse"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("nothing was entered")]
    Empty,
    #[error("'{0}' is not a valid option")]
    NotANumber(String),
    #[error("options start at 1")]
    Zero,
    #[error("there is no option {0}")]
    OutOfRange(usize),
    #[error("passing cannot be combined with playing cards")]
    PassWithCards,
    #[error("a missed makao is penalised automatically, there is no need to call '{0}'")]
    AccusationNotNeeded(String),
    #[error("'{0}' is not a suit (pick 1 to 4)")]
    UnknownSuit(String),
    #[error("'{0}' is not a card value")]
    UnknownRank(String),
    #[error("please answer y or n")]
    NotYesNo,
}

fn is_declaration(token: &str) -> bool {
    token.eq_ignore_ascii_case(DECLARE_TOKEN)
}

fn is_accusation(token: &str) -> bool {
    ACCUSE_TOKENS
        .iter()
        .any(|accuse| token.eq_ignore_ascii_case(accuse))
}

/// Splits off a trailing declaration token.
fn split_declaration(line: &str) -> (Vec<&str>, bool) {
    let mut tokens: Vec<&str> = line.split_whitespace().collect();
    let declared = tokens.last().is_some_and(|token| is_declaration(token));
    if declared {
        tokens.pop();
    }
    (tokens, declared)
}

/// Parses a move for a hand of `hand_len` cards.
pub fn parse_move(line: &str, hand_len: usize) -> Result<Move, InputError> {
    let (tokens, declare_last_card) = split_declaration(line);
    if let Some(token) = tokens.iter().find(|token| is_accusation(token)) {
        return Err(InputError::AccusationNotNeeded((*token).to_string()));
    }
    if tokens.is_empty() {
        return Err(InputError::Empty);
    }

    let pass_option = hand_len + 1;
    let mut indexes = Vec::with_capacity(tokens.len());
    for token in &tokens {
        let number: usize = token
            .parse()
            .map_err(|_| InputError::NotANumber((*token).to_string()))?;
        match number {
            0 => return Err(InputError::Zero),
            n if n > pass_option => return Err(InputError::OutOfRange(n)),
            n => indexes.push(n - 1),
        }
    }

    if indexes.contains(&hand_len) {
        if indexes.len() > 1 {
            return Err(InputError::PassWithCards);
        }
        return Ok(Move::Pass);
    }
    Ok(Move::Play {
        indexes,
        declare_last_card,
    })
}

/// Accepts `1`-`4` (Spades, Diamonds, Clubs, Hearts), a suit name or its initial.
pub fn parse_suit(line: &str) -> Result<Suit, InputError> {
    let raw = line.trim();
    let lowered = raw.to_ascii_lowercase();
    let suit = match lowered.as_str() {
        "s" | "spades" | "♠" => Some(Suit::Spades),
        "d" | "diamonds" | "♦" => Some(Suit::Diamonds),
        "c" | "clubs" | "♣" => Some(Suit::Clubs),
        "h" | "hearts" | "♥" => Some(Suit::Hearts),
        other => other.parse::<u8>().ok().and_then(Suit::from_value),
    };
    suit.ok_or_else(|| InputError::UnknownSuit(raw.to_string()))
}

/// Accepts a number from 1 to 13 or one of `A`, `J`, `Q`, `K`.
pub fn parse_rank(line: &str) -> Result<Rank, InputError> {
    let raw = line.trim();
    let rank = match raw.to_ascii_lowercase().as_str() {
        "a" | "ace" => Some(Rank::Ace),
        "j" | "jack" => Some(Rank::Jack),
        "q" | "queen" => Some(Rank::Queen),
        "k" | "king" => Some(Rank::King),
        other => other.parse::<u8>().ok().and_then(Rank::from_value),
    };
    rank.ok_or_else(|| InputError::UnknownRank(raw.to_string()))
}

/// `y` or `n`, optionally followed by the declaration token.
pub fn parse_drawn_decision(line: &str) -> Result<DrawnCardDecision, InputError> {
    let (tokens, declare_last_card) = split_declaration(line);
    match tokens.as_slice() {
        [answer] => match answer.to_ascii_lowercase().as_str() {
            "y" | "yes" => Ok(DrawnCardDecision::Play { declare_last_card }),
            "n" | "no" if !declare_last_card => Ok(DrawnCardDecision::Keep),
            _ => Err(InputError::NotYesNo),
        },
        _ => Err(InputError::NotYesNo),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_and_combo_moves() {
        assert_eq!(parse_move("2", 5), Ok(Move::single(1)));
        assert_eq!(
            parse_move(" 3 1  4 ", 5),
            Ok(Move::Play {
                indexes: vec![2, 0, 3],
                declare_last_card: false
            })
        );
    }

    #[test]
    fn trailing_makao_declares() {
        assert_eq!(parse_move("1 MAKAO", 2), Ok(Move::single(0).declaring()));
        assert_eq!(
            parse_move("makao 1", 2),
            Err(InputError::NotANumber("makao".to_string()))
        );
        assert_eq!(parse_move("makao", 2), Err(InputError::Empty));
    }

    #[test]
    fn accusing_is_refused_with_a_reason() {
        assert_eq!(
            parse_move("STOP", 4),
            Err(InputError::AccusationNotNeeded("STOP".to_string()))
        );
        assert_eq!(
            parse_move("2 accuse", 4),
            Err(InputError::AccusationNotNeeded("accuse".to_string()))
        );
        assert!(
            InputError::AccusationNotNeeded("stop".to_string())
                .to_string()
                .contains("penalised automatically")
        );
    }

    #[test]
    fn option_past_the_hand_passes() {
        assert_eq!(parse_move("6", 5), Ok(Move::Pass));
        assert_eq!(parse_move("6 1", 5), Err(InputError::PassWithCards));
        assert_eq!(parse_move("7", 5), Err(InputError::OutOfRange(7)));
    }

    #[test]
    fn rejects_malformed_moves() {
        assert_eq!(parse_move("", 5), Err(InputError::Empty));
        assert_eq!(parse_move("0", 5), Err(InputError::Zero));
        assert_eq!(
            parse_move("two", 5),
            Err(InputError::NotANumber("two".to_string()))
        );
        assert_eq!(
            parse_move("-1", 5),
            Err(InputError::NotANumber("-1".to_string()))
        );
    }

    #[test]
    fn parses_suits() {
        assert_eq!(parse_suit("1"), Ok(Suit::Spades));
        assert_eq!(parse_suit("4"), Ok(Suit::Hearts));
        assert_eq!(parse_suit(" Clubs "), Ok(Suit::Clubs));
        assert_eq!(parse_suit("d"), Ok(Suit::Diamonds));
        assert_eq!(parse_suit("5"), Err(InputError::UnknownSuit("5".to_string())));
    }

    #[test]
    fn parses_ranks() {
        assert_eq!(parse_rank("7"), Ok(Rank::Seven));
        assert_eq!(parse_rank("10"), Ok(Rank::Ten));
        assert_eq!(parse_rank("K"), Ok(Rank::King));
        assert_eq!(parse_rank("14"), Err(InputError::UnknownRank("14".to_string())));
    }

    #[test]
    fn parses_drawn_card_answers() {
        assert_eq!(
            parse_drawn_decision("y"),
            Ok(DrawnCardDecision::Play {
                declare_last_card: false
            })
        );
        assert_eq!(
            parse_drawn_decision("Y makao"),
            Ok(DrawnCardDecision::Play {
                declare_last_card: true
            })
        );
        assert_eq!(parse_drawn_decision("n"), Ok(DrawnCardDecision::Keep));
        assert_eq!(parse_drawn_decision("n makao"), Err(InputError::NotYesNo));
        assert_eq!(parse_drawn_decision("maybe"), Err(InputError::NotYesNo));
    }
}
