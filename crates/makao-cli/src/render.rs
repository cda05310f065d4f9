use makao_core::game::controller::TurnView;
use makao_core::game::engine::GameResult;
use makao_core::game::event::GameEvent;
use makao_core::model::card::Card;
use makao_core::model::player::{Seat, Status};
use makao_core::model::suit::Suit;
use std::fmt::Write as _;

fn name_of(names: &[String], seat: Seat) -> &str {
    names.get(seat.index()).map_or("?", String::as_str)
}

fn cards_text(cards: &[Card]) -> String {
    cards
        .iter()
        .map(Card::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn plural(count: u32, word: &str) -> String {
    if count == 1 {
        format!("1 {word}")
    } else {
        format!("{count} {word}s")
    }
}

/// One line for an event, or `None` for events not worth showing.
pub fn describe_event(event: &GameEvent, names: &[String]) -> Option<String> {
    let line = match event {
        GameEvent::TurnStarted { .. } | GameEvent::GameFinished { .. } => return None,
        GameEvent::Briefed {
            seat,
            status,
            draw_debt,
            block_turns_left,
            can_escape,
        } => {
            let name = name_of(names, *seat);
            match status {
                Status::Clear => return None,
                Status::Blocked => {
                    let mut line = format!("{name} is blocked");
                    if *block_turns_left > 1 {
                        let _ = write!(line, " for {block_turns_left} turns");
                    }
                    if *can_escape {
                        line.push_str(" (a 4 passes it to the next player)");
                    }
                    line
                }
                Status::PendingDraw => format!(
                    "{name} is about to draw {} (a 2 or a 3 passes it on)",
                    plural(*draw_debt, "card")
                ),
                Status::PendingDrawFive => format!(
                    "{name} is about to draw {} (a King negates or returns it)",
                    plural(*draw_debt, "card")
                ),
                Status::ForcedRank => {
                    format!("{name} has to follow the forced value or play a Jack")
                }
            }
        }
        GameEvent::Played {
            seat,
            cards,
            cards_left,
        } => format!(
            "{} played {} ({cards_left} left)",
            name_of(names, *seat),
            cards_text(cards)
        ),
        GameEvent::Passed { seat, drew: true } => {
            format!("{} passed and drew a card", name_of(names, *seat))
        }
        GameEvent::Passed { seat, drew: false } => format!("{} passed", name_of(names, *seat)),
        GameEvent::StatusGranted {
            seat,
            status,
            draw_debt,
            block_turns_left,
        } => match status {
            Status::Blocked => format!(
                "{} is blocked for {}",
                name_of(names, *seat),
                plural(*block_turns_left, "turn")
            ),
            _ => format!(
                "{} now owes {}",
                name_of(names, *seat),
                plural(*draw_debt, "card")
            ),
        },
        GameEvent::EffectTransferred { from, to, status } => format!(
            "{} passed the effect ({status}) on to {}",
            name_of(names, *from),
            name_of(names, *to)
        ),
        GameEvent::EffectNegated { seat } => {
            format!("{} negated the King", name_of(names, *seat))
        }
        GameEvent::SuitForced { seat, suit } => format!(
            "{} picked {} as the new suit",
            name_of(names, *seat),
            suit.symbol()
        ),
        GameEvent::RankForced { seat, rank } => {
            format!("{} picked {rank} as the forced value", name_of(names, *seat))
        }
        GameEvent::ForcedRankReleased => "The forced value no longer applies".to_string(),
        GameEvent::SubTurn { seat } => {
            format!("{} has to answer the King of Spades right away", name_of(names, *seat))
        }
        GameEvent::CardsDrawn {
            seat,
            count,
            hand_size,
        } => format!(
            "{} drew {} (at {hand_size} cards)",
            name_of(names, *seat),
            plural(*count, "card")
        ),
        GameEvent::DeckExhausted { seat, missing } => format!(
            "The deck is empty, {} could not draw {}",
            name_of(names, *seat),
            plural(*missing, "card")
        ),
        GameEvent::LastCardPenalty { seat } => format!(
            "{} did not say makao and draws 5 cards",
            name_of(names, *seat)
        ),
        GameEvent::BlockServed { seat, turns_left } => match turns_left {
            0 => format!("{} is no longer blocked", name_of(names, *seat)),
            left => format!(
                "{} sat out a turn ({} to go)",
                name_of(names, *seat),
                plural(*left, "turn")
            ),
        },
        GameEvent::Won { seat, place } => {
            format!("{} finished in place {place}!", name_of(names, *seat))
        }
    };
    Some(line)
}

/// Pile line, numbered hand and the pass option.
pub fn turn_prompt(view: &TurnView<'_>) -> String {
    let mut text = format!("{}\n", view.pile);
    if view.player.is_restricted() {
        let allowed = view
            .player
            .allowed_ranks()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(text, "You may only play: {allowed}");
    }
    for (position, card) in view.hand().iter().enumerate() {
        let _ = writeln!(text, "{} - {card}", position + 1);
    }
    let draws = matches!(view.player.status(), Status::Clear | Status::ForcedRank);
    let _ = writeln!(
        text,
        "{} - Pass your turn{}",
        view.hand().len() + 1,
        if draws { " and draw a card" } else { "" }
    );
    text.push_str("Your option is: ");
    text
}

pub fn suit_prompt() -> String {
    let mut text = String::from("Pick a suit:\n");
    for suit in Suit::ALL {
        let _ = writeln!(text, "{} - {} ({suit})", suit.value(), suit.symbol());
    }
    text
}

pub fn rank_prompt() -> &'static str {
    "Pick a value to force (from 5 to 10): "
}

pub fn drawn_card_prompt(card: Card) -> String {
    format!("You drew {card}. Play it? (y/n): ")
}

/// Final standings, one seat per line.
pub fn ranking(result: &GameResult, names: &[String]) -> String {
    let mut text = String::from("Game over\n");
    if result.stalled {
        let _ = writeln!(text, "The game was stopped after {} turns", result.turns);
    }
    for (place, seat) in result.ranking.iter().enumerate() {
        let _ = writeln!(text, "{}. {}", place + 1, name_of(names, *seat));
    }
    text
}
