mod heuristic;

pub use heuristic::HeuristicPolicy;

use crate::bot::BotDifficulty;
use makao_core::game::controller::Controller;

/// Boxed controllers for `count` automated seats.
pub fn automated_seats(count: usize, difficulty: BotDifficulty) -> Vec<Box<dyn Controller>> {
    (0..count)
        .map(|_| Box::new(HeuristicPolicy::new(difficulty)) as Box<dyn Controller>)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::automated_seats;
    use crate::bot::BotDifficulty;

    #[test]
    fn builds_one_controller_per_seat() {
        assert_eq!(automated_seats(3, BotDifficulty::Normal).len(), 3);
        assert!(automated_seats(0, BotDifficulty::Easy).is_empty());
    }
}
