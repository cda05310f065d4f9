pub mod bot;
pub mod policy;

pub use bot::{BotDifficulty, PlayPlanner, optimal_rank, optimal_suit};
pub use policy::{HeuristicPolicy, automated_seats};
