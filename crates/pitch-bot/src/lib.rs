pub mod bot;
pub mod policy;

pub use bot::{
    BidPlanner, BotContext, BotDifficulty, DiscardPlanner, ParseDifficultyError, PlayPlanner,
};
pub use policy::{HeuristicPolicy, Policy, PolicyContext};
