//! # Stock Party: price simulation and settlement for a stock trading party game
//!
//! A generator invents themed companies and a week of market events. Players
//! join a game, trade against prices derived from the events revealed so far,
//! and are scored when the last event is out.
//!
//! - `market_types`: shared game model
//! - `event_clock`: reveal scheduling and visibility
//! - `price_engine`: compounding price histories
//! - `settlement`: holdings, batch settlement, scoring
//! - `content_gen`: company and event generation
//! - `game_engine`: lifecycle rules and the operation surface

pub mod config;

pub use market_types;
pub use event_clock;
pub use price_engine;
pub use settlement;
pub use content_gen;
pub use game_engine;

pub use config::AppConfig;
pub use game_engine::{Clock, GameConfig, GameEngine, GameError, ManualClock, Phase, SystemClock};

pub type Result<T> = anyhow::Result<T>;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.trim().is_empty());
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "stock-party");
    }
}
