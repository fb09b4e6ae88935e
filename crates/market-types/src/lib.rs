pub mod types;
pub mod game;

pub use types::*;
pub use game::{Company, Game, MarketEvent, ModelError, Trade, TradeRequest, User};

pub type Result<T> = std::result::Result<T, ModelError>;
