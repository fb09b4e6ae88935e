pub mod holdings;
pub mod validation;
pub mod settle;
pub mod result;

pub use holdings::Holdings;
pub use validation::*;
pub use settle::{liquidate, settle, Settlement, TradeDraft};
pub use result::{game_result, GameResult};

pub type Result<T> = std::result::Result<T, TradeError>;
