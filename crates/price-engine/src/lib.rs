pub mod history;
pub mod board;

pub use history::{apply_percent, current_price, price_history};
pub use board::{PriceBoard, Quote};
