pub mod schedule;
pub mod reveal;

pub use schedule::{reveal_time, schedule_events, schedule_game, DayInterval};
pub use reveal::*;
