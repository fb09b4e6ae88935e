pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod metrics;
pub mod store;
pub mod view;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::GameConfig;
pub use engine::GameEngine;
pub use error::{ErrorKind, GameError};
pub use lifecycle::Phase;
pub use metrics::EngineMetrics;
pub use view::*;

pub type Result<T> = std::result::Result<T, GameError>;
