pub mod client;
pub mod prompts;
pub mod types;

pub use client::OpenAiGenerator;
pub use types::{ChatMessage, DayPayload, EventPayload, LineupPayload};
