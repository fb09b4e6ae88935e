use chrono::{DateTime, Duration, Utc};
use market_types::{Game, MarketEvent};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Wall-clock length of one in-game day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayInterval {
    pub seconds: i64,
}

impl DayInterval {
    #[inline]
    pub fn from_secs(seconds: i64) -> Self {
        Self { seconds }
    }

    #[inline]
    pub fn as_duration(&self) -> Duration {
        Duration::seconds(self.seconds)
    }
}

impl Default for DayInterval {
    fn default() -> Self {
        Self::from_secs(120)
    }
}

/// Instant at which the event for `day` becomes visible: `start + day * interval`.
#[inline]
pub fn reveal_time(start: DateTime<Utc>, day: u32, interval: DayInterval) -> DateTime<Utc> {
    start + interval.as_duration() * day as i32
}

pub fn schedule_events(events: &mut [MarketEvent], start: DateTime<Utc>, interval: DayInterval) {
    for event in events.iter_mut() {
        event.reveal_at = Some(reveal_time(start, event.day, interval));
    }
}

/// Stamps the start time on the game and assigns every event its reveal instant.
pub fn schedule_game(game: &mut Game, start: DateTime<Utc>, interval: DayInterval) {
    game.started_at = Some(start);
    for company in game.companies.iter_mut() {
        schedule_events(&mut company.events, start, interval);
    }

    debug!(
        "Scheduled {} companies of game {} from {} every {}s",
        game.companies.len(),
        game.id,
        start,
        interval.seconds
    );
}
