use chrono::{DateTime, Utc};
use market_types::{Company, Game, MarketEvent};

/// The day-ordered prefix of `events` visible at `now`.
///
/// Nothing is visible before the game starts, whatever reveal times the
/// events carry. Visibility stops at the first unrevealed event so the
/// result is always a prefix.
#[inline]
pub fn revealed_events(
    events: &[MarketEvent],
    started_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> &[MarketEvent] {
    &events[..revealed_count(events, started_at, now)]
}

#[inline]
pub fn revealed_count(
    events: &[MarketEvent],
    started_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> usize {
    if started_at.is_none() {
        return 0;
    }
    events.iter().take_while(|e| e.is_revealed_at(now)).count()
}

#[inline]
pub fn all_revealed(
    events: &[MarketEvent],
    started_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    started_at.is_some() && revealed_count(events, started_at, now) == events.len()
}

/// The next pending reveal instant, if the game has started and days remain.
pub fn next_reveal(
    events: &[MarketEvent],
    started_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    started_at?;
    events.get(revealed_count(events, started_at, now))?.reveal_at
}

#[inline]
pub fn company_revealed<'a>(company: &'a Company, game: &Game, now: DateTime<Utc>) -> &'a [MarketEvent] {
    revealed_events(&company.events, game.started_at, now)
}

/// A game is closed once it has started and every company shows its full week.
pub fn is_closed(game: &Game, now: DateTime<Utc>) -> bool {
    game.is_started()
        && game
            .companies
            .iter()
            .all(|c| all_revealed(&c.events, game.started_at, now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{schedule_events, DayInterval};
    use chrono::{Duration, TimeZone};
    use market_types::{EventId, DAYS_PER_GAME};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn scheduled_week() -> Vec<MarketEvent> {
        let mut events: Vec<MarketEvent> = (1..=DAYS_PER_GAME)
            .map(|day| MarketEvent::new(EventId(day as u64), day, format!("day {day}"), 10))
            .collect();
        schedule_events(&mut events, start(), DayInterval::from_secs(120));
        events
    }

    #[test]
    fn test_nothing_revealed_before_start() {
        let events = scheduled_week();
        let far_future = start() + Duration::days(30);

        assert!(revealed_events(&events, None, far_future).is_empty());
        assert!(!all_revealed(&events, None, far_future));
        assert_eq!(next_reveal(&events, None, far_future), None);
    }

    #[test]
    fn test_prefix_boundaries() {
        let events = scheduled_week();
        let started = Some(start());

        for k in 0..=DAYS_PER_GAME as i64 {
            let at = start() + Duration::seconds(120 * k);
            assert_eq!(revealed_count(&events, started, at), k as usize);

            let just_before_next = at + Duration::seconds(119);
            assert_eq!(revealed_count(&events, started, just_before_next), k as usize);
        }
    }

    #[test]
    fn test_revealed_is_day_ordered_prefix() {
        let events = scheduled_week();
        let at = start() + Duration::minutes(7);

        let revealed = revealed_events(&events, Some(start()), at);
        let days: Vec<u32> = revealed.iter().map(|e| e.day).collect();
        assert_eq!(days, vec![1, 2, 3]);
    }

    #[test]
    fn test_unscheduled_events_stay_hidden() {
        let mut events = scheduled_week();
        events[2].reveal_at = None;

        let late = start() + Duration::days(1);
        assert_eq!(revealed_count(&events, Some(start()), late), 2);
        assert!(!all_revealed(&events, Some(start()), late));
    }

    #[test]
    fn test_next_reveal_and_completion() {
        let events = scheduled_week();
        let started = Some(start());

        assert_eq!(
            next_reveal(&events, started, start()),
            Some(start() + Duration::minutes(2))
        );

        let end = start() + Duration::minutes(14);
        assert!(all_revealed(&events, started, end));
        assert_eq!(next_reveal(&events, started, end), None);
    }
}
