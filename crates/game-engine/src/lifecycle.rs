use crate::error::GameError;
use crate::Result;
use chrono::{DateTime, Duration, Utc};
use event_clock::{is_closed, schedule_game, DayInterval};
use market_types::{Game, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// Lifecycle phase of a game, always derived from `started_at` and the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Created,
    Started,
    Closed,
}

impl Phase {
    #[inline]
    pub fn of(game: &Game, now: DateTime<Utc>) -> Self {
        if !game.is_started() {
            Phase::Created
        } else if is_closed(game, now) {
            Phase::Closed
        } else {
            Phase::Started
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Created => write!(f, "created"),
            Phase::Started => write!(f, "started"),
            Phase::Closed => write!(f, "closed"),
        }
    }
}

/// Adds `user_id` to the game. Returns false when the user was already in it.
pub fn join(game: &mut Game, user_id: UserId) -> Result<bool> {
    if game.is_participant(user_id) {
        return Ok(false);
    }
    if game.is_started() {
        return Err(GameError::forbidden(format!("game {} has already started", game.id)));
    }

    game.participants.push(user_id);
    if game.owner.is_none() {
        game.owner = Some(user_id);
        info!("User {} owns game {}", user_id, game.id);
    }

    Ok(true)
}

pub fn leave(game: &mut Game, user_id: UserId) -> Result<()> {
    if game.is_started() {
        return Err(GameError::forbidden(format!("game {} has already started", game.id)));
    }
    if !game.is_participant(user_id) {
        return Err(GameError::forbidden(format!("user {} is not in game {}", user_id, game.id)));
    }

    game.participants.retain(|p| *p != user_id);
    if game.is_owner(user_id) {
        game.owner = game.participants.first().copied();
        info!("Ownership of game {} passed to {:?}", game.id, game.owner);
    }

    Ok(())
}

pub fn start(game: &mut Game, user_id: UserId, now: DateTime<Utc>, interval: DayInterval) -> Result<()> {
    if !game.is_owner(user_id) {
        return Err(GameError::forbidden(format!("only the owner can start game {}", game.id)));
    }
    if game.is_started() {
        return Err(GameError::conflict(format!("game {} was already started", game.id)));
    }

    schedule_game(game, now, interval);
    info!("Game {} started with {} participants", game.id, game.participants.len());
    Ok(())
}

/// Preconditions for settling a trade batch at `now`.
pub fn ensure_trading_open(
    game: &Game,
    user_id: UserId,
    now: DateTime<Utc>,
    window: Duration,
) -> Result<()> {
    if !game.is_participant(user_id) {
        return Err(GameError::forbidden(format!("user {} is not in game {}", user_id, game.id)));
    }

    let Some(started_at) = game.started_at else {
        return Err(GameError::forbidden(format!("game {} has not started", game.id)));
    };
    if is_closed(game, now) {
        return Err(GameError::forbidden(format!("game {} is closed", game.id)));
    }
    if now.signed_duration_since(started_at) > window {
        return Err(GameError::forbidden(format!("trading window of game {} has ended", game.id)));
    }

    Ok(())
}

pub fn ensure_closed(game: &Game, now: DateTime<Utc>) -> Result<()> {
    if !is_closed(game, now) {
        return Err(GameError::forbidden(format!("game {} is not closed yet", game.id)));
    }
    Ok(())
}
