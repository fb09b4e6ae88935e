use crate::types::{CompanyId, EventId, GameId, Gold, Shares, TradeId, UserId, DAYS_PER_GAME};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelError {
    #[error("Company {company} has {count} events, expected {expected}")]
    WrongEventCount { company: String, count: usize, expected: u32 },

    #[error("Company {company} has event for day {day} at position {position}")]
    EventDayOutOfOrder { company: String, day: u32, position: usize },

    #[error("Initial price {price} for company {company} must be positive")]
    InvalidInitialPrice { company: String, price: Gold },
}

/// A narrative event that moves one company's price on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketEvent {
    pub id: EventId,
    pub day: u32,
    pub description: String,
    pub percent: i64,
    /// Assigned when the owning game starts.
    pub reveal_at: Option<DateTime<Utc>>,
}

impl MarketEvent {
    #[inline]
    pub fn new(id: EventId, day: u32, description: String, percent: i64) -> Self {
        Self {
            id,
            day,
            description,
            percent,
            reveal_at: None,
        }
    }

    #[inline]
    pub fn is_revealed_at(&self, now: DateTime<Utc>) -> bool {
        self.reveal_at.map_or(false, |at| at <= now)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub description: String,
    pub initial_price: Gold,
    pub thumbnail: String,
    pub events: Vec<MarketEvent>,
}

impl Company {
    /// Builds a company, checking that it carries one event per day in day order.
    pub fn new(
        id: CompanyId,
        name: String,
        description: String,
        initial_price: Gold,
        thumbnail: String,
        events: Vec<MarketEvent>,
    ) -> Result<Self, ModelError> {
        if initial_price <= 0 {
            return Err(ModelError::InvalidInitialPrice {
                company: name,
                price: initial_price,
            });
        }

        if events.len() != DAYS_PER_GAME as usize {
            return Err(ModelError::WrongEventCount {
                company: name,
                count: events.len(),
                expected: DAYS_PER_GAME,
            });
        }

        for (position, event) in events.iter().enumerate() {
            if event.day != position as u32 + 1 {
                return Err(ModelError::EventDayOutOfOrder {
                    company: name,
                    day: event.day,
                    position,
                });
            }
        }

        Ok(Self {
            id,
            name,
            description,
            initial_price,
            thumbnail,
            events,
        })
    }
}

/// Immutable ledger entry. Holdings are always recomputed from these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    pub user_id: UserId,
    pub game_id: GameId,
    pub company_id: CompanyId,
    /// Number of events revealed for the company when the trade settled.
    pub day: u32,
    pub amount: Shares,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRequest {
    pub company_id: CompanyId,
    pub amount: Shares,
}

impl TradeRequest {
    #[inline]
    pub fn buy(company_id: CompanyId, shares: Shares) -> Self {
        Self { company_id, amount: shares }
    }

    #[inline]
    pub fn sell(company_id: CompanyId, shares: Shares) -> Self {
        Self { company_id, amount: -shares }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub nickname: String,
    pub credential_hash: String,
    pub gold: Gold,
    pub games: Vec<GameId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub theme: String,
    pub title: String,
    pub language: String,
    pub owner: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    /// Ordered by join time.
    pub participants: Vec<UserId>,
    pub companies: Vec<Company>,
    pub trades: Vec<Trade>,
}

impl Game {
    #[inline]
    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    #[inline]
    pub fn is_participant(&self, user_id: UserId) -> bool {
        self.participants.contains(&user_id)
    }

    #[inline]
    pub fn is_owner(&self, user_id: UserId) -> bool {
        self.owner == Some(user_id)
    }

    #[inline]
    pub fn company(&self, company_id: CompanyId) -> Option<&Company> {
        self.companies.iter().find(|c| c.id == company_id)
    }

    #[inline]
    pub fn company_ids(&self) -> impl Iterator<Item = CompanyId> + '_ {
        self.companies.iter().map(|c| c.id)
    }

    pub fn trades_for(&self, user_id: UserId) -> impl Iterator<Item = &Trade> + '_ {
        self.trades.iter().filter(move |t| t.user_id == user_id)
    }
}
