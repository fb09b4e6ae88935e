use crate::lifecycle::Phase;
use chrono::{DateTime, Utc};
use event_clock::{company_revealed, next_reveal};
use market_types::{Company, CompanyId, Game, GameId, Gold, Trade, User, UserId};
use price_engine::Quote;
use serde::{Deserialize, Serialize};
use settlement::Holdings;

/// Snapshot of a game as one participant's screen would show it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameView {
    pub id: GameId,
    pub theme: String,
    pub title: String,
    pub language: String,
    pub phase: Phase,
    pub owner: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub next_reveal: Option<DateTime<Utc>>,
    pub companies: Vec<CompanyView>,
    pub participants: Vec<ParticipantView>,
    pub trades: Vec<Trade>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyView {
    pub id: CompanyId,
    pub name: String,
    pub description: String,
    pub thumbnail: String,
    pub price: Gold,
    pub history: Vec<Gold>,
    /// Revealed events only.
    pub events: Vec<EventView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventView {
    pub day: u32,
    pub description: String,
    pub percent: i64,
    pub revealed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantView {
    pub id: UserId,
    pub nickname: String,
    pub gold: Gold,
    pub holdings: Holdings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub id: UserId,
    pub nickname: String,
    pub gold: Gold,
    pub games: Vec<GameId>,
    pub created_at: DateTime<Utc>,
}

/// Listing entry for lobbies and per-user history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub id: GameId,
    pub theme: String,
    pub title: String,
    pub phase: Phase,
    pub owner: Option<UserId>,
    pub participants: usize,
    pub created_at: DateTime<Utc>,
}

impl CompanyView {
    pub fn build(company: &Company, game: &Game, now: DateTime<Utc>) -> Self {
        let quote = Quote::for_company(company, game, now);
        let events = company_revealed(company, game, now)
            .iter()
            .map(|e| EventView {
                day: e.day,
                description: e.description.clone(),
                percent: e.percent,
                revealed_at: e.reveal_at,
            })
            .collect();

        Self {
            id: company.id,
            name: company.name.clone(),
            description: company.description.clone(),
            thumbnail: company.thumbnail.clone(),
            price: quote.price,
            history: quote.history,
            events,
        }
    }
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            nickname: user.nickname.clone(),
            gold: user.gold,
            games: user.games.clone(),
            created_at: user.created_at,
        }
    }
}

impl ParticipantView {
    pub fn build(user: &User, game: &Game) -> Self {
        Self {
            id: user.id,
            nickname: user.nickname.clone(),
            gold: user.gold,
            holdings: Holdings::for_game(game, user.id),
        }
    }
}

impl GameView {
    /// `participants` are the already-resolved participant records, in join order.
    pub fn build(game: &Game, participants: Vec<ParticipantView>, now: DateTime<Utc>) -> Self {
        let next_reveal = game
            .companies
            .iter()
            .filter_map(|c| next_reveal(&c.events, game.started_at, now))
            .min();

        Self {
            id: game.id,
            theme: game.theme.clone(),
            title: game.title.clone(),
            language: game.language.clone(),
            phase: Phase::of(game, now),
            owner: game.owner,
            created_at: game.created_at,
            started_at: game.started_at,
            next_reveal,
            companies: game.companies.iter().map(|c| CompanyView::build(c, game, now)).collect(),
            participants,
            trades: game.trades.clone(),
        }
    }

    #[inline]
    pub fn company(&self, company_id: CompanyId) -> Option<&CompanyView> {
        self.companies.iter().find(|c| c.id == company_id)
    }

    #[inline]
    pub fn participant(&self, user_id: UserId) -> Option<&ParticipantView> {
        self.participants.iter().find(|p| p.id == user_id)
    }
}

impl GameSummary {
    pub fn build(game: &Game, now: DateTime<Utc>) -> Self {
        Self {
            id: game.id,
            theme: game.theme.clone(),
            title: game.title.clone(),
            phase: Phase::of(game, now),
            owner: game.owner,
            participants: game.participants.len(),
            created_at: game.created_at,
        }
    }
}
