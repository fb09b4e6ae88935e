use crate::history::price_history;
use chrono::{DateTime, Utc};
use event_clock::company_revealed;
use market_types::{Company, CompanyId, Game, Gold};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Price state of one company at an instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub company_id: CompanyId,
    /// Number of revealed events, which is also the index of `price` in `history`.
    pub day: u32,
    pub price: Gold,
    pub history: Vec<Gold>,
}

impl Quote {
    pub fn for_company(company: &Company, game: &Game, now: DateTime<Utc>) -> Self {
        let revealed = company_revealed(company, game, now);
        let history = price_history(company.initial_price, revealed.iter().map(|e| e.percent));

        Self {
            company_id: company.id,
            day: revealed.len() as u32,
            price: history[history.len() - 1],
            history,
        }
    }

    #[inline]
    pub fn price_on_day(&self, day: u32) -> Option<Gold> {
        self.history.get(day as usize).copied()
    }
}

/// Quotes for every company of a game, derived on read and never cached
/// across a mutation of the game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBoard {
    quotes: BTreeMap<CompanyId, Quote>,
}

impl PriceBoard {
    pub fn for_game(game: &Game, now: DateTime<Utc>) -> Self {
        let quotes = game
            .companies
            .iter()
            .map(|c| (c.id, Quote::for_company(c, game, now)))
            .collect();

        Self { quotes }
    }

    #[inline]
    pub fn quote(&self, company_id: CompanyId) -> Option<&Quote> {
        self.quotes.get(&company_id)
    }

    #[inline]
    pub fn price(&self, company_id: CompanyId) -> Option<Gold> {
        self.quotes.get(&company_id).map(|q| q.price)
    }

    #[inline]
    pub fn price_on_day(&self, company_id: CompanyId, day: u32) -> Option<Gold> {
        self.quotes.get(&company_id)?.price_on_day(day)
    }

    #[inline]
    pub fn contains(&self, company_id: CompanyId) -> bool {
        self.quotes.contains_key(&company_id)
    }

    #[inline]
    pub fn company_ids(&self) -> impl Iterator<Item = CompanyId> + '_ {
        self.quotes.keys().copied()
    }

    #[inline]
    pub fn quotes(&self) -> impl Iterator<Item = &Quote> {
        self.quotes.values()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

impl FromIterator<Quote> for PriceBoard {
    fn from_iter<T: IntoIterator<Item = Quote>>(iter: T) -> Self {
        Self {
            quotes: iter.into_iter().map(|q| (q.company_id, q)).collect(),
        }
    }
}
