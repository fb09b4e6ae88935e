use market_types::{CompanyId, Game, Shares, Trade, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::{Add, AddAssign};

/// Net signed share count per company for one user.
///
/// Always a fold over the trade log: build it with [`Holdings::compute`]
/// whenever it is needed and drop it afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Holdings {
    positions: BTreeMap<CompanyId, Shares>,
}

impl Holdings {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_companies<I>(companies: I) -> Self
    where
        I: IntoIterator<Item = CompanyId>,
    {
        Self {
            positions: companies.into_iter().map(|id| (id, 0)).collect(),
        }
    }

    pub fn compute<'a, C, T>(user_id: UserId, companies: C, trades: T) -> Self
    where
        C: IntoIterator<Item = CompanyId>,
        T: IntoIterator<Item = &'a Trade>,
    {
        let mut holdings = Self::with_companies(companies);
        for trade in trades.into_iter().filter(|t| t.user_id == user_id) {
            holdings.apply(trade.company_id, trade.amount);
        }
        holdings
    }

    #[inline]
    pub fn for_game(game: &Game, user_id: UserId) -> Self {
        Self::compute(user_id, game.company_ids(), &game.trades)
    }

    #[inline]
    pub fn apply(&mut self, company_id: CompanyId, amount: Shares) {
        let position = self.positions.entry(company_id).or_insert(0);
        *position = position.saturating_add(amount);
    }

    #[inline]
    pub fn checked_apply(&mut self, company_id: CompanyId, amount: Shares) -> Option<Shares> {
        let position = self.positions.entry(company_id).or_insert(0);
        *position = position.checked_add(amount)?;
        Some(*position)
    }

    #[inline]
    pub fn get(&self, company_id: CompanyId) -> Shares {
        self.positions.get(&company_id).copied().unwrap_or(0)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (CompanyId, Shares)> + '_ {
        self.positions.iter().map(|(id, amount)| (*id, *amount))
    }

    #[inline]
    pub fn positive(&self) -> impl Iterator<Item = (CompanyId, Shares)> + '_ {
        self.iter().filter(|(_, amount)| *amount > 0)
    }

    #[inline]
    pub fn first_negative(&self) -> Option<(CompanyId, Shares)> {
        self.iter().find(|(_, amount)| *amount < 0)
    }

    #[inline]
    pub fn is_flat(&self) -> bool {
        self.positions.values().all(|amount| *amount == 0)
    }

    #[inline]
    pub fn as_map(&self) -> &BTreeMap<CompanyId, Shares> {
        &self.positions
    }
}

impl AddAssign for Holdings {
    fn add_assign(&mut self, rhs: Self) {
        for (company_id, amount) in rhs.positions {
            self.apply(company_id, amount);
        }
    }
}

impl Add for Holdings {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self::Output {
        self += rhs;
        self
    }
}
