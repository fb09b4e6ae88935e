use crate::holdings::Holdings;
use market_types::{Gold, Trade, UserId};
use price_engine::PriceBoard;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub pnl: BTreeMap<UserId, Gold>,
}

impl GameResult {
    #[inline]
    pub fn get(&self, user_id: UserId) -> Option<Gold> {
        self.pnl.get(&user_id).copied()
    }

    /// Best result first, ties broken by user id.
    pub fn standings(&self) -> Vec<(UserId, Gold)> {
        let mut standings: Vec<_> = self.pnl.iter().map(|(u, p)| (*u, *p)).collect();
        standings.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        standings
    }
}

/// Scores a closed game.
///
/// Each trade contributes `-price_on_trade_day * amount`, and each remaining
/// position is marked at the final price. Open positions therefore count at
/// their closing value without having to be sold first.
pub fn game_result(participants: &[UserId], trades: &[Trade], board: &PriceBoard) -> GameResult {
    let mut pnl: BTreeMap<UserId, Gold> = participants.iter().map(|u| (*u, 0)).collect();

    for trade in trades {
        let Some(price) = board.price_on_day(trade.company_id, trade.day) else {
            continue;
        };
        let entry = pnl.entry(trade.user_id).or_insert(0);
        *entry = entry.saturating_sub(price.saturating_mul(trade.amount));
    }

    for (user_id, total) in pnl.iter_mut() {
        let holdings = Holdings::compute(*user_id, board.company_ids(), trades);
        for (company_id, holding) in holdings.iter() {
            if let Some(final_price) = board.price(company_id) {
                *total = total.saturating_add(final_price.saturating_mul(holding));
            }
        }
    }

    GameResult { pnl }
}
