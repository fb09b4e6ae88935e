use crate::holdings::Holdings;
use crate::validation::{validate_gold, validate_holdings, TradeError};
use market_types::{CompanyId, Gold, Shares, TradeRequest};
use price_engine::PriceBoard;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A trade admitted by settlement, waiting for an id and a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeDraft {
    pub company_id: CompanyId,
    pub day: u32,
    pub amount: Shares,
    pub price: Gold,
}

impl TradeDraft {
    #[inline]
    pub fn cost(&self) -> Gold {
        self.price.saturating_mul(self.amount)
    }

    #[inline]
    pub fn checked_cost(&self) -> Option<Gold> {
        self.price.checked_mul(self.amount)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub drafts: Vec<TradeDraft>,
    pub gold: Gold,
    pub holdings: Holdings,
}

impl Settlement {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    #[inline]
    pub fn volume(&self) -> Gold {
        self.drafts
            .iter()
            .fold(0, |total: Gold, d| total.saturating_add(d.cost().saturating_abs()))
    }
}

/// Settles a trade batch against current prices.
///
/// Requests are applied in input order to a running gold balance and a
/// running holdings counter; the batch is judged once, after the last
/// request. Requests naming a company missing from `board` and requests for
/// zero shares are skipped. Any step that leaves the `i64` range refuses the
/// batch.
pub fn settle(
    gold: Gold,
    holdings: &Holdings,
    board: &PriceBoard,
    requests: &[TradeRequest],
) -> Result<Settlement, TradeError> {
    let mut running_gold = gold;
    let mut running_holdings = holdings.clone();
    let mut drafts = Vec::with_capacity(requests.len());

    for request in requests {
        let Some(quote) = board.quote(request.company_id) else {
            debug!("Ignoring trade request for unknown company {}", request.company_id);
            continue;
        };
        if request.amount == 0 {
            continue;
        }

        let draft = TradeDraft {
            company_id: request.company_id,
            day: quote.day,
            amount: request.amount,
            price: quote.price,
        };

        let overflow = TradeError::Overflow { company_id: draft.company_id };
        running_gold = draft
            .checked_cost()
            .and_then(|cost| running_gold.checked_sub(cost))
            .ok_or_else(|| overflow.clone())?;
        running_holdings
            .checked_apply(draft.company_id, draft.amount)
            .ok_or(overflow)?;
        drafts.push(draft);
    }

    validate_gold(gold, running_gold)?;
    validate_holdings(&running_holdings)?;

    Ok(Settlement {
        drafts,
        gold: running_gold,
        holdings: running_holdings,
    })
}

pub fn liquidate(gold: Gold, holdings: &Holdings, board: &PriceBoard) -> Settlement {
    let mut running_gold = gold;
    let mut running_holdings = holdings.clone();
    let mut drafts = Vec::new();

    for (company_id, holding) in holdings.positive() {
        let Some(quote) = board.quote(company_id) else {
            continue;
        };

        let draft = TradeDraft {
            company_id,
            day: quote.day,
            amount: -holding,
            price: quote.price,
        };

        running_gold = running_gold.saturating_sub(draft.cost());
        running_holdings.apply(company_id, draft.amount);
        drafts.push(draft);
    }

    Settlement {
        drafts,
        gold: running_gold,
        holdings: running_holdings,
    }
}
