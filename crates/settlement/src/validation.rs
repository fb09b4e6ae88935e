use crate::holdings::Holdings;
use market_types::{CompanyId, Gold, Shares};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a whole trade batch was refused. Nothing from a refused batch is applied.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeError {
    #[error("Batch needs {required} gold but only {available} is available")]
    InsufficientGold { required: Gold, available: Gold },

    #[error("Batch would leave {holding} shares of company {company_id}")]
    NegativeHoldings { company_id: CompanyId, holding: Shares },

    #[error("Trade in company {company_id} is too large to settle")]
    Overflow { company_id: CompanyId },
}

#[inline]
pub fn validate_gold(starting_gold: Gold, remaining_gold: Gold) -> Result<(), TradeError> {
    if remaining_gold < 0 {
        return Err(TradeError::InsufficientGold {
            required: starting_gold.saturating_sub(remaining_gold),
            available: starting_gold,
        });
    }
    Ok(())
}

#[inline]
pub fn validate_holdings(holdings: &Holdings) -> Result<(), TradeError> {
    match holdings.first_negative() {
        Some((company_id, holding)) => Err(TradeError::NegativeHoldings { company_id, holding }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_gold() {
        assert!(validate_gold(1000, 0).is_ok());
        assert_eq!(
            validate_gold(1000, -200),
            Err(TradeError::InsufficientGold { required: 1200, available: 1000 })
        );
    }

    #[test]
    fn test_validate_holdings() {
        let mut holdings = Holdings::with_companies([CompanyId(1)]);
        assert!(validate_holdings(&holdings).is_ok());

        holdings.apply(CompanyId(1), -1);
        assert_eq!(
            validate_holdings(&holdings),
            Err(TradeError::NegativeHoldings { company_id: CompanyId(1), holding: -1 })
        );
    }

    #[test]
    fn test_error_messages() {
        let err = TradeError::InsufficientGold { required: 1200, available: 1000 };
        assert_eq!(err.to_string(), "Batch needs 1200 gold but only 1000 is available");

        let err = TradeError::Overflow { company_id: CompanyId(3) };
        assert_eq!(err.to_string(), "Trade in company 3 is too large to settle");
    }
}
