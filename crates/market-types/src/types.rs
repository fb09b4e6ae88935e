use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of event days every company carries.
pub const DAYS_PER_GAME: u32 = 7;

/// Number of companies a generated lineup must contain.
pub const COMPANIES_PER_GAME: usize = 5;

/// Gold amounts and share prices. Whole units only.
pub type Gold = i64;

/// Signed share amount: positive buys, negative sells.
pub type Shares = i64;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            #[inline]
            pub fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            #[inline]
            pub fn as_u64(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            #[inline]
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

define_id!(
    /// Identifies one play session.
    GameId
);
define_id!(CompanyId);
define_id!(EventId);
define_id!(
    /// Identifies a registered player.
    UserId
);
define_id!(TradeId);
