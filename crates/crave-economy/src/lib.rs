//! Rating aggregation and Crave Coins bookkeeping for the portal.
//!
//! This crate holds the only business arithmetic in the system. It is
//! pure: no I/O, no clocks, no storage. Both storage backends call into
//! it from inside their atomic sections so the rules exist exactly once.
//!
//! # Modules
//!
//! - [`rating`] -- Validated 1-5 rating values and average recomputation
//! - [`purchase`] -- Ordered purchase checks (ownership, then funds)
//! - [`coins`] -- Checked balance arithmetic and the click reward roll
//!
//! # Balance Invariants
//!
//! Balances are whole coins held in an `i64`:
//!
//! - a debit never takes a balance below zero;
//! - a credit never overflows (overflow is an error, never a wrap);
//! - amounts moved are never negative.
//!
//! # Usage
//!
//! ```
//! use crave_economy::purchase::evaluate_purchase;
//! use crave_economy::rating::{summarize, RatingValue};
//!
//! // A 500-coin avatar bought with exactly 500 coins leaves 0.
//! assert_eq!(evaluate_purchase(500, 500, false).ok(), Some(0));
//!
//! // Ratings {3, 5} average to 4.0 over 2 votes.
//! let summary = summarize([3, 5]);
//! assert_eq!(summary.rating_count, 2);
//! assert!(RatingValue::new(6).is_err());
//! ```

pub mod coins;
pub mod purchase;
pub mod rating;

// Re-export primary items at crate root.
pub use coins::{CLICK_REWARD_MAX, CLICK_REWARD_MIN, credit, debit, roll_click_reward};
pub use purchase::evaluate_purchase;
pub use rating::{MAX_RATING, MIN_RATING, RatingValue, summarize};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised when a rating or coin movement breaks an economy rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EconomyError {
    /// A rating outside `1..=5` (or not an integer at all).
    #[error("Rating must be between 1 and 5")]
    RatingOutOfRange,

    /// The user already owns the store item.
    #[error("Already owned")]
    AlreadyOwned,

    /// The balance does not cover the price.
    #[error("Not enough coins")]
    InsufficientFunds {
        /// Balance at the time of the check.
        balance: i64,
        /// Amount that was required.
        price: i64,
    },

    /// A price or transfer amount was negative.
    #[error("coin amount must not be negative, got {0}")]
    NegativeAmount(i64),

    /// Crediting would overflow the balance.
    #[error("coin balance overflow")]
    BalanceOverflow,
}
