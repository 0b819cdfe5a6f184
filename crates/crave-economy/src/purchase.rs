//! Purchase evaluation for the coin store.
//!
//! The checks run in a fixed order so callers always see the same error
//! for the same state: an item the user already owns reports
//! [`EconomyError::AlreadyOwned`] even when the balance is also short.
//! Whether the item exists is the caller's first check; this module
//! only sees items that do.

use crate::EconomyError;
use crate::coins::debit;

/// Decide whether a purchase may proceed and return the balance after it.
///
/// # Arguments
///
/// * `balance` - The buyer's current balance.
/// * `price` - The item's price.
/// * `already_owned` - Whether the buyer already has an ownership record.
///
/// # Errors
///
/// - [`EconomyError::AlreadyOwned`] if `already_owned` is set.
/// - [`EconomyError::NegativeAmount`] if the price is negative.
/// - [`EconomyError::InsufficientFunds`] if `balance < price`.
pub const fn evaluate_purchase(
    balance: i64,
    price: i64,
    already_owned: bool,
) -> Result<i64, EconomyError> {
    if already_owned {
        return Err(EconomyError::AlreadyOwned);
    }
    debit(balance, price)
}
