//! Checked Crave Coins arithmetic and the click reward.

use rand::Rng;

use crate::EconomyError;

/// Smallest click reward.
pub const CLICK_REWARD_MIN: i64 = 1;

/// Largest click reward.
pub const CLICK_REWARD_MAX: i64 = 3;

/// Roll a click reward, uniformly distributed over
/// `CLICK_REWARD_MIN..=CLICK_REWARD_MAX`.
pub fn roll_click_reward<R: Rng + ?Sized>(rng: &mut R) -> i64 {
    rng.random_range(CLICK_REWARD_MIN..=CLICK_REWARD_MAX)
}

/// Add `amount` coins to `balance`.
///
/// # Errors
///
/// - [`EconomyError::NegativeAmount`] if `amount < 0`.
/// - [`EconomyError::BalanceOverflow`] if the sum does not fit.
pub const fn credit(balance: i64, amount: i64) -> Result<i64, EconomyError> {
    if amount < 0 {
        return Err(EconomyError::NegativeAmount(amount));
    }
    match balance.checked_add(amount) {
        Some(total) => Ok(total),
        None => Err(EconomyError::BalanceOverflow),
    }
}

/// Remove `amount` coins from `balance`.
///
/// # Errors
///
/// - [`EconomyError::NegativeAmount`] if `amount < 0`.
/// - [`EconomyError::InsufficientFunds`] if `balance < amount`.
pub const fn debit(balance: i64, amount: i64) -> Result<i64, EconomyError> {
    if amount < 0 {
        return Err(EconomyError::NegativeAmount(amount));
    }
    if balance < amount {
        return Err(EconomyError::InsufficientFunds {
            balance,
            price: amount,
        });
    }
    match balance.checked_sub(amount) {
        Some(rest) => Ok(rest),
        None => Err(EconomyError::BalanceOverflow),
    }
}
