//! Rating values and aggregate recomputation.
//!
//! A game's aggregate is always recomputed from the full set of current
//! ratings rather than maintained incrementally. That is O(n) per write
//! and keeps the aggregate exact after an overwrite.

use crave_types::RatingSummary;

use crate::EconomyError;

/// Lowest accepted rating.
pub const MIN_RATING: u8 = 1;

/// Highest accepted rating.
pub const MAX_RATING: u8 = 5;

/// A rating value known to lie in `MIN_RATING..=MAX_RATING`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RatingValue(u8);

impl RatingValue {
    /// Validate a raw rating.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::RatingOutOfRange`] for anything outside `1..=5`.
    pub fn new(value: i64) -> Result<Self, EconomyError> {
        u8::try_from(value)
            .ok()
            .filter(|v| (MIN_RATING..=MAX_RATING).contains(v))
            .map(Self)
            .ok_or(EconomyError::RatingOutOfRange)
    }

    /// The validated value.
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for RatingValue {
    type Error = EconomyError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Compute the arithmetic mean and count of a set of ratings.
///
/// An empty set yields an average of `0.0` and a count of `0`, which is
/// also the state of a game nobody has rated.
pub fn summarize<I>(ratings: I) -> RatingSummary
where
    I: IntoIterator<Item = u8>,
{
    let (sum, count) = ratings
        .into_iter()
        .fold((0_u32, 0_u32), |(sum, count), rating| {
            (
                sum.saturating_add(u32::from(rating)),
                count.saturating_add(1),
            )
        });

    let average_rating = if count == 0 {
        0.0
    } else {
        f64::from(sum) / f64::from(count)
    };

    RatingSummary {
        average_rating,
        rating_count: count,
    }
}
