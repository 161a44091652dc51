//! Star rating type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Rating`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingError {
    /// The value is outside the 1-5 star range.
    #[error("rating must be between {min} and {max} stars", min = Rating::MIN, max = Rating::MAX)]
    OutOfRange,
}

/// A star rating between 1 and 5 inclusive.
///
/// Used both for individual review ratings and for the catalog's minimum
/// rating filter.
///
/// ## Examples
///
/// ```
/// use wishmark_core::Rating;
///
/// let rating = Rating::new(4).expect("in range");
/// assert_eq!(rating.as_u8(), 4);
///
/// assert!(Rating::new(0).is_err());
/// assert!(Rating::new(6).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Minimum allowed rating.
    pub const MIN: u8 = 1;

    /// Maximum allowed rating.
    pub const MAX: u8 = 5;

    /// Create a `Rating`, rejecting values outside 1-5.
    ///
    /// # Errors
    ///
    /// Returns [`RatingError::OutOfRange`] if `value` is 0 or greater than 5.
    pub const fn new(value: u8) -> Result<Self, RatingError> {
        if value >= Self::MIN && value <= Self::MAX {
            Ok(Self(value))
        } else {
            Err(RatingError::OutOfRange)
        }
    }

    /// Get the underlying star count.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for Rating {
    type Error = RatingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_the_full_star_range() {
        for value in 1..=5 {
            let rating = Rating::new(value).expect("in range");
            assert_eq!(rating.as_u8(), value);
        }
    }

    #[test]
    fn rejects_zero_and_above_five() {
        assert_eq!(Rating::new(0), Err(RatingError::OutOfRange));
        assert_eq!(Rating::new(6), Err(RatingError::OutOfRange));
        assert_eq!(Rating::try_from(255), Err(RatingError::OutOfRange));
    }

    #[test]
    fn orders_by_star_count() {
        let two = Rating::new(2).expect("in range");
        let four = Rating::new(4).expect("in range");
        assert!(two < four);
    }

    #[test]
    fn displays_the_star_count() {
        let rating = Rating::new(3).expect("in range");
        assert_eq!(rating.to_string(), "3");
    }

    #[test]
    fn deserialization_goes_through_range_validation() {
        // Backend review JSON must not smuggle in out-of-range stars.
        assert!(serde_json::from_str::<Rating>("0").is_err());
        assert!(serde_json::from_str::<Rating>("7").is_err());

        let three: Rating = serde_json::from_str("3").expect("in range");
        assert_eq!(three.as_u8(), 3);
    }

    #[test]
    fn serializes_as_a_bare_number() {
        let four = Rating::new(4).expect("in range");
        let json = serde_json::to_string(&four).expect("serializes");
        assert_eq!(json, "4");
    }
}
