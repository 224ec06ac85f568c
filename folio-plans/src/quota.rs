//! Quota values and the unlimited sentinel
//!
//! Stored data and existing clients encode "no limit" as the largest 32-bit
//! signed integer. [`is_unlimited`] is the only place that compares against
//! that value; everything else goes through [`Quota`].

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::error::PlanError;

/// Raw value that marks a quota as unlimited.
pub const UNLIMITED_SENTINEL: i32 = i32::MAX;

/// Returns `true` iff `value` is the unlimited sentinel.
///
/// # Examples
///
/// ```
/// use folio_plans::{is_unlimited, UNLIMITED_SENTINEL};
///
/// assert!(is_unlimited(2147483647));
/// assert!(is_unlimited(UNLIMITED_SENTINEL));
/// assert!(!is_unlimited(200));
/// ```
pub const fn is_unlimited(value: i32) -> bool {
    value == UNLIMITED_SENTINEL
}

/// Upper bound on how many of a resource a plan permits.
///
/// Serializes as the raw integer so the sentinel survives round trips through
/// storage and the JSON API. Unlimited sorts above every finite quota.
///
/// # Examples
///
/// ```
/// use folio_plans::Quota;
///
/// let quota = Quota::of(5);
/// assert_eq!(quota.finite(), Some(5));
/// assert!(Quota::UNLIMITED > quota);
/// assert_eq!(Quota::UNLIMITED.to_string(), "unlimited");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Quota(i32);

impl Quota {
    /// Quota with no upper bound.
    pub const UNLIMITED: Quota = Quota(UNLIMITED_SENTINEL);

    /// Quota that admits nothing.
    pub const NONE: Quota = Quota(0);

    /// Create a finite quota. Values at or above the sentinel are unlimited.
    pub const fn of(value: u32) -> Self {
        if value >= UNLIMITED_SENTINEL as u32 {
            Quota::UNLIMITED
        } else {
            Quota(value as i32)
        }
    }

    /// Raw stored value, including the sentinel.
    pub const fn raw(&self) -> i32 {
        self.0
    }

    /// Check if this quota has no upper bound.
    pub const fn is_unlimited(&self) -> bool {
        is_unlimited(self.0)
    }

    /// The finite bound, or `None` when unlimited.
    pub const fn finite(&self) -> Option<u32> {
        if self.is_unlimited() {
            None
        } else {
            Some(self.0 as u32)
        }
    }

    /// How many more units fit after `used`, or `None` when unlimited.
    pub fn remaining(&self, used: u64) -> Option<u64> {
        self.finite()
            .map(|limit| u64::from(limit).saturating_sub(used))
    }
}

impl TryFrom<i32> for Quota {
    type Error = PlanError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        if value < 0 {
            return Err(PlanError::NegativeQuota(value));
        }
        Ok(Quota(value))
    }
}

impl From<Quota> for i32 {
    fn from(quota: Quota) -> Self {
        quota.0
    }
}

impl PartialOrd for Quota {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Quota {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.finite(), other.finite()) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => a.cmp(&b),
        }
    }
}

impl fmt::Display for Quota {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.finite() {
            Some(limit) => write!(f, "{limit}"),
            None => f.write_str("unlimited"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_value() {
        assert_eq!(UNLIMITED_SENTINEL, 2147483647);
        assert!(Quota::UNLIMITED.is_unlimited());
        assert_eq!(Quota::UNLIMITED.raw(), 2147483647);
        assert!(!Quota::of(2147483646).is_unlimited());
    }

    #[test]
    fn test_of_saturates_to_unlimited() {
        assert_eq!(Quota::of(u32::MAX), Quota::UNLIMITED);
        assert_eq!(Quota::of(2147483647), Quota::UNLIMITED);
    }

    #[test]
    fn test_unlimited_sorts_last() {
        let mut quotas = vec![Quota::UNLIMITED, Quota::of(10), Quota::NONE, Quota::of(200)];
        quotas.sort();
        assert_eq!(
            quotas,
            vec![Quota::NONE, Quota::of(10), Quota::of(200), Quota::UNLIMITED]
        );
    }

    #[test]
    fn test_remaining() {
        assert_eq!(Quota::of(5).remaining(3), Some(2));
        assert_eq!(Quota::of(5).remaining(9), Some(0));
        assert_eq!(Quota::UNLIMITED.remaining(1_000_000), None);
    }

    #[test]
    fn test_serde_keeps_sentinel() {
        let json = serde_json::to_string(&Quota::UNLIMITED).unwrap();
        assert_eq!(json, "2147483647");

        let quota: Quota = serde_json::from_str("2147483647").unwrap();
        assert!(quota.is_unlimited());

        assert!(serde_json::from_str::<Quota>("-1").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Quota::of(50).to_string(), "50");
        assert_eq!(Quota::UNLIMITED.to_string(), "unlimited");
    }
}
