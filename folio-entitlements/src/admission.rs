//! Admission decisions
//!
//! Outcomes of checking a usage count against a quota. They are returned as
//! values and marked `#[must_use]` so a caller cannot drop a denial silently.

use folio_plans::{PlanTier, Quota};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::resource::ResourceType;

/// Default fraction of a quota at which usage counts as near the limit.
pub const DEFAULT_WARN_THRESHOLD: f64 = 0.8;

/// Where a usage count sits relative to its quota.
///
/// Exactly one state applies to any (quota, count) pair.
#[must_use]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdmissionState {
    /// Below the warning threshold
    Ok,
    /// At or above the warning threshold, below the quota
    NearLimit,
    /// At or above the quota
    AtLimit,
    /// Quota is unlimited
    Unlimited,
}

impl AdmissionState {
    /// Classify `count` against `quota`.
    ///
    /// `warn_threshold` is a fraction of the quota; the near-limit boundary is
    /// inclusive and the at-limit boundary takes precedence.
    pub fn classify(quota: Quota, count: u64, warn_threshold: f64) -> Self {
        let Some(limit) = quota.finite() else {
            return AdmissionState::Unlimited;
        };
        let limit = u64::from(limit);
        if count >= limit {
            AdmissionState::AtLimit
        } else if count as f64 >= limit as f64 * warn_threshold {
            AdmissionState::NearLimit
        } else {
            AdmissionState::Ok
        }
    }

    /// Check if another unit can be added in this state.
    pub fn allows_add(&self) -> bool {
        !matches!(self, AdmissionState::AtLimit)
    }

    /// Check if the UI should show an upgrade prompt.
    pub fn needs_prompt(&self) -> bool {
        matches!(self, AdmissionState::NearLimit | AdmissionState::AtLimit)
    }
}

/// Compact `current / limit` display for a resource counter.
///
/// Unlimited quotas render the word `unlimited`, never the sentinel.
///
/// # Examples
///
/// ```
/// use folio_entitlements::LimitBadge;
/// use folio_plans::Quota;
///
/// assert_eq!(LimitBadge::new(3, Quota::of(5)).to_string(), "3 / 5");
/// assert_eq!(LimitBadge::new(12, Quota::UNLIMITED).to_string(), "12 / unlimited");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitBadge {
    /// Current usage
    pub current: u64,
    /// Quota for the resource
    pub limit: Quota,
}

impl LimitBadge {
    /// Create a badge.
    pub fn new(current: u64, limit: Quota) -> Self {
        Self { current, limit }
    }

    /// State used to pick the badge tone.
    pub fn state(&self) -> AdmissionState {
        AdmissionState::classify(self.limit, self.current, DEFAULT_WARN_THRESHOLD)
    }
}

impl fmt::Display for LimitBadge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.current, self.limit)
    }
}

/// Server-side outcome of a create request.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// The resource may be created
    Granted,
    /// The plan's quota is exhausted
    Denied(LimitExceeded),
}

impl Admission {
    /// Check if the request was granted.
    pub fn is_granted(&self) -> bool {
        matches!(self, Admission::Granted)
    }

    /// Convert into a `Result` so handlers can use `?`.
    pub fn into_result(self) -> Result<(), LimitExceeded> {
        match self {
            Admission::Granted => Ok(()),
            Admission::Denied(denial) => Err(denial),
        }
    }
}

/// User-facing description of an exhausted quota.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitExceeded {
    /// Resource that hit its quota
    pub resource: ResourceType,
    /// Tier the quota came from
    pub tier: PlanTier,
    /// The quota
    pub limit: Quota,
}

impl LimitExceeded {
    /// Get HTTP status code for this denial.
    pub fn status_code(&self) -> u16 {
        403
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        "LIMIT_EXCEEDED"
    }

    /// Message shown to the creator.
    pub fn message(&self) -> String {
        format!(
            "You have reached the {} limit ({}) of the {} plan. Upgrade your plan to add more.",
            self.resource.display_name(),
            self.limit,
            self.tier.display_name()
        )
    }
}

impl fmt::Display for LimitExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for LimitExceeded {}
