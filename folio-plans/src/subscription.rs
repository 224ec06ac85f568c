//! Subscription records
//!
//! A [`SubscriptionRecord`] is the per-tenant billing state the entitlement
//! checks read. Records are plain values: the lifecycle functions in
//! `folio-billing` return new records and the caller persists them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{PlanError, PlanResult};
use crate::tier::PlanTier;

/// Billing status of a subscription.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionStatus {
    /// Paid and current
    Active,

    /// In a trial period
    Trialing,

    /// Last charge failed
    PastDue,

    /// Ended by the billing provider
    Canceled,

    /// Awaiting the first payment
    Incomplete,
}

impl SubscriptionStatus {
    /// Whether the status currently grants the plan's entitlements.
    pub fn is_entitled(&self) -> bool {
        matches!(self, SubscriptionStatus::Active | SubscriptionStatus::Trialing)
    }

    /// Get the wire representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "ACTIVE",
            SubscriptionStatus::Trialing => "TRIALING",
            SubscriptionStatus::PastDue => "PAST_DUE",
            SubscriptionStatus::Canceled => "CANCELED",
            SubscriptionStatus::Incomplete => "INCOMPLETE",
        }
    }

    /// Parse a status (case-insensitive, `-` and `_` interchangeable).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "active" => Some(SubscriptionStatus::Active),
            "trialing" => Some(SubscriptionStatus::Trialing),
            "past_due" => Some(SubscriptionStatus::PastDue),
            "canceled" | "cancelled" => Some(SubscriptionStatus::Canceled),
            "incomplete" => Some(SubscriptionStatus::Incomplete),
            _ => None,
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionStatus {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SubscriptionStatus::parse(s).ok_or_else(|| PlanError::UnknownStatus(s.to_string()))
    }
}

/// Named lifecycle state derived from a record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionMode {
    /// On the free plan
    Free,

    /// Paid plan in good standing
    PaidActive,

    /// Paid plan that ends at the current period end
    PaidCancelPending,

    /// Paid plan whose last charge failed
    PaidPastDue,

    /// Paid plan that is canceled or not yet paid for
    PaidInactive,
}

impl SubscriptionMode {
    /// Get the string representation of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionMode::Free => "free",
            SubscriptionMode::PaidActive => "paid_active",
            SubscriptionMode::PaidCancelPending => "paid_cancel_pending",
            SubscriptionMode::PaidPastDue => "paid_past_due",
            SubscriptionMode::PaidInactive => "paid_inactive",
        }
    }
}

impl fmt::Display for SubscriptionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-tenant subscription state.
///
/// # Invariants
///
/// - `cancel_at_period_end` implies the status is `Active` or `Trialing`
/// - a `Free` record is never pending cancellation
///
/// # Examples
///
/// ```
/// use folio_plans::{PlanTier, SubscriptionMode, SubscriptionRecord};
///
/// let record = SubscriptionRecord::free();
/// assert_eq!(record.plan_type, PlanTier::Free);
/// assert_eq!(record.mode(), SubscriptionMode::Free);
/// assert!(record.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRecord {
    /// Current plan tier
    pub plan_type: PlanTier,

    /// Billing status
    pub status: SubscriptionStatus,

    /// Start of the current billing period
    #[serde(default)]
    pub current_period_start: Option<DateTime<Utc>>,

    /// End of the current billing period
    #[serde(default)]
    pub current_period_end: Option<DateTime<Utc>>,

    /// Revert to free when the current period ends
    #[serde(default)]
    pub cancel_at_period_end: bool,
}

impl SubscriptionRecord {
    /// Record for a new signup: free plan, active, nothing pending.
    pub fn free() -> Self {
        Self {
            plan_type: PlanTier::Free,
            status: SubscriptionStatus::Active,
            current_period_start: None,
            current_period_end: None,
            cancel_at_period_end: false,
        }
    }

    /// Active paid record for a billing period.
    pub fn paid(plan_type: PlanTier, period_start: DateTime<Utc>, period_end: DateTime<Utc>) -> Self {
        Self {
            plan_type,
            status: SubscriptionStatus::Active,
            current_period_start: Some(period_start),
            current_period_end: Some(period_end),
            cancel_at_period_end: false,
        }
    }

    /// Set the billing status.
    pub fn with_status(mut self, status: SubscriptionStatus) -> Self {
        self.status = status;
        self
    }

    /// Check if the record is scheduled to revert to free.
    pub fn is_cancel_pending(&self) -> bool {
        self.cancel_at_period_end
    }

    /// Named lifecycle state for this record.
    pub fn mode(&self) -> SubscriptionMode {
        if !self.plan_type.is_paid() {
            return SubscriptionMode::Free;
        }
        match self.status {
            SubscriptionStatus::Active | SubscriptionStatus::Trialing => {
                if self.cancel_at_period_end {
                    SubscriptionMode::PaidCancelPending
                } else {
                    SubscriptionMode::PaidActive
                }
            }
            SubscriptionStatus::PastDue => SubscriptionMode::PaidPastDue,
            SubscriptionStatus::Canceled | SubscriptionStatus::Incomplete => {
                SubscriptionMode::PaidInactive
            }
        }
    }

    /// Check the record's structural invariants.
    pub fn validate(&self) -> PlanResult<()> {
        if self.cancel_at_period_end && !self.status.is_entitled() {
            return Err(PlanError::InvalidRecord(format!(
                "cancelAtPeriodEnd set on a {} subscription",
                self.status
            )));
        }
        if self.cancel_at_period_end && !self.plan_type.is_paid() {
            return Err(PlanError::InvalidRecord(
                "cancelAtPeriodEnd set on a FREE subscription".to_string(),
            ));
        }
        if let (Some(start), Some(end)) = (self.current_period_start, self.current_period_end) {
            if end < start {
                return Err(PlanError::InvalidRecord(
                    "currentPeriodEnd precedes currentPeriodStart".to_string(),
                ));
            }
        }
        Ok(())
    }
}

impl Default for SubscriptionRecord {
    fn default() -> Self {
        Self::free()
    }
}
