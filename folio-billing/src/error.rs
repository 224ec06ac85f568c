//! Error types for subscription lifecycle operations
//!
//! These are the refusals a creator can trigger from the dashboard (cancel
//! twice, downgrade) plus records that fail structural validation.

use folio_plans::{PlanError, PlanTier, SubscriptionMode};
use thiserror::Error;

/// Lifecycle error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// Cancellation requires an active paid plan with nothing pending
    #[error("Subscription cannot be canceled in state {mode}")]
    NotCancelable {
        /// State the record was in
        mode: SubscriptionMode,
    },

    /// Nothing is scheduled to be canceled
    #[error("No scheduled cancellation to resume")]
    NotResumable,

    /// Plan changes only move upward
    #[error("Cannot change plan from {from} to {to}: downgrades are not supported")]
    DowngradeNotAllowed {
        /// Current tier
        from: PlanTier,
        /// Requested tier
        to: PlanTier,
    },

    /// Requested tier is the current one
    #[error("Already on the {0} plan")]
    AlreadyOnPlan(PlanTier),

    /// Input record violates a structural invariant
    #[error("Invalid subscription record: {0}")]
    InvalidRecord(String),
}

/// Result type for lifecycle operations.
pub type LifecycleResult<T> = Result<T, LifecycleError>;

impl LifecycleError {
    /// Check if this error should be logged at error level.
    ///
    /// Refused transitions are user mistakes; an invalid record points at
    /// corrupted storage.
    pub fn is_server_error(&self) -> bool {
        matches!(self, LifecycleError::InvalidRecord(_))
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            LifecycleError::NotCancelable { .. }
            | LifecycleError::NotResumable
            | LifecycleError::DowngradeNotAllowed { .. }
            | LifecycleError::AlreadyOnPlan(_) => 409,

            LifecycleError::InvalidRecord(_) => 422,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            LifecycleError::NotCancelable { .. } => "NOT_CANCELABLE",
            LifecycleError::NotResumable => "NOT_RESUMABLE",
            LifecycleError::DowngradeNotAllowed { .. } => "DOWNGRADE_NOT_ALLOWED",
            LifecycleError::AlreadyOnPlan(_) => "ALREADY_ON_PLAN",
            LifecycleError::InvalidRecord(_) => "INVALID_RECORD",
        }
    }
}

impl From<PlanError> for LifecycleError {
    fn from(err: PlanError) -> Self {
        match err {
            PlanError::InvalidRecord(reason) => LifecycleError::InvalidRecord(reason),
            other => LifecycleError::InvalidRecord(other.to_string()),
        }
    }
}
