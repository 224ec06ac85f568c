//! Error types for plan and subscription data
//!
//! These errors describe malformed input: unknown identifiers, catalogs that
//! do not cover every tier, and subscription records that break their
//! invariants. Hitting a quota is never an error.

use thiserror::Error;

use crate::tier::PlanTier;

/// Errors raised while parsing or validating plan data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    /// String does not name a plan tier
    #[error("Unknown plan tier: {0}")]
    UnknownTier(String),

    /// String does not name a subscription status
    #[error("Unknown subscription status: {0}")]
    UnknownStatus(String),

    /// Catalog has no entry for a tier
    #[error("Plan catalog is missing tier {0}")]
    MissingTier(PlanTier),

    /// Catalog lists a tier more than once
    #[error("Plan catalog lists tier {0} more than once")]
    DuplicateTier(PlanTier),

    /// Quota below zero that is not the unlimited sentinel
    #[error("Quota must be non-negative, got {0}")]
    NegativeQuota(i32),

    /// A higher tier grants less than a lower tier
    #[error("Plan catalog is not monotonic: {resource} for {higher} is below {lower}")]
    NonMonotonic {
        /// Limit field that breaks the ordering
        resource: &'static str,
        /// Lower tier
        lower: PlanTier,
        /// Higher tier
        higher: PlanTier,
    },

    /// Catalog document could not be decoded
    #[error("Malformed plan catalog: {0}")]
    MalformedCatalog(String),

    /// Subscription record breaks a structural invariant
    #[error("Invalid subscription record: {0}")]
    InvalidRecord(String),
}

/// Result type for plan operations.
pub type PlanResult<T> = Result<T, PlanError>;

impl PlanError {
    /// Whether this error comes from startup configuration rather than request input.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            PlanError::MissingTier(_)
                | PlanError::DuplicateTier(_)
                | PlanError::NegativeQuota(_)
                | PlanError::NonMonotonic { .. }
                | PlanError::MalformedCatalog(_)
        )
    }
}

impl From<serde_json::Error> for PlanError {
    fn from(err: serde_json::Error) -> Self {
        PlanError::MalformedCatalog(err.to_string())
    }
}
