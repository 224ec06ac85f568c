//! Error types for entitlement evaluation
//!
//! Reaching a quota is a normal outcome and is returned as a value. The errors
//! here signal caller bugs (unknown keys) or a broken deployment (bad
//! configuration) and are meant to propagate to a top-level handler.

use folio_plans::PlanError;
use thiserror::Error;

use crate::config::ConfigError;

/// Entitlement error types.
#[derive(Debug, Error)]
pub enum EntitlementError {
    /// Key does not name a countable resource
    #[error("Unknown resource type: {0}")]
    UnknownResourceType(String),

    /// Key does not name a gated feature
    #[error("Unknown feature: {0}")]
    UnknownFeature(String),

    /// Plan catalog or settings are unusable
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Environment configuration is invalid
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for entitlement operations.
pub type EntitlementResult<T> = Result<T, EntitlementError>;

impl EntitlementError {
    /// Get HTTP status code for this error.
    ///
    /// Every variant is a programmer or deployment fault.
    pub fn status_code(&self) -> u16 {
        500
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            EntitlementError::UnknownResourceType(_) => "UNKNOWN_RESOURCE_TYPE",
            EntitlementError::UnknownFeature(_) => "UNKNOWN_FEATURE",
            EntitlementError::Configuration(_) | EntitlementError::Config(_) => "CONFIG_ERROR",
        }
    }
}

impl From<PlanError> for EntitlementError {
    fn from(err: PlanError) -> Self {
        EntitlementError::Configuration(err.to_string())
    }
}
