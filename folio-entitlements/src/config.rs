//! Entitlement configuration.
//!
//! Settings are loaded from environment variables with defaults that match
//! the product's standard behavior, so an unconfigured process evaluates
//! entitlements exactly as the pricing page describes.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::admission::DEFAULT_WARN_THRESHOLD;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// How a subscription that is not active or trialing is treated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PastDuePolicy {
    /// Keep the paid plan's entitlements until the provider cancels
    #[default]
    Retain,
    /// Evaluate the tenant as free while past due, canceled or incomplete
    RevertToFree,
}

impl PastDuePolicy {
    /// Parse a policy name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "retain" => Some(PastDuePolicy::Retain),
            "revert_to_free" | "free" => Some(PastDuePolicy::RevertToFree),
            _ => None,
        }
    }
}

/// Settings for entitlement evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitlementConfig {
    /// Fraction of a quota at which usage is reported as near the limit.
    pub warn_threshold: f64,

    /// Treatment of past-due subscriptions.
    pub past_due_policy: PastDuePolicy,

    /// Optional JSON plan catalog replacing the built-in one.
    pub catalog_path: Option<PathBuf>,
}

impl Default for EntitlementConfig {
    fn default() -> Self {
        Self {
            warn_threshold: DEFAULT_WARN_THRESHOLD,
            past_due_policy: PastDuePolicy::default(),
            catalog_path: None,
        }
    }
}

impl EntitlementConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `FOLIO_WARN_THRESHOLD`: near-limit fraction (default: 0.8)
    /// - `FOLIO_PAST_DUE_POLICY`: `retain` or `revert_to_free` (default: retain)
    /// - `FOLIO_PLAN_CATALOG`: path to a JSON plan catalog
    ///
    /// Unparseable values fall back to the default and are logged.
    pub fn from_env() -> Self {
        let default = Self::default();

        let warn_threshold = match std::env::var("FOLIO_WARN_THRESHOLD") {
            Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "Ignoring unparseable FOLIO_WARN_THRESHOLD");
                default.warn_threshold
            }),
            Err(_) => default.warn_threshold,
        };

        let past_due_policy = match std::env::var("FOLIO_PAST_DUE_POLICY") {
            Ok(raw) => PastDuePolicy::parse(&raw).unwrap_or_else(|| {
                tracing::warn!(value = %raw, "Ignoring unknown FOLIO_PAST_DUE_POLICY");
                default.past_due_policy
            }),
            Err(_) => default.past_due_policy,
        };

        Self {
            warn_threshold,
            past_due_policy,
            catalog_path: std::env::var_os("FOLIO_PLAN_CATALOG").map(PathBuf::from),
        }
    }

    /// Set the near-limit fraction.
    pub fn with_warn_threshold(mut self, warn_threshold: f64) -> Self {
        self.warn_threshold = warn_threshold;
        self
    }

    /// Set the past-due policy.
    pub fn with_past_due_policy(mut self, policy: PastDuePolicy) -> Self {
        self.past_due_policy = policy;
        self
    }

    /// Validate that all values are in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.warn_threshold > 0.0 && self.warn_threshold <= 1.0) {
            return Err(ConfigError::InvalidValue {
                key: "FOLIO_WARN_THRESHOLD".to_string(),
                message: format!("must be in (0, 1], got {}", self.warn_threshold),
            });
        }
        Ok(())
    }
}
