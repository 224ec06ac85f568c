//! # Folio Entitlements
//!
//! Answers "may this tenant do X under their plan?" for the Folio product.
//!
//! ## Overview
//!
//! The folio-entitlements crate handles:
//! - **Resources**: Countable things capped by a quota (artworks, links, posts)
//! - **Admission**: `OK / NEAR_LIMIT / AT_LIMIT / UNLIMITED` classification and
//!   server-side create checks
//! - **Features**: Binary per-tier features (categories, tags, markdown, custom CSS)
//! - **Custom CSS**: Line caps and forbidden-construct screening
//! - **Configuration**: Warning threshold and past-due policy from the environment
//!
//! ## Usage
//!
//! ```rust
//! use folio_entitlements::{EntitlementEvaluator, Feature, ResourceType, UsageSnapshot};
//! use folio_plans::{PlanTier, SubscriptionRecord};
//!
//! let evaluator = EntitlementEvaluator::default();
//! let mut record = SubscriptionRecord::free();
//! record.plan_type = PlanTier::Starter;
//!
//! // Server-side check before inserting a post
//! let admission = evaluator.admit(&record, ResourceType::Posts, 5);
//! assert!(!admission.is_granted());
//!
//! assert!(!evaluator.is_feature_available(&record, Feature::Tags));
//!
//! let report = evaluator.evaluate(&record, &UsageSnapshot::default());
//! assert!(!report.has_ads);
//! ```
//!
//! ## Concurrency
//!
//! Evaluation is pure. A check followed by an insert is not atomic; callers
//! that must never exceed a quota serialize the pair in their own store.

pub mod admission;
pub mod config;
pub mod css;
pub mod error;
pub mod evaluator;
pub mod feature;
pub mod resource;

// Re-export main types for convenience
pub use admission::{Admission, AdmissionState, LimitBadge, LimitExceeded, DEFAULT_WARN_THRESHOLD};
pub use config::{ConfigError, EntitlementConfig, PastDuePolicy};
pub use css::{count_lines, sanitize_custom_css, validate_custom_css, CssVerdict};
pub use error::{EntitlementError, EntitlementResult};
pub use evaluator::{EntitlementEvaluator, EntitlementReport, ResourceEntitlement};
pub use feature::Feature;
pub use resource::{ResourceType, UsageSnapshot};
