//! # Folio Plans
//!
//! This crate defines the plan tiers of the Folio portfolio-hosting product,
//! the limits attached to each tier, and the per-tenant subscription record.
//!
//! ## Overview
//!
//! The folio-plans crate handles:
//! - **Tiers**: `FREE < STARTER < PRO < STUDIO`, totally ordered
//! - **Quotas**: Numeric limits with an explicit unlimited sentinel
//! - **Limits**: Per-tier quotas, ad flag and custom CSS line cap
//! - **Catalog**: Complete tier → limits + pricing metadata mapping
//! - **Subscriptions**: Per-tenant billing state and its invariants
//! - **Stats**: Subscribers per tier and monthly recurring revenue
//!
//! ## Architecture
//!
//! ```text
//! PlanCatalog
//!   └─ PlanEntry (one per PlanTier)
//!        ├─ PlanLimits (Quota per resource)
//!        └─ PlanInfo (name, price, feature bullets)
//!
//! SubscriptionRecord
//!   ├─ PlanTier
//!   ├─ SubscriptionStatus
//!   └─ period + cancel-at-period-end flag
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use folio_plans::{is_unlimited, PlanCatalog, PlanTier, SubscriptionRecord};
//!
//! let catalog = PlanCatalog::standard();
//! let record = SubscriptionRecord::free();
//!
//! let limits = catalog.limits_for(record.plan_type);
//! assert_eq!(limits.max_artworks.finite(), Some(5));
//!
//! let studio = catalog.limits_for(PlanTier::Studio);
//! assert!(is_unlimited(studio.max_social_links.raw()));
//! ```
//!
//! ## Unlimited Quotas
//!
//! Existing data encodes "no limit" as `2147483647`. Compare through
//! [`is_unlimited`] or [`Quota`], never against the literal.

pub mod catalog;
pub mod error;
pub mod limits;
pub mod quota;
pub mod stats;
pub mod subscription;
pub mod tier;

// Re-export main types for convenience
pub use catalog::{PlanCatalog, PlanEntry, PlanInfo};
pub use error::{PlanError, PlanResult};
pub use limits::PlanLimits;
pub use quota::{is_unlimited, Quota, UNLIMITED_SENTINEL};
pub use stats::{PlanStats, TierStats};
pub use subscription::{SubscriptionMode, SubscriptionRecord, SubscriptionStatus};
pub use tier::PlanTier;
