//! # Folio Billing
//!
//! Subscription lifecycle for the Folio platform: dashboard transitions,
//! billing provider events and the period-end sweep.
//!
//! ## Overview
//!
//! The folio-billing crate handles:
//! - **Lifecycle**: Cancel, resume, upgrade and period-end reconciliation as
//!   pure record transitions
//! - **Billing Events**: Applying normalized provider webhooks to a record
//! - **Service**: Running transitions and publishing `SubscriptionEvent`s
//!
//! ## Architecture
//!
//! ```text
//! Dashboard ──→ request_cancel / request_resume / set_plan ─┐
//! Provider  ──→ apply_billing_event ────────────────────────┼─→ SubscriptionRecord
//! Scheduler ──→ apply_period_end_reconciliation ────────────┘        │
//!                                                                    ↓
//!                                     SubscriptionService ──→ EventBus
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use chrono::{Duration, Utc};
//! use folio_billing::{apply_period_end_reconciliation, request_cancel};
//! use folio_plans::{PlanTier, SubscriptionRecord};
//!
//! let start = Utc::now();
//! let record = SubscriptionRecord::paid(PlanTier::Pro, start, start + Duration::days(30));
//!
//! let canceled = request_cancel(&record).unwrap();
//! assert!(canceled.cancel_at_period_end);
//!
//! // Still PRO until the period ends
//! let today = apply_period_end_reconciliation(&canceled, start + Duration::days(1)).unwrap();
//! assert_eq!(today.plan_type, PlanTier::Pro);
//!
//! let later = apply_period_end_reconciliation(&canceled, start + Duration::days(30)).unwrap();
//! assert_eq!(later.plan_type, PlanTier::Free);
//! ```

pub mod error;
pub mod lifecycle;
pub mod service;
pub mod webhook;

// Re-export main types for convenience
pub use error::{LifecycleError, LifecycleResult};
pub use lifecycle::{apply_period_end_reconciliation, request_cancel, request_resume, set_plan};
pub use service::{changes, SubscriptionService, SweepReport};
pub use webhook::{apply_billing_event, provider_status, BillingEvent};
