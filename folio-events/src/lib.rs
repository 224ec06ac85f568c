//! # Folio Events
//!
//! Subscription lifecycle events for the Folio platform, and the bus that
//! carries them to the rest of the system.
//!
//! ## Overview
//!
//! The folio-events crate handles:
//! - **Event Envelope**: Id, source, tenant, correlation id and JSON payload
//! - **Subscription Events**: Upgrades, cancellations, reverts, status changes
//! - **Event Bus**: Publish/subscribe with topic wildcards
//! - **Event Handlers**: Async event processing
//!
//! ## Usage
//!
//! ```rust,no_run
//! use folio_events::{EventBus, EventSource, MemoryEventBus, SubscriptionEvent};
//! use folio_plans::PlanTier;
//! use uuid::Uuid;
//!
//! async fn example() {
//!     let bus = MemoryEventBus::new();
//!
//!     // Watch every revert, whatever caused it
//!     let mut sub = bus.subscribe("#.reverted_to_free").await.unwrap();
//!
//!     let event = SubscriptionEvent::RevertedToFree { previous: PlanTier::Pro }
//!         .to_event(EventSource::Scheduler)
//!         .unwrap()
//!         .with_tenant(Uuid::now_v7());
//!     bus.publish(event).await.unwrap();
//!
//!     let received = sub.recv().await.unwrap();
//!     println!("{} for {:?}", received.event_type, received.tenant_id);
//! }
//! ```
//!
//! ## Topic Patterns
//!
//! Topics are structured as `{source}.{event_type}`:
//! - `billing.subscription.payment_failed` - Specific event
//! - `billing.subscription.*` - Every subscription event from webhooks
//! - `#` - All events
//!
//! Wildcards:
//! - `*` matches exactly one segment
//! - `#` matches zero or more segments

pub mod bus;
pub mod types;

// Re-export main types
pub use bus::{EventBus, EventBusError, EventBusResult, EventBusStats, EventHandler, MemoryEventBus, Subscription};
pub use types::{Event, EventSource, SubscriptionEvent};
