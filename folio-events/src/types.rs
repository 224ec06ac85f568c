//! Event types for subscription changes
//!
//! Every change to a tenant's subscription is announced as a
//! [`SubscriptionEvent`] wrapped in the generic [`Event`] envelope, so that
//! the admin panel, cache invalidation and mail jobs can react without
//! reaching into the billing code.

use chrono::{DateTime, Utc};
use folio_plans::{PlanTier, SubscriptionStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Subsystem that caused an event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    /// Payment provider webhook
    Billing,
    /// Action taken by the creator in the dashboard
    Dashboard,
    /// Period-end sweep
    Scheduler,
}

impl EventSource {
    /// Get the topic prefix for this source.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventSource::Billing => "billing",
            EventSource::Dashboard => "dashboard",
            EventSource::Scheduler => "scheduler",
        }
    }
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event envelope.
///
/// All events are wrapped in this envelope which provides metadata
/// for routing, tracing, and processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique event ID
    pub id: Uuid,

    /// Event type (e.g., "subscription.upgraded")
    pub event_type: String,

    /// Subsystem that caused the event
    pub source: EventSource,

    /// Timestamp when event was created
    pub timestamp: DateTime<Utc>,

    /// Tenant whose subscription changed
    pub tenant_id: Option<Uuid>,

    /// Correlation ID for tracing (e.g. the provider's webhook event id)
    pub correlation_id: Option<String>,

    /// Event version for schema evolution
    pub version: u32,

    /// Event payload
    pub payload: serde_json::Value,

    /// Additional metadata
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Event {
    /// Create a new event.
    pub fn new(event_type: impl Into<String>, source: EventSource, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::now_v7(),
            event_type: event_type.into(),
            source,
            timestamp: Utc::now(),
            tenant_id: None,
            correlation_id: None,
            version: 1,
            payload,
            metadata: HashMap::new(),
        }
    }

    /// Set tenant context.
    pub fn with_tenant(mut self, tenant_id: Uuid) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    /// Set correlation ID.
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Add metadata.
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Get the topic for this event.
    ///
    /// Topics are structured as: `{source}.{event_type}`
    pub fn topic(&self) -> String {
        format!("{}.{}", self.source.as_str(), self.event_type)
    }

    /// Parse the payload into a specific type.
    pub fn parse_payload<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}

/// Subscription lifecycle events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SubscriptionEvent {
    /// Plan moved to a higher tier
    Upgraded { from: PlanTier, to: PlanTier },
    /// Cancellation scheduled for the end of the period
    CancelScheduled {
        plan: PlanTier,
        period_end: Option<DateTime<Utc>>,
    },
    /// Scheduled cancellation withdrawn
    CancelReverted { plan: PlanTier },
    /// Paid plan ended and the tenant is on FREE again
    RevertedToFree { previous: PlanTier },
    /// Provider reported a new status
    StatusChanged {
        from: SubscriptionStatus,
        to: SubscriptionStatus,
    },
    /// A recurring charge failed
    PaymentFailed { plan: PlanTier },
}

impl SubscriptionEvent {
    /// Event type string, without the source prefix.
    pub fn event_type(&self) -> &'static str {
        match self {
            SubscriptionEvent::Upgraded { .. } => "subscription.upgraded",
            SubscriptionEvent::CancelScheduled { .. } => "subscription.cancel_scheduled",
            SubscriptionEvent::CancelReverted { .. } => "subscription.cancel_reverted",
            SubscriptionEvent::RevertedToFree { .. } => "subscription.reverted_to_free",
            SubscriptionEvent::StatusChanged { .. } => "subscription.status_changed",
            SubscriptionEvent::PaymentFailed { .. } => "subscription.payment_failed",
        }
    }

    /// Convert to generic event.
    pub fn to_event(&self, source: EventSource) -> Result<Event, serde_json::Error> {
        Ok(Event::new(self.event_type(), source, serde_json::to_value(self)?))
    }
}
