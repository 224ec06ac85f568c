//! Billing provider events
//!
//! The webhook endpoint verifies and decodes the provider's payload into a
//! [`BillingEvent`]; this module applies it to the stored record. The
//! provider is the source of truth, so these updates are applied from any
//! state, unlike the dashboard transitions in [`crate::lifecycle`].

use chrono::{DateTime, Utc};
use folio_plans::{PlanTier, SubscriptionRecord, SubscriptionStatus};
use serde::{Deserialize, Serialize};

use crate::error::LifecycleResult;

/// Normalized billing provider event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum BillingEvent {
    /// Checkout finished and the first payment succeeded
    CheckoutCompleted { plan: PlanTier },
    /// Provider changed status, period or cancellation flag
    SubscriptionUpdated {
        status: SubscriptionStatus,
        cancel_at_period_end: bool,
        #[serde(default)]
        period_start: Option<DateTime<Utc>>,
        #[serde(default)]
        period_end: Option<DateTime<Utc>>,
    },
    /// Subscription ended at the provider
    SubscriptionDeleted,
    /// Recurring charge succeeded
    PaymentSucceeded,
    /// Recurring charge failed
    PaymentFailed,
}

impl BillingEvent {
    /// Provider event name this event is decoded from.
    pub fn provider_event_type(&self) -> &'static str {
        match self {
            BillingEvent::CheckoutCompleted { .. } => "checkout.session.completed",
            BillingEvent::SubscriptionUpdated { .. } => "customer.subscription.updated",
            BillingEvent::SubscriptionDeleted => "customer.subscription.deleted",
            BillingEvent::PaymentSucceeded => "invoice.payment_succeeded",
            BillingEvent::PaymentFailed => "invoice.payment_failed",
        }
    }
}

/// Map a provider status string to a [`SubscriptionStatus`].
///
/// Unknown strings map to `Active`.
///
/// # Examples
///
/// ```
/// use folio_billing::provider_status;
/// use folio_plans::SubscriptionStatus;
///
/// assert_eq!(provider_status("past_due"), SubscriptionStatus::PastDue);
/// assert_eq!(provider_status("paused"), SubscriptionStatus::Active);
/// ```
pub fn provider_status(status: &str) -> SubscriptionStatus {
    SubscriptionStatus::parse(status).unwrap_or_else(|| {
        tracing::warn!(status, "Unknown provider subscription status, treating as active");
        SubscriptionStatus::Active
    })
}

/// Apply a billing event to a stored record.
///
/// The result always satisfies the record invariants; an update whose
/// period ends before it starts is refused.
pub fn apply_billing_event(
    record: &SubscriptionRecord,
    event: &BillingEvent,
) -> LifecycleResult<SubscriptionRecord> {
    let mut next = record.clone();

    match event {
        BillingEvent::CheckoutCompleted { plan } => {
            if !plan.is_paid() {
                tracing::warn!(plan = %plan, "Ignoring checkout for an unpaid plan");
                return Ok(next);
            }
            next.plan_type = *plan;
            next.status = SubscriptionStatus::Active;
            next.cancel_at_period_end = false;
            tracing::info!(from = %record.plan_type, to = %plan, "Checkout completed");
        }
        BillingEvent::SubscriptionUpdated {
            status,
            cancel_at_period_end,
            period_start,
            period_end,
        } => {
            next.status = *status;
            next.cancel_at_period_end = *cancel_at_period_end && status.is_entitled() && next.plan_type.is_paid();
            next.current_period_start = *period_start;
            next.current_period_end = *period_end;
            if *cancel_at_period_end && !next.cancel_at_period_end {
                tracing::warn!(status = %status, plan = %next.plan_type, "Dropping cancel flag the record cannot carry");
            }
            tracing::info!(status = %status, cancel_at_period_end = next.cancel_at_period_end, "Subscription updated");
        }
        BillingEvent::SubscriptionDeleted => {
            next = SubscriptionRecord::free();
            tracing::info!(previous = %record.plan_type, "Subscription deleted, reverting to free");
        }
        BillingEvent::PaymentSucceeded => {
            tracing::debug!(plan = %record.plan_type, "Payment succeeded");
        }
        BillingEvent::PaymentFailed => {
            next.status = SubscriptionStatus::PastDue;
            next.cancel_at_period_end = false;
            tracing::warn!(plan = %record.plan_type, "Payment failed, subscription past due");
        }
    }

    next.validate()?;
    Ok(next)
}
