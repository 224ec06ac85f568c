//! Subscription service
//!
//! Runs a lifecycle transition and announces what changed on the event bus.
//! The returned record is what the caller persists; publishing is best
//! effort and a failure to publish never undoes a transition.

use chrono::{DateTime, Utc};
use folio_events::{EventBus, EventSource, SubscriptionEvent};
use folio_plans::{PlanTier, SubscriptionRecord};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{LifecycleError, LifecycleResult};
use crate::lifecycle::{apply_period_end_reconciliation, request_cancel, request_resume, set_plan};
use crate::webhook::{apply_billing_event, BillingEvent};

/// Lifecycle operations with event publication.
pub struct SubscriptionService {
    bus: Arc<dyn EventBus>,
}

impl std::fmt::Debug for SubscriptionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionService").finish_non_exhaustive()
    }
}

/// Outcome of a period-end sweep.
#[derive(Debug, Default)]
pub struct SweepReport {
    /// Every input record after reconciliation, in input order
    pub records: Vec<(Uuid, SubscriptionRecord)>,
    /// Tenants reverted to free by this sweep
    pub reverted: Vec<Uuid>,
    /// Tenants whose record could not be reconciled; their record is kept as is
    pub failed: Vec<(Uuid, LifecycleError)>,
}

impl SubscriptionService {
    /// Create a service publishing on `bus`.
    pub fn new(bus: Arc<dyn EventBus>) -> Self {
        Self { bus }
    }

    /// Schedule cancellation at period end.
    pub async fn cancel(&self, tenant_id: Uuid, record: &SubscriptionRecord) -> LifecycleResult<SubscriptionRecord> {
        let next = request_cancel(record)?;
        self.announce(tenant_id, EventSource::Dashboard, None, record, &next).await;
        Ok(next)
    }

    /// Withdraw a scheduled cancellation.
    pub async fn resume(&self, tenant_id: Uuid, record: &SubscriptionRecord) -> LifecycleResult<SubscriptionRecord> {
        let next = request_resume(record)?;
        self.announce(tenant_id, EventSource::Dashboard, None, record, &next).await;
        Ok(next)
    }

    /// Upgrade to a higher tier.
    pub async fn upgrade(
        &self,
        tenant_id: Uuid,
        record: &SubscriptionRecord,
        tier: PlanTier,
    ) -> LifecycleResult<SubscriptionRecord> {
        let next = set_plan(record, tier)?;
        self.announce(tenant_id, EventSource::Dashboard, None, record, &next).await;
        Ok(next)
    }

    /// Apply a billing provider event.
    ///
    /// `correlation_id` is usually the provider's event id.
    pub async fn apply_billing_event(
        &self,
        tenant_id: Uuid,
        record: &SubscriptionRecord,
        event: &BillingEvent,
        correlation_id: Option<&str>,
    ) -> LifecycleResult<SubscriptionRecord> {
        let next = apply_billing_event(record, event).map_err(|e| {
            tracing::error!(
                tenant_id = %tenant_id,
                event = event.provider_event_type(),
                error = %e,
                "Billing event produced an invalid record"
            );
            e
        })?;

        self.announce(tenant_id, EventSource::Billing, correlation_id, record, &next)
            .await;
        if matches!(event, BillingEvent::PaymentFailed) {
            self.publish(
                tenant_id,
                EventSource::Billing,
                correlation_id,
                SubscriptionEvent::PaymentFailed { plan: next.plan_type },
            )
            .await;
        }
        Ok(next)
    }

    /// Run period-end reconciliation for one tenant.
    pub async fn reconcile(
        &self,
        tenant_id: Uuid,
        record: &SubscriptionRecord,
        now: DateTime<Utc>,
    ) -> LifecycleResult<SubscriptionRecord> {
        let next = apply_period_end_reconciliation(record, now)?;
        self.announce(tenant_id, EventSource::Scheduler, None, record, &next).await;
        Ok(next)
    }

    /// Run period-end reconciliation over a batch of tenants.
    pub async fn sweep(
        &self,
        records: impl IntoIterator<Item = (Uuid, SubscriptionRecord)>,
        now: DateTime<Utc>,
    ) -> SweepReport {
        let mut report = SweepReport::default();

        for (tenant_id, record) in records {
            match self.reconcile(tenant_id, &record, now).await {
                Ok(next) => {
                    if next.plan_type != record.plan_type {
                        report.reverted.push(tenant_id);
                    }
                    report.records.push((tenant_id, next));
                }
                Err(e) => {
                    tracing::error!(tenant_id = %tenant_id, error = %e, "Skipping record during sweep");
                    report.failed.push((tenant_id, e));
                    report.records.push((tenant_id, record));
                }
            }
        }

        tracing::info!(
            reverted = report.reverted.len(),
            failed = report.failed.len(),
            total = report.records.len(),
            "Period-end sweep finished"
        );
        report
    }

    async fn announce(
        &self,
        tenant_id: Uuid,
        source: EventSource,
        correlation_id: Option<&str>,
        before: &SubscriptionRecord,
        after: &SubscriptionRecord,
    ) {
        for event in changes(before, after) {
            self.publish(tenant_id, source, correlation_id, event).await;
        }
    }

    async fn publish(
        &self,
        tenant_id: Uuid,
        source: EventSource,
        correlation_id: Option<&str>,
        event: SubscriptionEvent,
    ) {
        let mut envelope = match event.to_event(source) {
            Ok(envelope) => envelope.with_tenant(tenant_id),
            Err(e) => {
                tracing::error!(tenant_id = %tenant_id, error = %e, "Failed to encode subscription event");
                return;
            }
        };
        if let Some(correlation_id) = correlation_id {
            envelope = envelope.with_correlation_id(correlation_id);
        }

        let topic = envelope.topic();
        if let Err(e) = self.bus.publish(envelope).await {
            tracing::error!(tenant_id = %tenant_id, topic = %topic, error = %e, "Failed to publish subscription event");
        }
    }
}

/// Events describing the difference between two records.
pub fn changes(before: &SubscriptionRecord, after: &SubscriptionRecord) -> Vec<SubscriptionEvent> {
    let mut events = Vec::new();

    if before.plan_type.is_paid() && !after.plan_type.is_paid() {
        events.push(SubscriptionEvent::RevertedToFree {
            previous: before.plan_type,
        });
        return events;
    }

    if before.plan_type.is_upgrade_to(after.plan_type) {
        events.push(SubscriptionEvent::Upgraded {
            from: before.plan_type,
            to: after.plan_type,
        });
    } else if before.plan_type != after.plan_type {
        tracing::warn!(from = %before.plan_type, to = %after.plan_type, "Plan moved to a lower paid tier");
    }

    if before.status != after.status {
        events.push(SubscriptionEvent::StatusChanged {
            from: before.status,
            to: after.status,
        });
    }

    match (before.cancel_at_period_end, after.cancel_at_period_end) {
        (false, true) => events.push(SubscriptionEvent::CancelScheduled {
            plan: after.plan_type,
            period_end: after.current_period_end,
        }),
        (true, false) if after.plan_type == before.plan_type && after.status.is_entitled() => {
            events.push(SubscriptionEvent::CancelReverted { plan: after.plan_type })
        }
        _ => {}
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use folio_plans::SubscriptionStatus;

    fn pro() -> SubscriptionRecord {
        let start = Utc::now();
        SubscriptionRecord::paid(PlanTier::Pro, start, start + Duration::days(30))
    }

    #[test]
    fn test_no_change_no_events() {
        assert!(changes(&pro(), &pro()).is_empty());
    }

    #[test]
    fn test_cancel_and_resume_changes() {
        let record = pro();
        let mut pending = record.clone();
        pending.cancel_at_period_end = true;

        assert_eq!(
            changes(&record, &pending),
            vec![SubscriptionEvent::CancelScheduled {
                plan: PlanTier::Pro,
                period_end: record.current_period_end
            }]
        );
        assert_eq!(
            changes(&pending, &record),
            vec![SubscriptionEvent::CancelReverted { plan: PlanTier::Pro }]
        );
    }

    #[test]
    fn test_revert_is_a_single_event() {
        let mut pending = pro();
        pending.cancel_at_period_end = true;
        assert_eq!(
            changes(&pending, &SubscriptionRecord::free()),
            vec![SubscriptionEvent::RevertedToFree { previous: PlanTier::Pro }]
        );
    }

    #[test]
    fn test_upgrade_from_past_due() {
        let past_due = pro().with_status(SubscriptionStatus::PastDue);
        let mut upgraded = past_due.clone();
        upgraded.plan_type = PlanTier::Studio;
        upgraded.status = SubscriptionStatus::Active;

        assert_eq!(
            changes(&past_due, &upgraded),
            vec![
                SubscriptionEvent::Upgraded {
                    from: PlanTier::Pro,
                    to: PlanTier::Studio
                },
                SubscriptionEvent::StatusChanged {
                    from: SubscriptionStatus::PastDue,
                    to: SubscriptionStatus::Active
                },
            ]
        );
    }

    #[test]
    fn test_payment_failure_drops_cancel_without_revert_event() {
        let mut pending = pro();
        pending.cancel_at_period_end = true;
        let mut past_due = pending.clone().with_status(SubscriptionStatus::PastDue);
        past_due.cancel_at_period_end = false;

        assert_eq!(
            changes(&pending, &past_due),
            vec![SubscriptionEvent::StatusChanged {
                from: SubscriptionStatus::Active,
                to: SubscriptionStatus::PastDue
            }]
        );
    }
}
