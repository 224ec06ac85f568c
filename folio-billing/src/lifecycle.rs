//! Subscription lifecycle transitions
//!
//! Pure functions from a record (and an input) to a new record. Nothing here
//! touches storage or the payment provider; the caller persists the result
//! and talks to the provider.
//!
//! ```text
//!              request_cancel                 period end
//! PaidActive ─────────────────→ CancelPending ───────────→ Free
//!      ↑                              │
//!      └──────── request_resume ──────┘
//! ```

use chrono::{DateTime, Utc};
use folio_plans::{PlanTier, SubscriptionMode, SubscriptionRecord, SubscriptionStatus};

use crate::error::{LifecycleError, LifecycleResult};

/// Schedule the subscription to end with the current period.
///
/// Only an active paid plan with nothing pending can be canceled.
///
/// # Examples
///
/// ```
/// use folio_billing::{request_cancel, LifecycleError};
/// use folio_plans::SubscriptionRecord;
///
/// let err = request_cancel(&SubscriptionRecord::free()).unwrap_err();
/// assert!(matches!(err, LifecycleError::NotCancelable { .. }));
/// ```
pub fn request_cancel(record: &SubscriptionRecord) -> LifecycleResult<SubscriptionRecord> {
    record.validate()?;

    let mode = record.mode();
    if mode != SubscriptionMode::PaidActive {
        return Err(LifecycleError::NotCancelable { mode });
    }

    let mut next = record.clone();
    next.cancel_at_period_end = true;
    tracing::info!(plan = %record.plan_type, period_end = ?record.current_period_end, "Cancellation scheduled");
    Ok(next)
}

/// Withdraw a scheduled cancellation.
pub fn request_resume(record: &SubscriptionRecord) -> LifecycleResult<SubscriptionRecord> {
    record.validate()?;

    if !record.cancel_at_period_end {
        return Err(LifecycleError::NotResumable);
    }

    let mut next = record.clone();
    next.cancel_at_period_end = false;
    tracing::info!(plan = %record.plan_type, "Scheduled cancellation withdrawn");
    Ok(next)
}

/// Revert a canceled subscription to free once its period has ended.
///
/// Returns the record unchanged when nothing is due, so running it twice is
/// the same as running it once. A pending cancellation without a known
/// period end is never due here; the provider's deletion event reverts it.
pub fn apply_period_end_reconciliation(
    record: &SubscriptionRecord,
    now: DateTime<Utc>,
) -> LifecycleResult<SubscriptionRecord> {
    record.validate()?;

    if !record.cancel_at_period_end {
        return Ok(record.clone());
    }
    let Some(end) = record.current_period_end else {
        tracing::warn!(plan = %record.plan_type, "Pending cancellation has no period end, leaving it to the provider");
        return Ok(record.clone());
    };
    if now < end {
        tracing::debug!(plan = %record.plan_type, period_end = %end, "Cancellation not yet due");
        return Ok(record.clone());
    }

    tracing::info!(previous = %record.plan_type, "Period ended, reverting to free");
    Ok(SubscriptionRecord::free())
}

/// Move the subscription to a higher tier.
///
/// The result is active with no pending cancellation.
pub fn set_plan(record: &SubscriptionRecord, tier: PlanTier) -> LifecycleResult<SubscriptionRecord> {
    record.validate()?;

    if tier == record.plan_type {
        return Err(LifecycleError::AlreadyOnPlan(tier));
    }
    if !record.plan_type.is_upgrade_to(tier) {
        return Err(LifecycleError::DowngradeNotAllowed {
            from: record.plan_type,
            to: tier,
        });
    }

    let mut next = record.clone();
    next.plan_type = tier;
    next.status = SubscriptionStatus::Active;
    next.cancel_at_period_end = false;
    tracing::info!(from = %record.plan_type, to = %tier, "Plan upgraded");
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webhook::{apply_billing_event, BillingEvent};
    use chrono::Duration;

    fn paid(tier: PlanTier) -> SubscriptionRecord {
        let start = Utc::now() - Duration::days(10);
        SubscriptionRecord::paid(tier, start, start + Duration::days(30))
    }

    #[test]
    fn test_cancel_then_resume_restores_record() {
        let record = paid(PlanTier::Pro);
        let canceled = request_cancel(&record).unwrap();
        assert!(canceled.cancel_at_period_end);
        assert_eq!(canceled.mode(), SubscriptionMode::PaidCancelPending);

        assert_eq!(request_resume(&canceled).unwrap(), record);
    }

    #[test]
    fn test_cancel_refusals() {
        assert_eq!(
            request_cancel(&SubscriptionRecord::free()),
            Err(LifecycleError::NotCancelable { mode: SubscriptionMode::Free })
        );

        let pending = request_cancel(&paid(PlanTier::Starter)).unwrap();
        assert_eq!(
            request_cancel(&pending),
            Err(LifecycleError::NotCancelable {
                mode: SubscriptionMode::PaidCancelPending
            })
        );

        let past_due = paid(PlanTier::Pro).with_status(SubscriptionStatus::PastDue);
        assert!(matches!(
            request_cancel(&past_due),
            Err(LifecycleError::NotCancelable { .. })
        ));
    }

    #[test]
    fn test_trialing_can_cancel() {
        let trial = paid(PlanTier::Studio).with_status(SubscriptionStatus::Trialing);
        assert!(request_cancel(&trial).is_ok());
    }

    #[test]
    fn test_resume_without_pending_cancel() {
        assert_eq!(request_resume(&paid(PlanTier::Pro)), Err(LifecycleError::NotResumable));
        assert_eq!(request_resume(&SubscriptionRecord::free()), Err(LifecycleError::NotResumable));
    }

    #[test]
    fn test_reconciliation_before_and_after_period_end() {
        let canceled = request_cancel(&paid(PlanTier::Pro)).unwrap();
        let end = canceled.current_period_end.unwrap();

        let early = apply_period_end_reconciliation(&canceled, end - Duration::seconds(1)).unwrap();
        assert_eq!(early, canceled);

        let reverted = apply_period_end_reconciliation(&canceled, end).unwrap();
        assert_eq!(reverted, SubscriptionRecord::free());

        let again = apply_period_end_reconciliation(&reverted, end + Duration::days(1)).unwrap();
        assert_eq!(again, reverted);
    }

    #[test]
    fn test_reconciliation_ignores_active_records() {
        let record = paid(PlanTier::Pro);
        let far_future = Utc::now() + Duration::days(365);
        assert_eq!(apply_period_end_reconciliation(&record, far_future).unwrap(), record);
    }

    #[test]
    fn test_reconciliation_without_period_end_keeps_plan() {
        let checkout = apply_billing_event(
            &SubscriptionRecord::free(),
            &BillingEvent::CheckoutCompleted { plan: PlanTier::Pro },
        )
        .unwrap();
        assert!(checkout.current_period_end.is_none());

        let pending = request_cancel(&checkout).unwrap();
        let swept = apply_period_end_reconciliation(&pending, Utc::now() + Duration::days(400)).unwrap();
        assert_eq!(swept, pending);
        assert_eq!(swept.plan_type, PlanTier::Pro);

        let deleted = apply_billing_event(&swept, &BillingEvent::SubscriptionDeleted).unwrap();
        assert_eq!(deleted.plan_type, PlanTier::Free);
    }

    #[test]
    fn test_upgrade() {
        let pending = request_cancel(&paid(PlanTier::Starter)).unwrap();
        let upgraded = set_plan(&pending, PlanTier::Studio).unwrap();
        assert_eq!(upgraded.plan_type, PlanTier::Studio);
        assert_eq!(upgraded.status, SubscriptionStatus::Active);
        assert!(!upgraded.cancel_at_period_end);
        assert_eq!(upgraded.current_period_end, pending.current_period_end);
    }

    #[test]
    fn test_upgrade_clears_past_due() {
        let past_due = paid(PlanTier::Starter).with_status(SubscriptionStatus::PastDue);
        let upgraded = set_plan(&past_due, PlanTier::Pro).unwrap();
        assert_eq!(upgraded.status, SubscriptionStatus::Active);
    }

    #[test]
    fn test_downgrade_and_same_plan_refused() {
        assert_eq!(
            set_plan(&paid(PlanTier::Studio), PlanTier::Pro),
            Err(LifecycleError::DowngradeNotAllowed {
                from: PlanTier::Studio,
                to: PlanTier::Pro
            })
        );
        assert_eq!(
            set_plan(&paid(PlanTier::Pro), PlanTier::Pro),
            Err(LifecycleError::AlreadyOnPlan(PlanTier::Pro))
        );
        assert!(matches!(
            set_plan(&paid(PlanTier::Pro), PlanTier::Free),
            Err(LifecycleError::DowngradeNotAllowed { .. })
        ));
    }

    #[test]
    fn test_invalid_records_rejected() {
        let mut broken = paid(PlanTier::Pro).with_status(SubscriptionStatus::Canceled);
        broken.cancel_at_period_end = true;

        assert!(matches!(request_cancel(&broken), Err(LifecycleError::InvalidRecord(_))));
        assert!(matches!(request_resume(&broken), Err(LifecycleError::InvalidRecord(_))));
        assert!(matches!(
            apply_period_end_reconciliation(&broken, Utc::now()),
            Err(LifecycleError::InvalidRecord(_))
        ));
        assert!(matches!(
            set_plan(&broken, PlanTier::Studio),
            Err(LifecycleError::InvalidRecord(_))
        ));
    }
}
