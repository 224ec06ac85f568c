//! Subscription statistics
//!
//! Per-tier subscriber counts and monthly recurring revenue, priced from the
//! catalog. Every record counts toward its `plan_type` whatever its status.

use serde::Serialize;

use crate::catalog::PlanCatalog;
use crate::subscription::SubscriptionRecord;
use crate::tier::PlanTier;

/// Subscriber numbers for one tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierStats {
    /// Tier
    pub tier: PlanTier,

    /// Records on this tier
    pub count: u64,

    /// Share of all records, 0 to 100
    pub percentage: f64,

    /// `count` times the monthly price, in yen
    pub monthly_revenue: u64,
}

/// Subscriber numbers across the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanStats {
    /// One entry per tier, lowest first
    pub tiers: Vec<TierStats>,

    /// Records counted
    pub total_users: u64,

    /// Sum of `monthly_revenue` over all tiers
    pub mrr: u64,
}

impl PlanStats {
    /// Entry for `tier`.
    pub fn tier(&self, tier: PlanTier) -> Option<&TierStats> {
        self.tiers.iter().find(|t| t.tier == tier)
    }

    /// Records on a paid tier.
    pub fn paid_users(&self) -> u64 {
        self.tiers
            .iter()
            .filter(|t| t.tier.is_paid())
            .map(|t| t.count)
            .sum()
    }
}

impl PlanCatalog {
    /// Count `records` per tier and price them with this catalog.
    ///
    /// With no records every percentage is 0.
    pub fn stats<'a>(&self, records: impl IntoIterator<Item = &'a SubscriptionRecord>) -> PlanStats {
        let mut tiers: Vec<TierStats> = PlanTier::ALL
            .into_iter()
            .map(|tier| TierStats {
                tier,
                count: 0,
                percentage: 0.0,
                monthly_revenue: 0,
            })
            .collect();

        let mut total_users = 0u64;
        for record in records {
            total_users += 1;
            tiers[record.plan_type.index()].count += 1;
        }

        let mut mrr = 0u64;
        for entry in &mut tiers {
            entry.monthly_revenue = entry.count * u64::from(self.info_for(entry.tier).price);
            mrr += entry.monthly_revenue;
            if total_users > 0 {
                entry.percentage = entry.count as f64 * 100.0 / total_users as f64;
            }
        }

        PlanStats {
            tiers,
            total_users,
            mrr,
        }
    }
}
