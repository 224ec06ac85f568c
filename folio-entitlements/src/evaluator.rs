//! Entitlement evaluation
//!
//! The [`EntitlementEvaluator`] turns a subscription record and live usage
//! counts into admission decisions and feature flags. Every operation is a
//! pure function of its inputs; callers that must not over-commit a quota
//! hold their own lock or transaction around check and insert.

use folio_plans::{PlanCatalog, PlanLimits, PlanTier, Quota, SubscriptionRecord};
use serde::{Deserialize, Serialize};

use crate::admission::{Admission, AdmissionState, LimitExceeded};
use crate::config::{EntitlementConfig, PastDuePolicy};
use crate::css::{validate_custom_css, CssVerdict};
use crate::error::{EntitlementError, EntitlementResult};
use crate::feature::Feature;
use crate::resource::{ResourceType, UsageSnapshot};

/// Computes quota and feature decisions for subscription records.
///
/// # Examples
///
/// ```
/// use folio_entitlements::{AdmissionState, EntitlementEvaluator, ResourceType};
/// use folio_plans::{PlanTier, SubscriptionRecord};
///
/// let evaluator = EntitlementEvaluator::default();
/// let mut record = SubscriptionRecord::free();
/// record.plan_type = PlanTier::Pro;
///
/// assert!(evaluator.can_add(&record, ResourceType::Artworks, 49));
/// assert!(!evaluator.can_add(&record, ResourceType::Artworks, 50));
/// assert_eq!(
///     evaluator.admission_state(&record, ResourceType::Artworks, 40),
///     AdmissionState::NearLimit
/// );
/// ```
#[derive(Debug, Clone)]
pub struct EntitlementEvaluator {
    catalog: PlanCatalog,
    config: EntitlementConfig,
}

impl EntitlementEvaluator {
    /// Create an evaluator over a catalog.
    pub fn new(catalog: PlanCatalog, config: EntitlementConfig) -> Self {
        Self { catalog, config }
    }

    /// Build an evaluator from configuration, loading the catalog file if one is set.
    pub fn from_config(config: EntitlementConfig) -> EntitlementResult<Self> {
        config.validate()?;

        let catalog = match &config.catalog_path {
            Some(path) => {
                let json = std::fs::read_to_string(path).map_err(|e| {
                    EntitlementError::Configuration(format!(
                        "cannot read plan catalog {}: {e}",
                        path.display()
                    ))
                })?;
                let catalog = PlanCatalog::from_json(&json)?;
                tracing::info!(path = %path.display(), "Loaded plan catalog");
                catalog
            }
            None => PlanCatalog::standard(),
        };

        Ok(Self::new(catalog, config))
    }

    /// The catalog in use.
    pub fn catalog(&self) -> &PlanCatalog {
        &self.catalog
    }

    /// The configuration in use.
    pub fn config(&self) -> &EntitlementConfig {
        &self.config
    }

    /// Tier whose limits apply to `record` under the past-due policy.
    ///
    /// With `RevertToFree`, any status that is not entitled (past due,
    /// canceled, incomplete) is evaluated as free.
    pub fn effective_tier(&self, record: &SubscriptionRecord) -> PlanTier {
        match self.config.past_due_policy {
            PastDuePolicy::RevertToFree if !record.status.is_entitled() => PlanTier::Free,
            _ => record.plan_type,
        }
    }

    /// Limits that apply to `record`.
    pub fn limits(&self, record: &SubscriptionRecord) -> &PlanLimits {
        self.catalog.limits_for(self.effective_tier(record))
    }

    /// Quota for one resource.
    pub fn limit_for(&self, record: &SubscriptionRecord, resource: ResourceType) -> Quota {
        resource.quota_in(self.limits(record))
    }

    /// Quota for a resource named by its API key.
    pub fn limit_for_key(&self, record: &SubscriptionRecord, key: &str) -> EntitlementResult<Quota> {
        let resource: ResourceType = key.parse()?;
        Ok(self.limit_for(record, resource))
    }

    /// Check if one more unit fits. Pass the count before the addition.
    #[must_use]
    pub fn can_add(&self, record: &SubscriptionRecord, resource: ResourceType, current_count: u64) -> bool {
        match self.limit_for(record, resource).finite() {
            None => true,
            Some(limit) => current_count < u64::from(limit),
        }
    }

    /// Classify usage with the configured warning threshold.
    pub fn admission_state(
        &self,
        record: &SubscriptionRecord,
        resource: ResourceType,
        current_count: u64,
    ) -> AdmissionState {
        self.admission_state_with(record, resource, current_count, self.config.warn_threshold)
    }

    /// Classify usage with an explicit warning threshold.
    pub fn admission_state_with(
        &self,
        record: &SubscriptionRecord,
        resource: ResourceType,
        current_count: u64,
        warn_threshold: f64,
    ) -> AdmissionState {
        AdmissionState::classify(self.limit_for(record, resource), current_count, warn_threshold)
    }

    /// Server-side create check.
    pub fn admit(&self, record: &SubscriptionRecord, resource: ResourceType, current_count: u64) -> Admission {
        if self.can_add(record, resource, current_count) {
            return Admission::Granted;
        }
        let denial = LimitExceeded {
            resource,
            tier: self.effective_tier(record),
            limit: self.limit_for(record, resource),
        };
        tracing::debug!(
            resource = %resource,
            tier = %denial.tier,
            count = current_count,
            "Create request denied by plan quota"
        );
        Admission::Denied(denial)
    }

    /// Check if an upload of `additional_bytes` fits in the storage quota.
    #[must_use]
    pub fn can_store(&self, record: &SubscriptionRecord, used_bytes: u64, additional_bytes: u64) -> bool {
        match self.limits(record).storage_limit_bytes() {
            None => true,
            Some(limit) => used_bytes.saturating_add(additional_bytes) <= limit,
        }
    }

    /// Check if a feature is included in the record's plan.
    #[must_use]
    pub fn is_feature_available(&self, record: &SubscriptionRecord, feature: Feature) -> bool {
        feature.is_included_in(self.effective_tier(record))
    }

    /// Feature check for a feature named by its API key.
    pub fn is_feature_available_key(&self, record: &SubscriptionRecord, key: &str) -> EntitlementResult<bool> {
        let feature: Feature = key.parse()?;
        Ok(self.is_feature_available(record, feature))
    }

    /// Maximum custom CSS lines for the record's plan (0 = none).
    pub fn custom_css_line_limit(&self, record: &SubscriptionRecord) -> u32 {
        self.limits(record).custom_css_max_lines
    }

    /// Screen a custom CSS submission for the record's plan.
    pub fn check_custom_css(&self, record: &SubscriptionRecord, css: &str) -> CssVerdict {
        if !self.is_feature_available(record, Feature::CustomCss) {
            return CssVerdict::FeatureUnavailable;
        }
        validate_custom_css(css, self.custom_css_line_limit(record))
    }

    /// Full entitlement picture for the dashboard.
    pub fn evaluate(&self, record: &SubscriptionRecord, usage: &UsageSnapshot) -> EntitlementReport {
        let tier = self.effective_tier(record);
        let limits = self.limits(record);

        let resources = ResourceType::ALL
            .into_iter()
            .map(|resource| {
                let used = usage.usage_of(resource);
                let limit = resource.quota_in(limits);
                ResourceEntitlement {
                    resource,
                    limit,
                    used,
                    remaining: limit.remaining(used),
                    state: AdmissionState::classify(limit, used, self.config.warn_threshold),
                    can_add: self.can_add(record, resource, used),
                }
            })
            .collect();

        let features = Feature::ALL
            .into_iter()
            .filter(|feature| feature.is_included_in(tier))
            .collect();

        EntitlementReport {
            plan_type: record.plan_type,
            effective_tier: tier,
            has_ads: limits.has_ads,
            custom_css_max_lines: limits.custom_css_max_lines,
            resources,
            features,
        }
    }
}

impl Default for EntitlementEvaluator {
    fn default() -> Self {
        Self::new(PlanCatalog::standard(), EntitlementConfig::default())
    }
}

/// Decision for one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceEntitlement {
    /// Resource
    pub resource: ResourceType,
    /// Quota
    pub limit: Quota,
    /// Current usage
    pub used: u64,
    /// Units left, `None` when unlimited
    pub remaining: Option<u64>,
    /// Admission state
    pub state: AdmissionState,
    /// Whether one more unit fits
    pub can_add: bool,
}

/// Entitlements of one tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementReport {
    /// Plan on the record
    pub plan_type: PlanTier,
    /// Plan whose limits were applied
    pub effective_tier: PlanTier,
    /// Whether ads are shown
    pub has_ads: bool,
    /// Custom CSS line cap
    pub custom_css_max_lines: u32,
    /// Per-resource decisions, in [`ResourceType::ALL`] order
    pub resources: Vec<ResourceEntitlement>,
    /// Features included in the plan
    pub features: Vec<Feature>,
}

impl EntitlementReport {
    /// Decision for one resource.
    pub fn resource(&self, resource: ResourceType) -> Option<&ResourceEntitlement> {
        self.resources.iter().find(|entry| entry.resource == resource)
    }

    /// Check if the report includes a feature.
    pub fn has_feature(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EntitlementConfig;
    use folio_plans::SubscriptionStatus;

    fn record(tier: PlanTier) -> SubscriptionRecord {
        let mut record = SubscriptionRecord::free();
        record.plan_type = tier;
        record
    }

    #[test]
    fn test_pro_artwork_scenario() {
        let evaluator = EntitlementEvaluator::default();
        let pro = record(PlanTier::Pro);

        assert_eq!(evaluator.limit_for(&pro, ResourceType::Artworks), Quota::of(50));
        assert_eq!(evaluator.admission_state(&pro, ResourceType::Artworks, 39), AdmissionState::Ok);
        assert_eq!(
            evaluator.admission_state(&pro, ResourceType::Artworks, 40),
            AdmissionState::NearLimit
        );
        assert_eq!(
            evaluator.admission_state(&pro, ResourceType::Artworks, 50),
            AdmissionState::AtLimit
        );
        assert!(evaluator.can_add(&pro, ResourceType::Artworks, 49));
        assert!(!evaluator.can_add(&pro, ResourceType::Artworks, 50));
    }

    #[test]
    fn test_studio_unlimited_links() {
        let evaluator = EntitlementEvaluator::default();
        let studio = record(PlanTier::Studio);

        let limit = evaluator.limit_for(&studio, ResourceType::SocialLinks);
        assert!(folio_plans::is_unlimited(limit.raw()));
        assert_eq!(
            evaluator.admission_state(&studio, ResourceType::SocialLinks, 10_000),
            AdmissionState::Unlimited
        );
        assert!(evaluator.can_add(&studio, ResourceType::SocialLinks, 1_000_000_000));
    }

    #[test]
    fn test_explicit_threshold() {
        let evaluator = EntitlementEvaluator::default();
        let starter = record(PlanTier::Starter);
        assert_eq!(
            evaluator.admission_state_with(&starter, ResourceType::Artworks, 10, 0.5),
            AdmissionState::NearLimit
        );
        assert_eq!(
            evaluator.admission_state_with(&starter, ResourceType::Artworks, 9, 0.5),
            AdmissionState::Ok
        );
    }

    #[test]
    fn test_limit_for_key() {
        let evaluator = EntitlementEvaluator::default();
        let free = record(PlanTier::Free);
        assert_eq!(evaluator.limit_for_key(&free, "posts").unwrap(), Quota::of(1));
        assert!(matches!(
            evaluator.limit_for_key(&free, "videos"),
            Err(EntitlementError::UnknownResourceType(_))
        ));
    }

    #[test]
    fn test_features() {
        let evaluator = EntitlementEvaluator::default();
        assert!(!evaluator.is_feature_available(&record(PlanTier::Starter), Feature::Tags));
        assert!(evaluator.is_feature_available(&record(PlanTier::Pro), Feature::Markdown));
        assert!(evaluator
            .is_feature_available_key(&record(PlanTier::Studio), "customCss")
            .unwrap());
        assert!(matches!(
            evaluator.is_feature_available_key(&record(PlanTier::Studio), "themes"),
            Err(EntitlementError::UnknownFeature(_))
        ));
    }

    #[test]
    fn test_admit() {
        let evaluator = EntitlementEvaluator::default();
        let free = record(PlanTier::Free);

        assert!(evaluator.admit(&free, ResourceType::Posts, 0).is_granted());
        match evaluator.admit(&free, ResourceType::Posts, 1) {
            Admission::Denied(denial) => {
                assert_eq!(denial.tier, PlanTier::Free);
                assert_eq!(denial.limit, Quota::of(1));
            }
            Admission::Granted => panic!("second post should be denied on free"),
        }
    }

    #[test]
    fn test_storage() {
        let evaluator = EntitlementEvaluator::default();
        let free = record(PlanTier::Free);
        let mb = 1024 * 1024;

        assert!(evaluator.can_store(&free, 299 * mb, mb));
        assert!(!evaluator.can_store(&free, 299 * mb, mb + 1));
        assert!(evaluator.can_store(&record(PlanTier::Studio), 9 * 1024 * mb, 512 * mb));
    }

    #[test]
    fn test_custom_css() {
        let evaluator = EntitlementEvaluator::default();
        assert_eq!(evaluator.custom_css_line_limit(&record(PlanTier::Free)), 0);
        assert_eq!(evaluator.custom_css_line_limit(&record(PlanTier::Pro)), 100);
        assert_eq!(evaluator.custom_css_line_limit(&record(PlanTier::Studio)), 500);

        let css = "h1 { color: teal; }\n".repeat(200);
        assert_eq!(
            evaluator.check_custom_css(&record(PlanTier::Starter), "h1 {}"),
            CssVerdict::FeatureUnavailable
        );
        assert_eq!(
            evaluator.check_custom_css(&record(PlanTier::Pro), &css),
            CssVerdict::TooManyLines { max: 100, actual: 200 }
        );
        assert!(evaluator.check_custom_css(&record(PlanTier::Studio), &css).is_accepted());
    }

    #[test]
    fn test_past_due_policy() {
        let pro_past_due = record(PlanTier::Pro).with_status(SubscriptionStatus::PastDue);

        let retain = EntitlementEvaluator::default();
        assert_eq!(retain.effective_tier(&pro_past_due), PlanTier::Pro);
        assert!(retain.is_feature_available(&pro_past_due, Feature::Categories));

        let strict = EntitlementEvaluator::new(
            PlanCatalog::standard(),
            EntitlementConfig::default().with_past_due_policy(PastDuePolicy::RevertToFree),
        );
        assert_eq!(strict.effective_tier(&pro_past_due), PlanTier::Free);
        assert!(!strict.is_feature_available(&pro_past_due, Feature::Categories));
        assert_eq!(strict.limit_for(&pro_past_due, ResourceType::Artworks), Quota::of(5));
    }

    #[test]
    fn test_revert_to_free_covers_every_unentitled_status() {
        let retain = EntitlementEvaluator::default();
        let strict = EntitlementEvaluator::new(
            PlanCatalog::standard(),
            EntitlementConfig::default().with_past_due_policy(PastDuePolicy::RevertToFree),
        );

        for status in [SubscriptionStatus::Canceled, SubscriptionStatus::Incomplete] {
            let pro = record(PlanTier::Pro).with_status(status);
            assert_eq!(retain.effective_tier(&pro), PlanTier::Pro);
            assert_eq!(strict.effective_tier(&pro), PlanTier::Free);
            assert!(!strict.is_feature_available(&pro, Feature::Categories));
        }

        let trialing = record(PlanTier::Studio).with_status(SubscriptionStatus::Trialing);
        assert_eq!(strict.effective_tier(&trialing), PlanTier::Studio);
        assert_eq!(strict.effective_tier(&record(PlanTier::Pro)), PlanTier::Pro);
    }

    #[test]
    fn test_report() {
        let evaluator = EntitlementEvaluator::default();
        let usage = UsageSnapshot {
            artwork_count: 45,
            social_link_count: 3,
            post_count: 20,
            category_count: 0,
            storage_used_mb: 100,
        };
        let report = evaluator.evaluate(&record(PlanTier::Pro), &usage);

        assert!(!report.has_ads);
        assert_eq!(report.custom_css_max_lines, 100);
        assert_eq!(report.features, Feature::ALL.to_vec());

        let artworks = report.resource(ResourceType::Artworks).unwrap();
        assert_eq!(artworks.state, AdmissionState::NearLimit);
        assert_eq!(artworks.remaining, Some(5));
        assert!(artworks.can_add);

        let posts = report.resource(ResourceType::Posts).unwrap();
        assert_eq!(posts.state, AdmissionState::AtLimit);
        assert!(!posts.can_add);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["planType"], "PRO");
        assert_eq!(json["resources"][1]["state"], "OK");
    }

    #[test]
    fn test_from_config_rejects_bad_threshold() {
        let config = EntitlementConfig::default().with_warn_threshold(2.0);
        assert!(matches!(
            EntitlementEvaluator::from_config(config),
            Err(EntitlementError::Config(_))
        ));
    }

    #[test]
    fn test_from_config_missing_catalog_file() {
        let mut config = EntitlementConfig::default();
        config.catalog_path = Some("/nonexistent/folio-plans.json".into());
        let err = EntitlementEvaluator::from_config(config).unwrap_err();
        assert!(matches!(err, EntitlementError::Configuration(_)));
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }
}
