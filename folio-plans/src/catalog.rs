//! Plan catalog
//!
//! The catalog pairs every tier with its limits and the metadata shown on the
//! pricing page. The built-in catalog is always complete; a catalog loaded from
//! JSON is validated once at startup so lookups never fail afterwards.

use serde::{Deserialize, Serialize};

use crate::error::{PlanError, PlanResult};
use crate::limits::PlanLimits;
use crate::tier::PlanTier;

/// Pricing-page metadata for a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanInfo {
    /// Display name
    pub name: String,

    /// Monthly price in yen
    pub price: u32,

    /// Formatted price label
    pub price_label: String,

    /// Who the plan is for
    pub description: String,

    /// Feature bullet list
    #[serde(default)]
    pub features: Vec<String>,

    /// Highlighted on the pricing page
    #[serde(default)]
    pub recommended: bool,
}

impl PlanInfo {
    /// Built-in metadata for a tier.
    pub fn builtin(tier: PlanTier) -> Self {
        let (price, price_label, description, features, recommended): (u32, &str, &str, Vec<&str>, bool) =
            match tier {
                PlanTier::Free => (
                    0,
                    "Free",
                    "For trying things out",
                    vec![
                        "Up to 5 artworks",
                        "Up to 2 social links",
                        "1 post",
                        "300MB storage",
                        "Ads shown",
                    ],
                    false,
                ),
                PlanTier::Starter => (
                    480,
                    "¥480/mo",
                    "For individual creators",
                    vec![
                        "Up to 20 artworks",
                        "Up to 5 social links",
                        "Up to 5 posts",
                        "1GB storage",
                        "No ads",
                    ],
                    false,
                ),
                PlanTier::Pro => (
                    680,
                    "¥680/mo",
                    "For active creators",
                    vec![
                        "Up to 50 artworks",
                        "Up to 10 social links",
                        "Up to 20 posts",
                        "Up to 5 categories",
                        "2GB storage",
                        "No ads",
                    ],
                    true,
                ),
                PlanTier::Studio => (
                    1980,
                    "¥1,980/mo",
                    "For professionals",
                    vec![
                        "Up to 200 artworks",
                        "Unlimited social links",
                        "Unlimited posts",
                        "Unlimited categories",
                        "10GB storage",
                        "No ads",
                        "Priority support",
                    ],
                    false,
                ),
            };

        Self {
            name: tier.display_name().to_string(),
            price,
            price_label: price_label.to_string(),
            description: description.to_string(),
            features: features.into_iter().map(String::from).collect(),
            recommended,
        }
    }
}

/// One catalog row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanEntry {
    /// Tier this entry describes
    pub tier: PlanTier,

    /// Usage limits
    pub limits: PlanLimits,

    /// Pricing-page metadata
    pub info: PlanInfo,
}

/// Complete mapping from every tier to its limits and metadata.
///
/// # Examples
///
/// ```
/// use folio_plans::{PlanCatalog, PlanTier};
///
/// let catalog = PlanCatalog::standard();
/// assert_eq!(catalog.limits_for(PlanTier::Pro).custom_css_max_lines, 100);
/// assert_eq!(catalog.recommended(), Some(PlanTier::Pro));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanCatalog {
    entries: [PlanEntry; 4],
}

impl PlanCatalog {
    /// The built-in catalog.
    pub fn standard() -> Self {
        Self {
            entries: PlanTier::ALL.map(|tier| PlanEntry {
                tier,
                limits: PlanLimits::builtin(tier),
                info: PlanInfo::builtin(tier),
            }),
        }
    }

    /// Build a catalog from explicit entries.
    ///
    /// Fails when a tier is missing or duplicated, or when a higher tier grants
    /// less than a lower one.
    pub fn from_entries(entries: impl IntoIterator<Item = PlanEntry>) -> PlanResult<Self> {
        let mut slots: [Option<PlanEntry>; 4] = [None, None, None, None];

        for entry in entries {
            let slot = &mut slots[entry.tier.index()];
            if slot.is_some() {
                return Err(PlanError::DuplicateTier(entry.tier));
            }
            *slot = Some(entry);
        }

        let mut filled = Vec::with_capacity(4);
        for (tier, slot) in PlanTier::ALL.into_iter().zip(slots) {
            filled.push(slot.ok_or(PlanError::MissingTier(tier))?);
        }

        for pair in filled.windows(2) {
            if let Some(resource) = pair[1].limits.shortfall_against(&pair[0].limits) {
                return Err(PlanError::NonMonotonic {
                    resource,
                    lower: pair[0].tier,
                    higher: pair[1].tier,
                });
            }
        }

        let entries: [PlanEntry; 4] = filled
            .try_into()
            .map_err(|_| PlanError::MalformedCatalog("expected four tiers".to_string()))?;
        Ok(Self { entries })
    }

    /// Parse and validate a catalog from a JSON array of entries.
    pub fn from_json(json: &str) -> PlanResult<Self> {
        let entries: Vec<PlanEntry> = serde_json::from_str(json)?;
        Self::from_entries(entries)
    }

    /// Limits for a tier.
    pub fn limits_for(&self, tier: PlanTier) -> &PlanLimits {
        &self.entries[tier.index()].limits
    }

    /// Pricing-page metadata for a tier.
    pub fn info_for(&self, tier: PlanTier) -> &PlanInfo {
        &self.entries[tier.index()].info
    }

    /// Iterate entries in ascending tier order.
    pub fn plans(&self) -> impl Iterator<Item = &PlanEntry> {
        self.entries.iter()
    }

    /// The tier flagged as recommended, if any.
    pub fn recommended(&self) -> Option<PlanTier> {
        self.entries
            .iter()
            .find(|entry| entry.info.recommended)
            .map(|entry| entry.tier)
    }
}

impl Default for PlanCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
