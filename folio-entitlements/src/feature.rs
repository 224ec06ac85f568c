//! Binary plan features
//!
//! Features are on or off per tier. They are kept apart from quotas: a feature
//! is granted by a flat allow-list of tiers, not by a numeric limit.

use folio_plans::PlanTier;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EntitlementError;

/// Feature gated by plan tier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Feature {
    /// Grouping artworks into categories
    Categories,
    /// Tagging artworks
    Tags,
    /// Markdown in posts and descriptions
    Markdown,
    /// Custom CSS on the public page
    CustomCss,
}

impl Feature {
    /// Every gated feature.
    pub const ALL: [Feature; 4] = [
        Feature::Categories,
        Feature::Tags,
        Feature::Markdown,
        Feature::CustomCss,
    ];

    /// Tiers that include this feature.
    pub fn allowed_tiers(&self) -> &'static [PlanTier] {
        match self {
            Feature::Categories | Feature::Tags => &[PlanTier::Pro, PlanTier::Studio],
            Feature::Markdown => &[PlanTier::Pro, PlanTier::Studio],
            Feature::CustomCss => &[PlanTier::Pro, PlanTier::Studio],
        }
    }

    /// Check if `tier` includes this feature.
    pub fn is_included_in(&self, tier: PlanTier) -> bool {
        self.allowed_tiers().contains(&tier)
    }

    /// Get the key used by the API and UI.
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Categories => "categories",
            Feature::Tags => "tags",
            Feature::Markdown => "markdown",
            Feature::CustomCss => "customCss",
        }
    }

    /// Parse a feature key. Accepts camelCase and snake_case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('_', "").as_str() {
            "categories" => Some(Feature::Categories),
            "tags" => Some(Feature::Tags),
            "markdown" => Some(Feature::Markdown),
            "customcss" => Some(Feature::CustomCss),
            _ => None,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = EntitlementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::parse(s).ok_or_else(|| EntitlementError::UnknownFeature(s.to_string()))
    }
}
