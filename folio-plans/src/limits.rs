//! Per-tier usage limits
//!
//! This module defines the quotas and feature flags attached to every plan
//! tier. Field names serialize in camelCase to match the subscription API.

use serde::{Deserialize, Serialize};

use crate::quota::Quota;
use crate::tier::PlanTier;

/// Usage limits and flags for a plan tier.
///
/// Quotas equal to [`Quota::UNLIMITED`] mean no limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanLimits {
    /// Maximum number of artworks
    pub max_artworks: Quota,

    /// Maximum number of social links
    pub max_social_links: Quota,

    /// Maximum number of posts
    pub max_posts: Quota,

    /// Maximum number of categories
    pub max_categories: Quota,

    /// Storage limit in MB
    pub max_storage_mb: Quota,

    /// Whether ads are shown on the public page
    pub has_ads: bool,

    /// Maximum lines of custom CSS (0 = no custom CSS)
    #[serde(default)]
    pub custom_css_max_lines: u32,
}

impl PlanLimits {
    /// Built-in limits for a tier.
    pub const fn builtin(tier: PlanTier) -> Self {
        match tier {
            PlanTier::Free => PlanLimits {
                max_artworks: Quota::of(5),
                max_social_links: Quota::of(2),
                max_posts: Quota::of(1),
                max_categories: Quota::NONE,
                max_storage_mb: Quota::of(300),
                has_ads: true,
                custom_css_max_lines: 0,
            },
            PlanTier::Starter => PlanLimits {
                max_artworks: Quota::of(20),
                max_social_links: Quota::of(5),
                max_posts: Quota::of(5),
                max_categories: Quota::NONE,
                max_storage_mb: Quota::of(1024),
                has_ads: false,
                custom_css_max_lines: 0,
            },
            PlanTier::Pro => PlanLimits {
                max_artworks: Quota::of(50),
                max_social_links: Quota::of(10),
                max_posts: Quota::of(20),
                max_categories: Quota::of(5),
                max_storage_mb: Quota::of(2048),
                has_ads: false,
                custom_css_max_lines: 100,
            },
            PlanTier::Studio => PlanLimits {
                max_artworks: Quota::of(200),
                max_social_links: Quota::UNLIMITED,
                max_posts: Quota::UNLIMITED,
                max_categories: Quota::UNLIMITED,
                max_storage_mb: Quota::of(10240),
                has_ads: false,
                custom_css_max_lines: 500,
            },
        }
    }

    /// Every quota paired with its wire field name.
    pub fn quotas(&self) -> [(&'static str, Quota); 5] {
        [
            ("maxArtworks", self.max_artworks),
            ("maxSocialLinks", self.max_social_links),
            ("maxPosts", self.max_posts),
            ("maxCategories", self.max_categories),
            ("maxStorageMb", self.max_storage_mb),
        ]
    }

    /// Storage limit in bytes, or `None` when unlimited.
    pub fn storage_limit_bytes(&self) -> Option<u64> {
        self.max_storage_mb
            .finite()
            .map(|mb| u64::from(mb) * 1024 * 1024)
    }

    /// First field where `self` grants less than `lower`, if any.
    pub fn shortfall_against(&self, lower: &PlanLimits) -> Option<&'static str> {
        for ((name, mine), (_, theirs)) in self.quotas().into_iter().zip(lower.quotas()) {
            if mine < theirs {
                return Some(name);
            }
        }
        if self.custom_css_max_lines < lower.custom_css_max_lines {
            return Some("customCssMaxLines");
        }
        None
    }
}
