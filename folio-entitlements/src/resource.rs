//! # Resource Types
//!
//! Resources whose amount is capped by a plan, and the usage snapshot the
//! caller gathers from the stores that own them.

use folio_plans::{PlanLimits, Quota};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EntitlementError;

/// Resource capped by a plan quota.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ResourceType {
    /// Uploaded artworks
    Artworks,
    /// Links to social profiles
    SocialLinks,
    /// News posts
    Posts,
    /// Artwork categories
    Categories,
    /// Image storage, in MB
    StorageMb,
}

impl ResourceType {
    /// Every resource type.
    pub const ALL: [ResourceType; 5] = [
        ResourceType::Artworks,
        ResourceType::SocialLinks,
        ResourceType::Posts,
        ResourceType::Categories,
        ResourceType::StorageMb,
    ];

    /// Get the key used by the API and UI.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Artworks => "artworks",
            ResourceType::SocialLinks => "socialLinks",
            ResourceType::Posts => "posts",
            ResourceType::Categories => "categories",
            ResourceType::StorageMb => "storageMb",
        }
    }

    /// Parse a resource key. Accepts camelCase and snake_case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('_', "").as_str() {
            "artworks" => Some(ResourceType::Artworks),
            "sociallinks" => Some(ResourceType::SocialLinks),
            "posts" => Some(ResourceType::Posts),
            "categories" => Some(ResourceType::Categories),
            "storagemb" => Some(ResourceType::StorageMb),
            _ => None,
        }
    }

    /// Human-readable name for messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            ResourceType::Artworks => "artworks",
            ResourceType::SocialLinks => "social links",
            ResourceType::Posts => "posts",
            ResourceType::Categories => "categories",
            ResourceType::StorageMb => "storage (MB)",
        }
    }

    /// Select this resource's quota from a plan's limits.
    pub fn quota_in(&self, limits: &PlanLimits) -> Quota {
        match self {
            ResourceType::Artworks => limits.max_artworks,
            ResourceType::SocialLinks => limits.max_social_links,
            ResourceType::Posts => limits.max_posts,
            ResourceType::Categories => limits.max_categories,
            ResourceType::StorageMb => limits.max_storage_mb,
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = EntitlementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceType::parse(s).ok_or_else(|| EntitlementError::UnknownResourceType(s.to_string()))
    }
}

/// Current usage of every capped resource for one tenant.
///
/// Computed per request from the owning stores; never persisted here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSnapshot {
    /// Number of artworks
    pub artwork_count: u64,
    /// Number of social links
    pub social_link_count: u64,
    /// Number of posts
    pub post_count: u64,
    /// Number of categories
    pub category_count: u64,
    /// Storage used, in MB
    pub storage_used_mb: u64,
}

impl UsageSnapshot {
    /// Usage of a single resource.
    pub fn usage_of(&self, resource: ResourceType) -> u64 {
        match resource {
            ResourceType::Artworks => self.artwork_count,
            ResourceType::SocialLinks => self.social_link_count,
            ResourceType::Posts => self.post_count,
            ResourceType::Categories => self.category_count,
            ResourceType::StorageMb => self.storage_used_mb,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_plans::PlanTier;

    #[test]
    fn test_resource_parsing() {
        assert_eq!(ResourceType::parse("artworks"), Some(ResourceType::Artworks));
        assert_eq!(ResourceType::parse("socialLinks"), Some(ResourceType::SocialLinks));
        assert_eq!(ResourceType::parse("social_links"), Some(ResourceType::SocialLinks));
        assert_eq!(ResourceType::parse("storageMb"), Some(ResourceType::StorageMb));
        assert_eq!(ResourceType::parse("tags"), None);

        let err = "followers".parse::<ResourceType>().unwrap_err();
        assert!(matches!(err, EntitlementError::UnknownResourceType(ref key) if key == "followers"));
        assert_eq!(err.error_code(), "UNKNOWN_RESOURCE_TYPE");
    }

    #[test]
    fn test_keys_round_trip() {
        for resource in ResourceType::ALL {
            assert_eq!(ResourceType::parse(resource.as_str()), Some(resource));
            let json = serde_json::to_string(&resource).unwrap();
            assert_eq!(json, format!("\"{}\"", resource.as_str()));
        }
    }

    #[test]
    fn test_quota_selection() {
        let limits = PlanTier::Pro.limits();
        assert_eq!(ResourceType::Artworks.quota_in(&limits), Quota::of(50));
        assert_eq!(ResourceType::SocialLinks.quota_in(&limits), Quota::of(10));
        assert_eq!(ResourceType::Posts.quota_in(&limits), Quota::of(20));
        assert_eq!(ResourceType::Categories.quota_in(&limits), Quota::of(5));
        assert_eq!(ResourceType::StorageMb.quota_in(&limits), Quota::of(2048));
    }

    #[test]
    fn test_usage_of() {
        let usage = UsageSnapshot {
            artwork_count: 3,
            social_link_count: 1,
            post_count: 7,
            category_count: 2,
            storage_used_mb: 120,
        };
        assert_eq!(usage.usage_of(ResourceType::Posts), 7);
        assert_eq!(usage.usage_of(ResourceType::StorageMb), 120);
    }
}
