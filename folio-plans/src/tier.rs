//! Subscription plan tiers
//!
//! This module defines the four plan tiers a Folio creator can subscribe to
//! and their total ordering, which drives upgrade and downgrade decisions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PlanError;
use crate::limits::PlanLimits;

/// Subscription plan tier for a creator account.
///
/// Tiers are totally ordered: `Free < Starter < Pro < Studio`. A move to a
/// greater tier is an upgrade.
///
/// # Examples
///
/// ```
/// use folio_plans::PlanTier;
///
/// let tier = PlanTier::Pro;
/// assert!(tier > PlanTier::Starter);
/// assert_eq!(tier.limits().max_artworks.finite(), Some(50));
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanTier {
    /// Free tier with ads and small quotas
    Free,

    /// Entry paid tier for individual creators
    Starter,

    /// Paid tier with categories, tags, markdown and custom CSS
    Pro,

    /// Top tier with unlimited links, posts and categories
    Studio,
}

impl PlanTier {
    /// Every tier, in ascending order.
    pub const ALL: [PlanTier; 4] = [
        PlanTier::Free,
        PlanTier::Starter,
        PlanTier::Pro,
        PlanTier::Studio,
    ];

    /// Get the built-in limits for this tier.
    ///
    /// # Examples
    ///
    /// ```
    /// use folio_plans::PlanTier;
    ///
    /// let limits = PlanTier::Free.limits();
    /// assert_eq!(limits.max_posts.finite(), Some(1));
    /// assert!(limits.has_ads);
    /// ```
    pub const fn limits(&self) -> PlanLimits {
        PlanLimits::builtin(*self)
    }

    /// Parse a tier from its string representation (case-insensitive).
    ///
    /// # Returns
    ///
    /// `Some(PlanTier)` if valid, `None` otherwise
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "free" => Some(PlanTier::Free),
            "starter" => Some(PlanTier::Starter),
            "pro" => Some(PlanTier::Pro),
            "studio" => Some(PlanTier::Studio),
            _ => None,
        }
    }

    /// Get the wire representation of the tier.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Free => "FREE",
            PlanTier::Starter => "STARTER",
            PlanTier::Pro => "PRO",
            PlanTier::Studio => "STUDIO",
        }
    }

    /// Get a human-readable display name for the tier.
    pub fn display_name(&self) -> &'static str {
        match self {
            PlanTier::Free => "Free",
            PlanTier::Starter => "Starter",
            PlanTier::Pro => "Pro",
            PlanTier::Studio => "Studio",
        }
    }

    /// Check if this is a paid tier.
    pub fn is_paid(&self) -> bool {
        !matches!(self, PlanTier::Free)
    }

    /// Check if moving from this tier to `target` is an upgrade.
    pub fn is_upgrade_to(&self, target: PlanTier) -> bool {
        target > *self
    }

    /// Position of the tier in [`PlanTier::ALL`].
    pub(crate) const fn index(&self) -> usize {
        match self {
            PlanTier::Free => 0,
            PlanTier::Starter => 1,
            PlanTier::Pro => 2,
            PlanTier::Studio => 3,
        }
    }
}

impl Default for PlanTier {
    fn default() -> Self {
        PlanTier::Free
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanTier {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlanTier::parse(s).ok_or_else(|| PlanError::UnknownTier(s.to_string()))
    }
}
