//! Subscription-tier content gating.

use serde::{Deserialize, Serialize};

use crate::catalog::ContentCategory;
use crate::learner::{SubscriptionStatus, SubscriptionTier};

/// Which content categories a learner may see.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentAccess {
    pub immersion: bool,
    pub bilingual: bool,
    pub translation_support: bool,
}

impl ContentAccess {
    /// No access at all.
    pub const NONE: ContentAccess = ContentAccess {
        immersion: false,
        bilingual: false,
        translation_support: false,
    };

    /// Resolve capabilities from the billing state.
    ///
    /// Anything other than an active subscription grants nothing.
    ///
    /// | Tier      | Immersion | Bilingual | Translation |
    /// |-----------|-----------|-----------|-------------|
    /// | Free      | No        | No        | No          |
    /// | Immersion | Yes       | No        | No          |
    /// | Bilingual | No        | Yes       | Yes         |
    /// | Bundle    | Yes       | Yes       | Yes         |
    pub fn resolve(tier: SubscriptionTier, status: SubscriptionStatus) -> Self {
        if status != SubscriptionStatus::Active {
            return Self::NONE;
        }
        match tier {
            SubscriptionTier::Immersion => Self {
                immersion: true,
                ..Self::NONE
            },
            SubscriptionTier::Bilingual => Self {
                bilingual: true,
                translation_support: true,
                ..Self::NONE
            },
            SubscriptionTier::Bundle => Self {
                immersion: true,
                bilingual: true,
                translation_support: true,
            },
            SubscriptionTier::Free | SubscriptionTier::Unknown => Self::NONE,
        }
    }

    pub fn has_any_category(&self) -> bool {
        self.immersion || self.bilingual
    }

    pub fn allows(&self, category: ContentCategory) -> bool {
        match category {
            ContentCategory::Immersion => self.immersion,
            ContentCategory::Bilingual => self.bilingual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_TIERS: [SubscriptionTier; 5] = [
        SubscriptionTier::Free,
        SubscriptionTier::Immersion,
        SubscriptionTier::Bilingual,
        SubscriptionTier::Bundle,
        SubscriptionTier::Unknown,
    ];

    #[test]
    fn inactive_statuses_grant_nothing() {
        for status in [
            SubscriptionStatus::Inactive,
            SubscriptionStatus::PastDue,
            SubscriptionStatus::Cancelled,
            SubscriptionStatus::Unknown,
        ] {
            for tier in ALL_TIERS {
                assert_eq!(ContentAccess::resolve(tier, status), ContentAccess::NONE);
            }
        }
    }

    #[test]
    fn active_tiers_map_to_categories() {
        let active = SubscriptionStatus::Active;

        let immersion = ContentAccess::resolve(SubscriptionTier::Immersion, active);
        assert!(immersion.immersion && !immersion.bilingual && !immersion.translation_support);

        let bilingual = ContentAccess::resolve(SubscriptionTier::Bilingual, active);
        assert!(!bilingual.immersion && bilingual.bilingual && bilingual.translation_support);

        let bundle = ContentAccess::resolve(SubscriptionTier::Bundle, active);
        assert!(bundle.immersion && bundle.bilingual && bundle.translation_support);
    }

    #[test]
    fn free_and_unknown_fail_closed() {
        let active = SubscriptionStatus::Active;
        assert!(!ContentAccess::resolve(SubscriptionTier::Free, active).has_any_category());
        assert!(!ContentAccess::resolve(SubscriptionTier::Unknown, active).has_any_category());
    }

    #[test]
    fn allows_checks_category() {
        let access =
            ContentAccess::resolve(SubscriptionTier::Immersion, SubscriptionStatus::Active);
        assert!(access.allows(ContentCategory::Immersion));
        assert!(!access.allows(ContentCategory::Bilingual));
    }
}
