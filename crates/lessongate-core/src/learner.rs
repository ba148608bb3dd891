//! Learner profile and the enums the billing collaborator writes onto it.
//!
//! Tier and status strings come from an external billing system, so parsing
//! them is lenient: anything unrecognised becomes `Unknown`, which the access
//! resolver treats as no access.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Subscription plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionTier {
    Free,
    /// Immersion lessons only
    Immersion,
    /// Bilingual lessons with translation support
    Bilingual,
    /// Both categories with translation support
    Bundle,
    /// A value the billing system wrote that this build does not know
    Unknown,
}

/// Billing state of the subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Inactive,
    PastDue,
    Cancelled,
    Unknown,
}

/// Which lesson levels the learner wants to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferredLevel {
    Beginner,
    Intermediate,
    Both,
}

/// Support language used by bilingual lessons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportLanguage {
    English,
    Spanish,
    Portuguese,
    French,
    German,
    Italian,
    Japanese,
    Korean,
    Chinese,
}

impl SubscriptionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionTier::Free => "free",
            SubscriptionTier::Immersion => "immersion",
            SubscriptionTier::Bilingual => "bilingual",
            SubscriptionTier::Bundle => "bundle",
            SubscriptionTier::Unknown => "unknown",
        }
    }

    /// Parse a stored value; unrecognised input maps to `Unknown`.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => SubscriptionTier::Free,
            "immersion" => SubscriptionTier::Immersion,
            "bilingual" => SubscriptionTier::Bilingual,
            "bundle" => SubscriptionTier::Bundle,
            _ => SubscriptionTier::Unknown,
        }
    }
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Inactive => "inactive",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Cancelled => "cancelled",
            SubscriptionStatus::Unknown => "unknown",
        }
    }

    /// Parse a stored value; unrecognised input maps to `Unknown`.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => SubscriptionStatus::Active,
            "inactive" => SubscriptionStatus::Inactive,
            "past_due" | "pastdue" => SubscriptionStatus::PastDue,
            "cancelled" | "canceled" => SubscriptionStatus::Cancelled,
            _ => SubscriptionStatus::Unknown,
        }
    }
}

impl PreferredLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreferredLevel::Beginner => "beginner",
            PreferredLevel::Intermediate => "intermediate",
            PreferredLevel::Both => "both",
        }
    }
}

impl SupportLanguage {
    pub const ALL: [SupportLanguage; 9] = [
        SupportLanguage::English,
        SupportLanguage::Spanish,
        SupportLanguage::Portuguese,
        SupportLanguage::French,
        SupportLanguage::German,
        SupportLanguage::Italian,
        SupportLanguage::Japanese,
        SupportLanguage::Korean,
        SupportLanguage::Chinese,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SupportLanguage::English => "english",
            SupportLanguage::Spanish => "spanish",
            SupportLanguage::Portuguese => "portuguese",
            SupportLanguage::French => "french",
            SupportLanguage::German => "german",
            SupportLanguage::Italian => "italian",
            SupportLanguage::Japanese => "japanese",
            SupportLanguage::Korean => "korean",
            SupportLanguage::Chinese => "chinese",
        }
    }
}

impl FromStr for SubscriptionTier {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match SubscriptionTier::parse_lenient(s) {
            SubscriptionTier::Unknown => Err(ValidationError::UnknownVariant {
                field: "subscription_tier",
                value: s.to_string(),
            }),
            tier => Ok(tier),
        }
    }
}

impl FromStr for SubscriptionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match SubscriptionStatus::parse_lenient(s) {
            SubscriptionStatus::Unknown => Err(ValidationError::UnknownVariant {
                field: "subscription_status",
                value: s.to_string(),
            }),
            status => Ok(status),
        }
    }
}

impl FromStr for PreferredLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(PreferredLevel::Beginner),
            "intermediate" => Ok(PreferredLevel::Intermediate),
            "both" => Ok(PreferredLevel::Both),
            _ => Err(ValidationError::UnknownVariant {
                field: "preferred_level",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for SupportLanguage {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        SupportLanguage::ALL
            .into_iter()
            .find(|lang| lang.as_str() == needle)
            .ok_or_else(|| ValidationError::UnknownVariant {
                field: "language_support",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Display for SupportLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A learner as seen by the engine.
///
/// `join_date` is set once at sign-up. Tier and status are written by the
/// billing collaborator and may lag a purchase by a short window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnerProfile {
    pub id: String,
    pub join_date: DateTime<Utc>,
    pub subscription_tier: SubscriptionTier,
    pub subscription_status: SubscriptionStatus,
    pub preferred_level: PreferredLevel,
    pub language_support: SupportLanguage,
}

impl LearnerProfile {
    /// Stand-in used when no profile exists: free tier, joined `now`.
    pub fn guest(id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            join_date: now,
            subscription_tier: SubscriptionTier::Free,
            subscription_status: SubscriptionStatus::Inactive,
            preferred_level: PreferredLevel::Both,
            language_support: SupportLanguage::English,
        }
    }

    pub fn preferences(&self) -> LearnerPreferences {
        LearnerPreferences {
            level: self.preferred_level,
            language: self.language_support,
        }
    }
}

/// The profile fields the catalog selector filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnerPreferences {
    pub level: PreferredLevel,
    pub language: SupportLanguage,
}
