use chrono::{DateTime, Utc};
use clap::Subcommand;
use lessongate_core::{
    Database, LearnerProfile, PreferredLevel, ProfileStore, SubscriptionStatus, SubscriptionTier,
    SupportLanguage,
};

#[derive(Subcommand)]
pub enum LearnerAction {
    /// Create or update a learner profile
    Add {
        /// Learner ID (generated if omitted)
        #[arg(long)]
        id: Option<String>,
        /// Sign-up instant (RFC 3339). Ignored for existing learners
        #[arg(long)]
        joined: Option<DateTime<Utc>>,
        /// Subscription tier (free, immersion, bilingual, bundle)
        #[arg(long, default_value = "free")]
        tier: SubscriptionTier,
        /// Subscription status (active, inactive, past_due, cancelled)
        #[arg(long, default_value = "inactive")]
        status: SubscriptionStatus,
        /// Preferred level (beginner, intermediate, both)
        #[arg(long, default_value = "both")]
        level: PreferredLevel,
        /// Translation support language
        #[arg(long, default_value = "english")]
        language: SupportLanguage,
    },
    /// Show a learner profile
    Show {
        /// Learner ID
        id: String,
    },
    /// Apply a billing update to tier and status
    Billing {
        /// Learner ID
        id: String,
        #[arg(long)]
        tier: SubscriptionTier,
        #[arg(long)]
        status: SubscriptionStatus,
    },
}

pub fn run(action: LearnerAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        LearnerAction::Add {
            id,
            joined,
            tier,
            status,
            level,
            language,
        } => {
            let profile = LearnerProfile {
                id: id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
                join_date: joined.unwrap_or_else(Utc::now),
                subscription_tier: tier,
                subscription_status: status,
                preferred_level: level,
                language_support: language,
            };
            db.upsert_profile(&profile)?;
            tracing::info!(learner_id = %profile.id, "learner saved");
            println!("Learner saved: {}", profile.id);
        }
        LearnerAction::Show { id } => {
            let profile = db.get_learner_profile(&id)?;
            super::print_json(&profile)?;
        }
        LearnerAction::Billing { id, tier, status } => {
            if !db.apply_billing_update(&id, tier, status, Utc::now())? {
                return Err(format!("learner not found: {id}").into());
            }
            println!("Billing updated: {id} -> {tier} ({status})");
        }
    }
    Ok(())
}
