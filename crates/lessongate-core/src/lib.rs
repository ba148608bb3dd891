//! # Lessongate Core Library
//!
//! Content progression and access rules for a subscription-gated lesson
//! portal. Given a learner, the engine decides which content categories they
//! may see, how much of the weekly lesson catalog is unlocked for them, and
//! how consistently they have been learning.
//!
//! ## Architecture
//!
//! - **Access**: subscription tier and status to content capabilities
//! - **Unlock**: rolling weekly release with catch-up acceleration and an
//!   anti-binge brake
//! - **Selector**: the visible lesson set from catalog, access and progression
//! - **Engagement**: learning-week streak and completion rate
//! - **Storage**: SQLite-backed stores and TOML-based configuration
//!
//! Every time-dependent function takes `now` explicitly.
//!
//! ## Key Components
//!
//! - [`LearningEngine`]: `resolve_learning_view` and `mark_lesson_complete`
//! - [`Database`]: SQLite implementation of the store traits
//! - [`Config`]: Tunable schedule constants

pub mod access;
pub mod calendar;
pub mod catalog;
pub mod completion;
pub mod engagement;
pub mod engine;
pub mod error;
pub mod learner;
pub mod selector;
pub mod storage;
pub mod store;
pub mod unlock;

pub use access::ContentAccess;
pub use catalog::{ContentCategory, LessonKind, LessonRecord, Level};
pub use completion::CompletionEvent;
pub use engagement::{EngagementAggregator, EngagementPolicy, EngagementSummary};
pub use engine::{CompletionOutcome, LearningEngine, LearningView, ProgressionView, Section};
pub use error::{ConfigError, CoreError, StoreError, ValidationError};
pub use learner::{
    LearnerPreferences, LearnerProfile, PreferredLevel, SubscriptionStatus, SubscriptionTier,
    SupportLanguage,
};
pub use selector::{DisplayOrder, ViewFilters};
pub use storage::{Config, Database};
pub use store::{CatalogStore, CompletionStore, ProfileStore};
pub use unlock::{ProgressionState, UnlockPolicy, UnlockSchedule};
