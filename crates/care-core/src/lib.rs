//! CARE Core - Likert survey model
//!
//! The in-memory half of the CARE Journal survey:
//! - Static pre/post question catalog and Likert scale
//! - Per-session response collection
//! - Submission building with the required-field check
//! - The submission lifecycle state machine
//!
//! # Example
//!
//! ```rust
//! use care_core::{FormSession, SubmissionBuilder, SurveyType};
//! use chrono::NaiveDate;
//!
//! let today = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
//! let mut form = FormSession::new(SurveyType::Pre, today);
//! form.set_respondent_code("MN30");
//!
//! let record = SubmissionBuilder::new().build_now(&form).unwrap();
//! assert_eq!(record.ratings().len(), 7);
//! ```

#![warn(unreachable_pub)]

pub mod builder;
pub mod catalog;
pub mod collector;
pub mod error;
pub mod lifecycle;
pub mod record;
pub mod types;

// Re-exports for convenience
pub use builder::SubmissionBuilder;
pub use catalog::{
    max_question_count, Catalog, LikertRating, QuestionId, SurveyType, SURVEY_AUDIENCE,
    SURVEY_TITLE,
};
pub use collector::FormSession;
pub use error::{CollectorError, LifecycleError, SurveyError, ValidationError};
pub use lifecycle::{allowed_transitions, validate_transition, SubmissionState, SubmissionTracker};
pub use record::{Ratings, SurveyRecord, TIMESTAMP_FORMAT};
pub use types::{RespondentCode, SubmissionId};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with CARE Core
    pub use crate::{
        FormSession, LikertRating, QuestionId, Ratings, RespondentCode, SubmissionBuilder,
        SubmissionState, SurveyError, SurveyRecord, SurveyType,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
