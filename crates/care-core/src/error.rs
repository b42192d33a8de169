//! Error types for CARE core
//!
//! Covers:
//! - Required-field validation on submit
//! - Collector input errors (unknown questions, out-of-range ratings)
//! - Illegal submission lifecycle transitions

use crate::lifecycle::SubmissionState;

/// Main survey error type
#[derive(Debug, thiserror::Error)]
pub enum SurveyError {
    /// Submission rejected by validation
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Bad collector input
    #[error("collector error: {0}")]
    Collector(#[from] CollectorError),

    /// Submission lifecycle violated
    #[error("lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),
}

impl SurveyError {
    /// Check if the user can fix the input and submit again
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Collector(_))
    }

    /// Message suitable for showing inline next to the form
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(e) => e.user_message().to_string(),
            Self::Collector(e) => e.to_string(),
            Self::Lifecycle(_) => "The form is busy. Please try submitting again.".to_string(),
        }
    }
}

/// Submit-time validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Respondent code empty or whitespace-only
    #[error("respondent code is required")]
    MissingRespondentCode,
}

impl ValidationError {
    /// Message shown to the respondent
    #[inline]
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::MissingRespondentCode => "Please enter your unique code before submitting.",
        }
    }
}

/// Collector and catalog input errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollectorError {
    /// Question id not present in the active catalog
    #[error("question {question} is not part of the {survey} questionnaire")]
    UnknownQuestion {
        /// Offending question key
        question: String,
        /// Active survey label
        survey: &'static str,
    },

    /// Ratings do not cover the active catalog exactly
    #[error("expected {expected} ratings, found {found}")]
    IncompleteRatings {
        /// Questions in the catalog
        expected: usize,
        /// Ratings supplied
        found: usize,
    },

    /// Rating outside 1..=5
    #[error("rating {0} is outside the 1-5 scale")]
    RatingOutOfRange(u8),

    /// Unparseable question id
    #[error("invalid question id: {0}")]
    InvalidQuestionId(String),

    /// Unknown survey type name
    #[error("unknown survey type: {0}")]
    UnknownSurveyType(String),
}

/// Submission state machine errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    /// Transition not in the allowed table
    #[error("illegal submission transition {from:?} -> {to:?}")]
    IllegalTransition {
        /// Current state
        from: SubmissionState,
        /// Requested state
        to: SubmissionState,
    },
}
