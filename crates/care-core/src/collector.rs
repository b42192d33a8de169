//! Response collector
//!
//! [`FormSession`] holds what one respondent has entered so far. It is created
//! when a session starts and dropped when it ends; nothing here is shared
//! between sessions.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::catalog::{Catalog, LikertRating, QuestionId, SurveyType};
use crate::error::CollectorError;
use crate::lifecycle::SubmissionTracker;
use crate::record::Ratings;

/// Per-session form state
#[derive(Debug, Clone)]
pub struct FormSession {
    survey_type: SurveyType,
    respondent_code: String,
    survey_date: NaiveDate,
    selections: BTreeMap<QuestionId, LikertRating>,
    free_text: String,
    tracker: SubmissionTracker,
}

impl FormSession {
    /// Open a form; the survey date defaults to `today`
    #[must_use]
    pub fn new(survey_type: SurveyType, today: NaiveDate) -> Self {
        Self {
            survey_type,
            respondent_code: String::new(),
            survey_date: today,
            selections: BTreeMap::new(),
            free_text: String::new(),
            tracker: SubmissionTracker::new(),
        }
    }

    /// Active survey type
    #[inline]
    #[must_use]
    pub fn survey_type(&self) -> SurveyType {
        self.survey_type
    }

    /// Switch questionnaire. Selections made for the previous type are dropped.
    pub fn select_survey_type(&mut self, survey_type: SurveyType) {
        if survey_type != self.survey_type {
            tracing::debug!(from = %self.survey_type, to = %survey_type, "switching survey type");
            self.selections.clear();
            self.survey_type = survey_type;
        }
    }

    /// Statements of the active questionnaire
    pub fn questions(&self) -> impl Iterator<Item = (QuestionId, &'static str)> {
        Catalog::entries(self.survey_type)
    }

    /// Open-ended prompt of the active questionnaire
    #[inline]
    #[must_use]
    pub fn open_prompt(&self) -> &'static str {
        self.survey_type.open_prompt()
    }

    /// Raw respondent code as typed
    #[inline]
    #[must_use]
    pub fn respondent_code(&self) -> &str {
        &self.respondent_code
    }

    /// Set the respondent code
    pub fn set_respondent_code(&mut self, code: impl Into<String>) {
        self.respondent_code = code.into();
    }

    /// Selected survey date
    #[inline]
    #[must_use]
    pub fn survey_date(&self) -> NaiveDate {
        self.survey_date
    }

    /// Set the survey date
    pub fn set_survey_date(&mut self, date: NaiveDate) {
        self.survey_date = date;
    }

    /// Free-text answer
    #[inline]
    #[must_use]
    pub fn free_text(&self) -> &str {
        &self.free_text
    }

    /// Set the free-text answer
    pub fn set_free_text(&mut self, text: impl Into<String>) {
        self.free_text = text.into();
    }

    /// Record a rating for `id`
    ///
    /// # Errors
    /// Returns [`CollectorError::UnknownQuestion`] if `id` is not in the active catalog
    pub fn set_rating(&mut self, id: QuestionId, rating: LikertRating) -> Result<(), CollectorError> {
        if !self.survey_type.contains(id) {
            return Err(CollectorError::UnknownQuestion {
                question: id.key(),
                survey: self.survey_type.label(),
            });
        }
        self.selections.insert(id, rating);
        Ok(())
    }

    /// Rating shown for `id`; untouched controls report [`LikertRating::DEFAULT`]
    #[must_use]
    pub fn rating(&self, id: QuestionId) -> Option<LikertRating> {
        if !self.survey_type.contains(id) {
            return None;
        }
        Some(self.selections.get(&id).copied().unwrap_or_default())
    }

    /// Whether the respondent explicitly chose a value for `id`
    #[inline]
    #[must_use]
    pub fn is_answered(&self, id: QuestionId) -> bool {
        self.selections.contains_key(&id)
    }

    /// One rating per active question, defaults filled in
    #[must_use]
    pub fn ratings(&self) -> Ratings {
        Ratings::from_catalog(self.survey_type, |id| {
            self.selections.get(&id).copied().unwrap_or_default()
        })
    }

    /// Submission tracker for this form
    #[inline]
    #[must_use]
    pub fn tracker(&self) -> &SubmissionTracker {
        &self.tracker
    }

    /// Mutable submission tracker
    #[inline]
    pub fn tracker_mut(&mut self) -> &mut SubmissionTracker {
        &mut self.tracker
    }

    /// Prepare the form for the next submission: only the free text is cleared
    pub fn reset_after_submit(&mut self) {
        self.free_text.clear();
    }
}
