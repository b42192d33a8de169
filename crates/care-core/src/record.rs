//! Survey record
//!
//! The single persisted entity. A [`SurveyRecord`] is immutable once built;
//! its ratings always cover the active catalog exactly.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::catalog::{LikertRating, QuestionId, SurveyType};
use crate::error::CollectorError;
use crate::types::{RespondentCode, SubmissionId};

/// ISO-8601 layout used for submission timestamps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Complete set of ratings for one survey type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Ratings(BTreeMap<QuestionId, LikertRating>);

impl Ratings {
    /// Validate `ratings` against the catalog of `survey_type`
    ///
    /// # Errors
    /// - [`CollectorError::UnknownQuestion`] for a key outside the catalog
    /// - [`CollectorError::IncompleteRatings`] when any question is missing
    pub fn for_survey(
        survey_type: SurveyType,
        ratings: BTreeMap<QuestionId, LikertRating>,
    ) -> Result<Self, CollectorError> {
        if let Some(extra) = ratings.keys().find(|id| !survey_type.contains(**id)) {
            return Err(CollectorError::UnknownQuestion {
                question: extra.key(),
                survey: survey_type.label(),
            });
        }
        if ratings.len() != survey_type.question_count() {
            return Err(CollectorError::IncompleteRatings {
                expected: survey_type.question_count(),
                found: ratings.len(),
            });
        }
        Ok(Self(ratings))
    }

    /// Same rating for every question of `survey_type`
    #[must_use]
    pub fn uniform(survey_type: SurveyType, rating: LikertRating) -> Self {
        Self::from_catalog(survey_type, |_| rating)
    }

    /// Fill every question of `survey_type` from `rating_for`
    pub(crate) fn from_catalog(
        survey_type: SurveyType,
        rating_for: impl Fn(QuestionId) -> LikertRating,
    ) -> Self {
        Self(survey_type.question_ids().map(|id| (id, rating_for(id))).collect())
    }

    /// Rating for a question
    #[inline]
    #[must_use]
    pub fn get(&self, id: QuestionId) -> Option<LikertRating> {
        self.0.get(&id).copied()
    }

    /// Number of rated questions
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a validated set
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Ratings in question order
    pub fn iter(&self) -> impl Iterator<Item = (QuestionId, LikertRating)> + '_ {
        self.0.iter().map(|(id, r)| (*id, *r))
    }
}

/// One survey submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRecord")]
pub struct SurveyRecord {
    submission_id: SubmissionId,
    survey_type: SurveyType,
    #[serde(rename = "unique_code")]
    respondent_code: RespondentCode,
    #[serde(rename = "date")]
    survey_date: NaiveDate,
    #[serde(rename = "submission_timestamp")]
    submitted_at: NaiveDateTime,
    #[serde(rename = "responses")]
    ratings: Ratings,
    #[serde(rename = "open_ended_response")]
    free_text: String,
}

impl SurveyRecord {
    /// Assemble a record from validated parts
    #[must_use]
    pub fn new(
        submission_id: SubmissionId,
        survey_type: SurveyType,
        respondent_code: RespondentCode,
        survey_date: NaiveDate,
        submitted_at: NaiveDateTime,
        ratings: Ratings,
        free_text: String,
    ) -> Self {
        Self {
            submission_id,
            survey_type,
            respondent_code,
            survey_date,
            submitted_at,
            ratings,
            free_text,
        }
    }

    /// Generated submission id
    #[inline]
    #[must_use]
    pub fn submission_id(&self) -> SubmissionId {
        self.submission_id
    }

    /// Survey type
    #[inline]
    #[must_use]
    pub fn survey_type(&self) -> SurveyType {
        self.survey_type
    }

    /// Respondent code
    #[inline]
    #[must_use]
    pub fn respondent_code(&self) -> &RespondentCode {
        &self.respondent_code
    }

    /// User-selected survey date
    #[inline]
    #[must_use]
    pub fn survey_date(&self) -> NaiveDate {
        self.survey_date
    }

    /// Generated submission instant
    #[inline]
    #[must_use]
    pub fn submitted_at(&self) -> NaiveDateTime {
        self.submitted_at
    }

    /// Submission instant formatted as ISO-8601
    #[must_use]
    pub fn submitted_at_iso(&self) -> String {
        self.submitted_at.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Ratings keyed by question id
    #[inline]
    #[must_use]
    pub fn ratings(&self) -> &Ratings {
        &self.ratings
    }

    /// Open-ended answer
    #[inline]
    #[must_use]
    pub fn free_text(&self) -> &str {
        &self.free_text
    }

    /// Pretty-printed JSON with 4-space indentation
    ///
    /// # Errors
    /// Returns error if serialization fails (not expected for this type)
    pub fn to_pretty_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        Ok(buf)
    }
}

#[derive(Deserialize)]
struct RawRecord {
    submission_id: SubmissionId,
    survey_type: SurveyType,
    unique_code: RespondentCode,
    date: NaiveDate,
    submission_timestamp: NaiveDateTime,
    responses: BTreeMap<QuestionId, LikertRating>,
    open_ended_response: String,
}

impl TryFrom<RawRecord> for SurveyRecord {
    type Error = CollectorError;

    fn try_from(raw: RawRecord) -> Result<Self, Self::Error> {
        let ratings = Ratings::for_survey(raw.survey_type, raw.responses)?;
        Ok(Self {
            submission_id: raw.submission_id,
            survey_type: raw.survey_type,
            respondent_code: raw.unique_code,
            survey_date: raw.date,
            submitted_at: raw.submission_timestamp,
            ratings,
            free_text: raw.open_ended_response,
        })
    }
}
