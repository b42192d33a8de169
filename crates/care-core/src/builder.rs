//! Submission builder
//!
//! Turns the current [`FormSession`] into an immutable [`SurveyRecord`].
//! The respondent code is the only field checked.

use chrono::{Local, NaiveDateTime};

use crate::collector::FormSession;
use crate::error::ValidationError;
use crate::record::SurveyRecord;
use crate::types::{RespondentCode, SubmissionId};

/// Builds survey records from form state
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmissionBuilder;

impl SubmissionBuilder {
    /// Create new builder
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Build a record stamped with `now`
    ///
    /// # Errors
    /// Returns [`ValidationError::MissingRespondentCode`] if the code is blank
    pub fn build(
        &self,
        form: &FormSession,
        now: NaiveDateTime,
    ) -> Result<SurveyRecord, ValidationError> {
        let respondent_code = RespondentCode::parse(form.respondent_code())?;

        Ok(SurveyRecord::new(
            SubmissionId::new(),
            form.survey_type(),
            respondent_code,
            form.survey_date(),
            now,
            form.ratings(),
            form.free_text().to_string(),
        ))
    }

    /// Build a record stamped with the local wall clock
    ///
    /// # Errors
    /// See [`SubmissionBuilder::build`]
    pub fn build_now(&self, form: &FormSession) -> Result<SurveyRecord, ValidationError> {
        self.build(form, Local::now().naive_local())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{LikertRating, QuestionId, SurveyType};
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn form(survey_type: SurveyType) -> FormSession {
        FormSession::new(survey_type, NaiveDate::from_ymd_opt(2025, 1, 20).unwrap())
    }

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 20)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn rejects_blank_code() {
        let builder = SubmissionBuilder::new();
        let mut f = form(SurveyType::Pre);
        assert_eq!(
            builder.build(&f, noon()),
            Err(ValidationError::MissingRespondentCode)
        );
        f.set_respondent_code("   ");
        assert!(builder.build(&f, noon()).is_err());
    }

    #[test]
    fn builds_full_record() {
        let mut f = form(SurveyType::Pre);
        f.set_respondent_code("MN30");
        f.set_free_text("ok");
        for id in SurveyType::Pre.question_ids() {
            f.set_rating(id, LikertRating::new(3).unwrap()).unwrap();
        }

        let record = SubmissionBuilder::new().build(&f, noon()).unwrap();
        assert_eq!(record.respondent_code().as_str(), "MN30");
        assert_eq!(record.submitted_at(), noon());
        assert_eq!(record.survey_date(), noon().date());
        assert_eq!(record.free_text(), "ok");
        assert!(record.ratings().iter().all(|(_, r)| r.value() == 3));
    }

    #[test]
    fn each_build_gets_fresh_id() {
        let mut f = form(SurveyType::Post);
        f.set_respondent_code("AB01");
        let builder = SubmissionBuilder::new();
        let a = builder.build(&f, noon()).unwrap();
        let b = builder.build(&f, noon()).unwrap();
        assert_ne!(a.submission_id(), b.submission_id());
    }

    #[test]
    fn no_pre_ratings_leak_into_post() {
        let mut f = form(SurveyType::Pre);
        f.set_respondent_code("MN30");
        f.set_rating(QuestionId::new(1).unwrap(), LikertRating::new(5).unwrap())
            .unwrap();
        f.select_survey_type(SurveyType::Post);

        let record = SubmissionBuilder::new().build(&f, noon()).unwrap();
        assert_eq!(record.survey_type(), SurveyType::Post);
        assert_eq!(record.ratings().len(), 10);
        assert_eq!(
            record.ratings().get(QuestionId::new(1).unwrap()),
            Some(LikertRating::DEFAULT)
        );
    }

    proptest! {
        #[test]
        fn prop_rating_count_matches_catalog(
            post in any::<bool>(),
            values in proptest::collection::vec(1u8..=5, 0..12),
        ) {
            let survey_type = if post { SurveyType::Post } else { SurveyType::Pre };
            let mut f = form(survey_type);
            f.set_respondent_code("P1");
            for (i, v) in values.iter().enumerate() {
                let id = QuestionId::new(u8::try_from(i + 1).unwrap()).unwrap();
                // Out-of-catalog ids are refused by the collector.
                let _ = f.set_rating(id, LikertRating::new(*v).unwrap());
            }
            let record = SubmissionBuilder::new().build(&f, noon()).unwrap();
            prop_assert_eq!(record.ratings().len(), survey_type.question_count());
            prop_assert!(record.ratings().iter().all(|(id, _)| survey_type.contains(id)));
        }
    }
}
