//! Record file naming
//!
//! `<prefix>_<code>_<YYYYMMDD_HHMMSS>_<id-suffix>.json`. The id suffix comes
//! from the submission ULID so two submissions in the same second by the same
//! respondent still get distinct names.

use care_core::SurveyRecord;

/// Extension of record files
pub const RECORD_EXTENSION: &str = "json";

const NAME_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Replace characters that are unsafe in file names with `_`
#[must_use]
pub fn sanitize_code(code: &str) -> String {
    code.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// File name for `record`
#[must_use]
pub fn record_file_name(prefix: &str, record: &SurveyRecord) -> String {
    format!(
        "{prefix}_{code}_{ts}_{suffix}.{RECORD_EXTENSION}",
        code = sanitize_code(record.respondent_code().as_str()),
        ts = record.submitted_at().format(NAME_TIMESTAMP_FORMAT),
        suffix = record.submission_id().short_suffix(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use care_core::{LikertRating, Ratings, RespondentCode, SubmissionId, SurveyType};
    use chrono::NaiveDate;

    fn record(code: &str) -> SurveyRecord {
        let date = NaiveDate::from_ymd_opt(2025, 7, 4).unwrap();
        SurveyRecord::new(
            SubmissionId::new(),
            SurveyType::Post,
            RespondentCode::parse(code).unwrap(),
            date,
            date.and_hms_micro_opt(8, 5, 9, 120).unwrap(),
            Ratings::uniform(SurveyType::Post, LikertRating::DEFAULT),
            String::new(),
        )
    }

    #[test]
    fn name_layout() {
        let r = record("MN30");
        let name = record_file_name("survey_responses", &r);
        let expected = format!(
            "survey_responses_MN30_20250704_080509_{}.json",
            r.submission_id().short_suffix()
        );
        assert_eq!(name, expected);
    }

    #[test]
    fn unsafe_characters_are_replaced() {
        assert_eq!(sanitize_code("../a b/ç"), "___a_b__");
        let name = record_file_name("p", &record("x/y"));
        assert!(name.starts_with("p_x_y_"));
        assert!(!name.contains('/'));
    }

    #[test]
    fn same_second_names_differ() {
        let a = record("MN30");
        let b = record("MN30");
        assert_eq!(a.submitted_at(), b.submitted_at());
        assert_ne!(record_file_name("p", &a), record_file_name("p", &b));
    }
}
