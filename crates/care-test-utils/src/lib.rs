//! Testing utilities for CARE workspace
//!
//! Shared test helpers and fixtures.

#![allow(missing_docs)]

use care_core::{FormSession, LikertRating, SurveyType};
use care_store::{StoreConfig, SurveyStore};
use chrono::{NaiveDate, NaiveDateTime};
use tempfile::TempDir;

pub fn survey_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, 15).unwrap()
}

/// Fixed submission instant with sub-second precision
pub fn fixed_now() -> NaiveDateTime {
    survey_day().and_hms_micro_opt(10, 42, 7, 123_456).unwrap()
}

pub fn fixed_now_plus_secs(secs: u32) -> NaiveDateTime {
    survey_day()
        .and_hms_micro_opt(10, 42, 7 + secs, 123_456)
        .unwrap()
}

/// Form with every rating set to `value`
pub fn filled_form(survey_type: SurveyType, code: &str, value: u8, text: &str) -> FormSession {
    let mut form = FormSession::new(survey_type, survey_day());
    form.set_respondent_code(code);
    form.set_free_text(text);
    let rating = LikertRating::new(value).unwrap();
    for id in survey_type.question_ids() {
        form.set_rating(id, rating).unwrap();
    }
    form
}

/// The `MN30` pre-survey example: all ratings 3, free text `ok`
pub fn mn30_pre_form() -> FormSession {
    filled_form(SurveyType::Pre, "MN30", 3, "ok")
}

/// Store rooted in a fresh temporary directory
pub struct TempStore {
    pub dir: TempDir,
    pub store: SurveyStore,
}

impl TempStore {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store = SurveyStore::open(StoreConfig::new().with_output_dir(dir.path())).unwrap();
        Self { dir, store }
    }

    /// Names of record files in the output directory, sorted
    pub fn record_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(".json"))
            .collect();
        names.sort();
        names
    }

    pub fn log_bytes(&self) -> Option<Vec<u8>> {
        std::fs::read(self.store.log().path()).ok()
    }
}

impl Default for TempStore {
    fn default() -> Self {
        Self::new()
    }
}
