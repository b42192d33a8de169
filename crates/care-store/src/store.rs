//! Survey store
//!
//! Persists one submission as two artifacts, in a fixed order:
//! 1. create the output directory if missing, check the log header and
//!    encode the row
//! 2. create the record file
//! 3. append the log row (or swap in a widened log)
//!
//! A failure at any step skips the ones after it. The log row is fully
//! encoded before the record file is written, so a failed append never
//! leaves a partial row behind.

use std::path::{Path, PathBuf};

use care_core::{FormSession, SubmissionBuilder, SubmissionState, SurveyRecord};
use chrono::{Local, NaiveDateTime};

use crate::branding::BrandingAsset;
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::record_file::RecordWriter;
use crate::tabular::TabularLog;

/// What a successful submission produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    /// The persisted record
    pub record: SurveyRecord,
    /// Record file name, also offered as the download name
    pub file_name: String,
    /// Full path of the record file
    pub record_path: PathBuf,
    /// Shared log the row went to
    pub log_path: PathBuf,
    /// Exact bytes of the record file
    pub json: Vec<u8>,
}

impl SubmissionReceipt {
    /// Download copy of the record file
    #[inline]
    #[must_use]
    pub fn download_bytes(&self) -> &[u8] {
        &self.json
    }

    /// Confirmation shown after a successful submit
    #[must_use]
    pub fn confirmation(&self) -> String {
        format!(
            "Survey submitted successfully! Your response has been saved as `{}`",
            self.file_name
        )
    }
}

/// Record files plus the shared log, under one output directory
#[derive(Debug)]
pub struct SurveyStore {
    config: StoreConfig,
    records: RecordWriter,
    log: TabularLog,
    builder: SubmissionBuilder,
}

impl SurveyStore {
    /// Build a store without touching the file system
    ///
    /// # Errors
    /// Returns [`StoreError::Config`] for an invalid configuration
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        config.validate()?;
        Ok(Self {
            records: RecordWriter::new(&config.output_dir, &config.record_prefix),
            log: TabularLog::new(config.log_path()),
            builder: SubmissionBuilder::new(),
            config,
        })
    }

    /// Build a store, creating the output directory up front
    ///
    /// # Errors
    /// Returns error for an invalid configuration or an uncreatable directory
    pub fn open(config: StoreConfig) -> Result<Self, StoreError> {
        let store = Self::new(config)?;
        store.ensure_output_dir()?;
        Ok(store)
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Output directory
    #[inline]
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.config.output_dir
    }

    /// Record file writer
    #[inline]
    #[must_use]
    pub fn records(&self) -> &RecordWriter {
        &self.records
    }

    /// Shared tabular log
    #[inline]
    #[must_use]
    pub fn log(&self) -> &TabularLog {
        &self.log
    }

    /// Branding image, if configured and present
    #[must_use]
    pub fn branding(&self) -> Option<BrandingAsset> {
        BrandingAsset::load(&self.config.logo_path)
    }

    /// Write both artifacts for an already-built record
    ///
    /// # Errors
    /// Returns the first failing step's error; later steps are skipped
    pub fn persist(&self, record: &SurveyRecord) -> Result<SubmissionReceipt, StoreError> {
        self.persist_tracked(record, &mut |_| Ok(()))
    }

    /// Validate, build and persist the form's current answers
    ///
    /// Drives the form's submission tracker through every state. On success
    /// the free text is cleared for the next submission.
    ///
    /// # Errors
    /// - [`StoreError::Rejected`] for a blank respondent code (no I/O happened)
    /// - any persistence error from [`SurveyStore::persist`]
    pub fn submit(
        &self,
        form: &mut FormSession,
        now: NaiveDateTime,
    ) -> Result<SubmissionReceipt, StoreError> {
        form.tracker_mut().reset()?;
        form.tracker_mut().advance(SubmissionState::Validating)?;

        let record = match self.builder.build(form, now) {
            Ok(record) => record,
            Err(e) => {
                form.tracker_mut().advance(SubmissionState::Rejected)?;
                tracing::warn!("Submission rejected: {}", e);
                return Err(e.into());
            }
        };
        form.tracker_mut().advance(SubmissionState::Building)?;

        let tracker = form.tracker_mut();
        let result =
            self.persist_tracked(&record, &mut |state| tracker.advance(state).map_err(Into::into));
        match result {
            Ok(receipt) => {
                tracker.advance(SubmissionState::Done)?;
                form.reset_after_submit();
                Ok(receipt)
            }
            Err(e) => {
                // Failed is only reachable from the write states.
                if matches!(
                    tracker.state(),
                    SubmissionState::WritingFile | SubmissionState::WritingLog
                ) {
                    tracker.advance(SubmissionState::Failed)?;
                }
                Err(e)
            }
        }
    }

    /// [`SurveyStore::submit`] stamped with the local wall clock
    ///
    /// # Errors
    /// See [`SurveyStore::submit`]
    pub fn submit_now(&self, form: &mut FormSession) -> Result<SubmissionReceipt, StoreError> {
        self.submit(form, Local::now().naive_local())
    }

    fn ensure_output_dir(&self) -> Result<(), StoreError> {
        let dir = &self.config.output_dir;
        std::fs::create_dir_all(dir).map_err(|e| {
            tracing::error!("Output directory {} not creatable: {}", dir.display(), e);
            StoreError::io(dir, e)
        })
    }

    fn persist_tracked(
        &self,
        record: &SurveyRecord,
        on_state: &mut dyn FnMut(SubmissionState) -> Result<(), StoreError>,
    ) -> Result<SubmissionReceipt, StoreError> {
        on_state(SubmissionState::WritingFile)?;
        self.ensure_output_dir()?;
        let encoded = self.records.encode(record)?;
        let reservation = self.log.reserve(record).map_err(|e| {
            tracing::error!("Log not writable, nothing saved: {}", e);
            e
        })?;
        let record_path = self.records.write(&encoded).map_err(|e| {
            tracing::error!("Record file write failed: {}", e);
            e
        })?;

        on_state(SubmissionState::WritingLog)?;
        reservation.commit().map_err(|e| {
            tracing::error!(
                "Log append failed after writing {}: {}",
                record_path.display(),
                e
            );
            e
        })?;

        tracing::info!(
            "Saved {} submission {} for {} as {}",
            record.survey_type(),
            record.submission_id(),
            record.respondent_code(),
            encoded.file_name
        );

        Ok(SubmissionReceipt {
            record: record.clone(),
            file_name: encoded.file_name,
            record_path,
            log_path: self.log.path().to_path_buf(),
            json: encoded.bytes,
        })
    }
}
