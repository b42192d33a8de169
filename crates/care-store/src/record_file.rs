//! Individual record files
//!
//! Each submission is written once as indented JSON. The bytes go to a
//! temporary file in the target directory first and are then linked into
//! place without clobbering, so a reader never sees a half-written record.

use std::io::Write;
use std::path::{Path, PathBuf};

use care_core::SurveyRecord;

use crate::error::StoreError;
use crate::naming::record_file_name;

/// A record serialized and named, not yet on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedRecord {
    /// Final file name (no directory)
    pub file_name: String,
    /// Exact file contents
    pub bytes: Vec<u8>,
}

/// Writes and reads record files in one directory
#[derive(Debug, Clone)]
pub struct RecordWriter {
    dir: PathBuf,
    prefix: String,
}

impl RecordWriter {
    /// Writer for `dir` using `prefix` in generated names
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    /// Target directory
    #[inline]
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Serialize and name `record` without touching the file system
    ///
    /// # Errors
    /// Returns [`StoreError::Serialize`] if encoding fails
    pub fn encode(&self, record: &SurveyRecord) -> Result<EncodedRecord, StoreError> {
        Ok(EncodedRecord {
            file_name: record_file_name(&self.prefix, record),
            bytes: record.to_pretty_json()?,
        })
    }

    /// Create the record file; never overwrites
    ///
    /// # Errors
    /// - [`StoreError::RecordExists`] if the name is taken
    /// - [`StoreError::Io`] if the directory is missing or not writable
    pub fn write(&self, encoded: &EncodedRecord) -> Result<PathBuf, StoreError> {
        let target = self.dir.join(&encoded.file_name);
        if target.exists() {
            return Err(StoreError::RecordExists(target));
        }

        let mut tmp = tempfile::Builder::new()
            .prefix(".survey-record-")
            .suffix(".tmp")
            .tempfile_in(&self.dir)
            .map_err(|e| StoreError::io(&self.dir, e))?;
        tmp.write_all(&encoded.bytes)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| StoreError::io(tmp.path(), e))?;

        tmp.persist_noclobber(&target).map_err(|e| {
            if e.error.kind() == std::io::ErrorKind::AlreadyExists {
                StoreError::RecordExists(target.clone())
            } else {
                StoreError::io(&target, e.error)
            }
        })?;

        tracing::debug!(path = %target.display(), bytes = encoded.bytes.len(), "record file written");
        Ok(target)
    }

    /// Parse a record file back
    ///
    /// # Errors
    /// Returns error if the file cannot be read or is not a valid record
    pub fn read(path: impl AsRef<Path>) -> Result<SurveyRecord, StoreError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| StoreError::io(path, e))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use care_core::{LikertRating, Ratings, RespondentCode, SubmissionId, SurveyType};
    use chrono::NaiveDate;

    fn record() -> SurveyRecord {
        let date = NaiveDate::from_ymd_opt(2025, 2, 11).unwrap();
        SurveyRecord::new(
            SubmissionId::new(),
            SurveyType::Pre,
            RespondentCode::parse("MN30").unwrap(),
            date,
            date.and_hms_opt(10, 0, 0).unwrap(),
            Ratings::uniform(SurveyType::Pre, LikertRating::new(4).unwrap()),
            "journal helps".into(),
        )
    }

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let writer = RecordWriter::new(dir.path(), "survey_responses");
        let rec = record();
        let encoded = writer.encode(&rec).unwrap();
        let path = writer.write(&encoded).unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), encoded.bytes);
        assert_eq!(RecordWriter::read(&path).unwrap(), rec);
    }

    #[test]
    fn refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let writer = RecordWriter::new(dir.path(), "survey_responses");
        let encoded = writer.encode(&record()).unwrap();
        writer.write(&encoded).unwrap();

        let err = writer.write(&encoded).unwrap_err();
        assert!(matches!(err, StoreError::RecordExists(_)));
    }

    #[test]
    fn leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let writer = RecordWriter::new(dir.path(), "survey_responses");
        writer.write(&writer.encode(&record()).unwrap()).unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 1);
        assert!(names[0].ends_with(".json"));
    }

    #[test]
    fn missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let writer = RecordWriter::new(dir.path().join("absent"), "survey_responses");
        let err = writer.write(&writer.encode(&record()).unwrap()).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }
}
