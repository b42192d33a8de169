//! Shared tabular log
//!
//! One CSV file accumulates a flattened row per submission for every survey
//! type. The column set is declared up front as the union of all catalogs:
//!
//! `Survey_Type, Unique_Code, Date, Submission_Timestamp, Open_Ended_Response, Q1..Q10`
//!
//! Pre rows leave the trailing rating columns empty. An existing file keeps
//! its header while rows fit it. A narrower legacy header (`Q1..Qk`) that
//! cannot hold a row is widened: the file is re-encoded under the wider
//! header and swapped in through a temp file, holding the append lock.
//! Any other header is a schema mismatch.

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use care_core::{max_question_count, QuestionId, SurveyRecord, SurveyType};
use parking_lot::{Mutex, MutexGuard};
use serde::Serialize;

use crate::error::StoreError;

/// Columns preceding the rating columns
pub const FIXED_COLUMNS: [&str; 5] = [
    "Survey_Type",
    "Unique_Code",
    "Date",
    "Submission_Timestamp",
    "Open_Ended_Response",
];

/// Ordered column set of a log file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSchema {
    columns: Vec<String>,
}

impl LogSchema {
    /// Fixed columns followed by `Q1..Qn`
    #[must_use]
    pub fn with_rating_columns(n: usize) -> Self {
        let columns = FIXED_COLUMNS
            .iter()
            .map(|c| (*c).to_string())
            .chain((1..=n).map(|i| format!("Q{i}")))
            .collect();
        Self { columns }
    }

    /// Union of every survey's columns
    #[must_use]
    pub fn superset() -> Self {
        Self::with_rating_columns(max_question_count())
    }

    /// Header a per-type log would carry
    #[must_use]
    pub fn for_survey(survey_type: SurveyType) -> Self {
        Self::with_rating_columns(survey_type.question_count())
    }

    /// Schema read from an existing header
    #[must_use]
    pub fn from_columns(columns: Vec<String>) -> Self {
        Self { columns }
    }

    /// Column names in file order
    #[inline]
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of contiguous `Q1..Qk` columns after the fixed prefix, if the
    /// header has the expected shape
    #[must_use]
    pub fn rating_column_count(&self) -> Option<usize> {
        if self.columns.len() < FIXED_COLUMNS.len() {
            return None;
        }
        let (fixed, ratings) = self.columns.split_at(FIXED_COLUMNS.len());
        if fixed.iter().zip(FIXED_COLUMNS).any(|(have, want)| have != want) {
            return None;
        }
        ratings
            .iter()
            .enumerate()
            .all(|(i, c)| *c == format!("Q{}", i + 1))
            .then_some(ratings.len())
    }

    /// Whether rows of `survey_type` fit this header without dropping values
    #[must_use]
    pub fn accepts(&self, survey_type: SurveyType) -> bool {
        self.rating_column_count()
            .is_some_and(|k| k >= survey_type.question_count())
    }
}

impl Default for LogSchema {
    fn default() -> Self {
        Self::superset()
    }
}

/// One flattened submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogRow {
    /// Survey label
    pub survey_type: String,
    /// Respondent code
    pub unique_code: String,
    /// Survey date, `YYYY-MM-DD`
    pub date: String,
    /// Submission instant, ISO-8601
    pub submission_timestamp: String,
    /// Free-text answer
    pub open_ended_response: String,
    /// Non-empty rating cells
    pub ratings: BTreeMap<QuestionId, u8>,
}

impl LogRow {
    /// Flatten a record
    #[must_use]
    pub fn from_record(record: &SurveyRecord) -> Self {
        Self {
            survey_type: record.survey_type().label().to_string(),
            unique_code: record.respondent_code().to_string(),
            date: record.survey_date().format("%Y-%m-%d").to_string(),
            submission_timestamp: record.submitted_at_iso(),
            open_ended_response: record.free_text().to_string(),
            ratings: record
                .ratings()
                .iter()
                .map(|(id, r)| (id, r.value()))
                .collect(),
        }
    }

    /// Cell values in `schema` order; columns without a value are empty
    #[must_use]
    pub fn cells(&self, schema: &LogSchema) -> Vec<String> {
        schema
            .columns()
            .iter()
            .map(|column| match column.as_str() {
                "Survey_Type" => self.survey_type.clone(),
                "Unique_Code" => self.unique_code.clone(),
                "Date" => self.date.clone(),
                "Submission_Timestamp" => self.submission_timestamp.clone(),
                "Open_Ended_Response" => self.open_ended_response.clone(),
                other => other
                    .parse::<QuestionId>()
                    .ok()
                    .and_then(|id| self.ratings.get(&id))
                    .map(u8::to_string)
                    .unwrap_or_default(),
            })
            .collect()
    }

    /// Rating cell for question `n`
    #[must_use]
    pub fn rating(&self, n: u8) -> Option<u8> {
        QuestionId::new(n)
            .ok()
            .and_then(|id| self.ratings.get(&id).copied())
    }
}

/// How a reservation lands in the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitMode {
    /// Append the bytes to the existing file
    Append,
    /// Replace the whole file; used when a legacy header is widened
    Rewrite,
}

/// A row encoded and checked against the header, holding the append lock
///
/// Dropping it without [`LogReservation::commit`] writes nothing.
#[derive(Debug)]
pub struct LogReservation<'a> {
    path: &'a Path,
    bytes: Vec<u8>,
    mode: CommitMode,
    _guard: MutexGuard<'a, ()>,
}

impl LogReservation<'_> {
    /// Bytes that will be appended, or the full new file for a rewrite
    #[inline]
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Whether commit appends or replaces the file
    #[inline]
    #[must_use]
    pub fn mode(&self) -> CommitMode {
        self.mode
    }

    /// Append the row with a single write, or swap in the widened file
    ///
    /// # Errors
    /// Returns [`StoreError::Io`] if the file cannot be opened or written
    pub fn commit(self) -> Result<(), StoreError> {
        match self.mode {
            CommitMode::Append => self.append(),
            CommitMode::Rewrite => self.rewrite(),
        }
    }

    fn append(&self) -> Result<(), StoreError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path)
            .map_err(|e| StoreError::io(self.path, e))?;
        file.write_all(&self.bytes)
            .and_then(|()| file.sync_data())
            .map_err(|e| StoreError::io(self.path, e))?;
        Ok(())
    }

    fn rewrite(&self) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::Builder::new()
            .prefix(".survey-log-")
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(|e| StoreError::io(dir, e))?;
        tmp.write_all(&self.bytes)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| StoreError::io(tmp.path(), e))?;
        tmp.persist(self.path)
            .map_err(|e| StoreError::io(self.path, e.error))?;
        Ok(())
    }
}

/// Append-only CSV log
#[derive(Debug)]
pub struct TabularLog {
    path: PathBuf,
    schema: LogSchema,
    append_lock: Mutex<()>,
}

impl TabularLog {
    /// Log at `path` with the superset schema
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_schema(path, LogSchema::superset())
    }

    /// Log at `path` creating new files with `schema`
    #[must_use]
    pub fn with_schema(path: impl Into<PathBuf>, schema: LogSchema) -> Self {
        Self {
            path: path.into(),
            schema,
            append_lock: Mutex::new(()),
        }
    }

    /// Log file path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Schema used when the file is created
    #[inline]
    #[must_use]
    pub fn schema(&self) -> &LogSchema {
        &self.schema
    }

    /// Header of the existing file, `None` if absent or empty
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read
    pub fn existing_header(&self) -> Result<Option<LogSchema>, StoreError> {
        if self.is_vacant()? {
            return Ok(None);
        }
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)?;
        let columns = reader.headers()?.iter().map(str::to_string).collect();
        Ok(Some(LogSchema::from_columns(columns)))
    }

    /// Encode `record` and take the append lock; nothing is written yet
    ///
    /// A legacy header too narrow for the row is widened: the reservation
    /// then carries the whole file re-encoded under the wider header.
    ///
    /// # Errors
    /// - [`StoreError::SchemaMismatch`] if the existing header is not a log header
    /// - [`StoreError::Io`] / [`StoreError::Csv`] on read or encode failure
    pub fn reserve(&self, record: &SurveyRecord) -> Result<LogReservation<'_>, StoreError> {
        let guard = self.append_lock.lock();
        let row = LogRow::from_record(record);
        let survey_type = record.survey_type();

        let mut bytes = Vec::new();
        let mut mode = CommitMode::Append;
        let schema = match self.existing_header()? {
            Some(schema) if schema.accepts(survey_type) => {
                if !self.ends_with_newline()? {
                    bytes.push(b'\n');
                }
                schema
            }
            Some(schema) if schema.rating_column_count().is_some() => {
                let wider = if self.schema.accepts(survey_type) {
                    self.schema.clone()
                } else {
                    LogSchema::superset()
                };
                tracing::warn!(
                    "Widening log header of {} from {} to {} rating columns",
                    self.path.display(),
                    schema.rating_column_count().unwrap_or_default(),
                    wider.rating_column_count().unwrap_or_default()
                );
                bytes.extend(encode_line(wider.columns())?);
                for existing in self.read_rows()? {
                    bytes.extend(encode_line(&existing.cells(&wider))?);
                }
                mode = CommitMode::Rewrite;
                wider
            }
            Some(schema) => {
                return Err(StoreError::SchemaMismatch {
                    path: self.path.clone(),
                    expected: LogSchema::for_survey(survey_type).columns().to_vec(),
                    found: schema.columns().to_vec(),
                });
            }
            None => {
                bytes.extend(encode_line(self.schema.columns())?);
                self.schema.clone()
            }
        };
        bytes.extend(encode_line(&row.cells(&schema))?);

        Ok(LogReservation {
            path: &self.path,
            bytes,
            mode,
            _guard: guard,
        })
    }

    /// Append one row for `record`
    ///
    /// # Errors
    /// See [`TabularLog::reserve`] and [`LogReservation::commit`]
    pub fn append(&self, record: &SurveyRecord) -> Result<(), StoreError> {
        self.reserve(record)?.commit()
    }

    /// All rows, in file order; the file is opened read-only
    ///
    /// # Errors
    /// Returns error on unreadable files or malformed rating cells
    pub fn read_rows(&self) -> Result<Vec<LogRow>, StoreError> {
        if self.is_vacant()? {
            return Ok(Vec::new());
        }
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)?;
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let line = record.position().map_or(0, csv::Position::line);
            let cell = |name: &str| -> String {
                headers
                    .iter()
                    .position(|h| h == name)
                    .and_then(|i| record.get(i))
                    .unwrap_or_default()
                    .to_string()
            };

            let mut ratings = BTreeMap::new();
            for (i, header) in headers.iter().enumerate() {
                let Ok(id) = header.parse::<QuestionId>() else {
                    continue;
                };
                let raw = record.get(i).unwrap_or_default().trim();
                if raw.is_empty() {
                    continue;
                }
                let value = raw.parse::<u8>().map_err(|_| StoreError::MalformedRow {
                    line,
                    reason: format!("{header} is not a rating: {raw:?}"),
                })?;
                ratings.insert(id, value);
            }

            rows.push(LogRow {
                survey_type: cell("Survey_Type"),
                unique_code: cell("Unique_Code"),
                date: cell("Date"),
                submission_timestamp: cell("Submission_Timestamp"),
                open_ended_response: cell("Open_Ended_Response"),
                ratings,
            });
        }
        Ok(rows)
    }

    /// Number of data rows
    ///
    /// # Errors
    /// See [`TabularLog::read_rows`]
    pub fn row_count(&self) -> Result<usize, StoreError> {
        Ok(self.read_rows()?.len())
    }

    fn is_vacant(&self) -> Result<bool, StoreError> {
        match std::fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len() == 0),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(true),
            Err(e) => Err(StoreError::io(&self.path, e)),
        }
    }

    fn ends_with_newline(&self) -> Result<bool, StoreError> {
        let mut file = std::fs::File::open(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        let mut last = [0u8; 1];
        file.seek(SeekFrom::End(-1))
            .and_then(|_| file.read_exact(&mut last))
            .map_err(|e| StoreError::io(&self.path, e))?;
        Ok(last[0] == b'\n')
    }
}

fn encode_line(cells: &[String]) -> Result<Vec<u8>, StoreError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(cells)?;
    writer
        .into_inner()
        .map_err(|e| StoreError::io(PathBuf::new(), e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use care_core::{LikertRating, Ratings, RespondentCode, SubmissionId};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn record(survey_type: SurveyType, code: &str, text: &str) -> SurveyRecord {
        let date = NaiveDate::from_ymd_opt(2025, 4, 9).unwrap();
        SurveyRecord::new(
            SubmissionId::new(),
            survey_type,
            RespondentCode::parse(code).unwrap(),
            date,
            date.and_hms_micro_opt(14, 30, 0, 250_000).unwrap(),
            Ratings::uniform(survey_type, LikertRating::new(2).unwrap()),
            text.to_string(),
        )
    }

    #[test]
    fn superset_header() {
        let schema = LogSchema::superset();
        assert_eq!(schema.columns().len(), 15);
        assert_eq!(schema.columns().last().unwrap(), "Q10");
        assert!(schema.accepts(SurveyType::Pre));
        assert!(schema.accepts(SurveyType::Post));
    }

    #[test]
    fn legacy_pre_header_only_accepts_pre() {
        let schema = LogSchema::for_survey(SurveyType::Pre);
        assert_eq!(schema.rating_column_count(), Some(7));
        assert!(schema.accepts(SurveyType::Pre));
        assert!(!schema.accepts(SurveyType::Post));
    }

    #[test]
    fn foreign_header_is_rejected() {
        let schema = LogSchema::from_columns(vec!["name".into(), "score".into()]);
        assert_eq!(schema.rating_column_count(), None);
        assert!(!schema.accepts(SurveyType::Pre));

        let gap = LogSchema::from_columns(
            FIXED_COLUMNS
                .iter()
                .map(|c| (*c).to_string())
                .chain(["Q1".to_string(), "Q3".to_string()])
                .collect(),
        );
        assert_eq!(gap.rating_column_count(), None);
    }

    #[test]
    fn pre_row_leaves_trailing_columns_empty() {
        let row = LogRow::from_record(&record(SurveyType::Pre, "MN30", "ok"));
        let cells = row.cells(&LogSchema::superset());
        assert_eq!(&cells[..5], &[
            "Pre-Care Journal Survey",
            "MN30",
            "2025-04-09",
            "2025-04-09T14:30:00.250",
            "ok",
        ]);
        assert_eq!(&cells[5..12], &["2"; 7]);
        assert_eq!(&cells[12..], &["", "", ""]);
    }

    #[test]
    fn creates_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let log = TabularLog::new(dir.path().join("all.csv"));
        log.append(&record(SurveyType::Pre, "A1", "")).unwrap();
        log.append(&record(SurveyType::Post, "B2", "")).unwrap();

        let raw = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(raw.matches("Survey_Type").count(), 1);
        assert_eq!(raw.lines().count(), 3);
        assert_eq!(log.row_count().unwrap(), 2);
    }

    #[test]
    fn quoting_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let log = TabularLog::new(dir.path().join("all.csv"));
        let text = "tools, \"peer\" circles\nand supervision";
        log.append(&record(SurveyType::Post, "MN30", text)).unwrap();

        let rows = log.read_rows().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].open_ended_response, text);
        assert_eq!(rows[0].rating(10), Some(2));
    }

    #[test]
    fn dropped_reservation_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let log = TabularLog::new(dir.path().join("all.csv"));
        {
            let reservation = log.reserve(&record(SurveyType::Pre, "A1", "")).unwrap();
            assert!(!reservation.bytes().is_empty());
        }
        assert!(!log.path().exists());
    }

    #[test]
    fn missing_trailing_newline_is_repaired() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("all.csv");
        let header = LogSchema::superset().columns().join(",");
        std::fs::write(&path, header).unwrap();

        let log = TabularLog::new(&path);
        log.append(&record(SurveyType::Pre, "A1", "")).unwrap();
        let rows = log.read_rows().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].unique_code, "A1");
    }

    #[test]
    fn legacy_header_is_widened_for_wider_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("all.csv");
        let legacy = LogSchema::for_survey(SurveyType::Pre).columns().join(",");
        std::fs::write(&path, format!("{legacy}\n")).unwrap();

        let log = TabularLog::new(&path);
        log.append(&record(SurveyType::Pre, "A1", "first, \"quoted\"")).unwrap();
        assert_eq!(log.existing_header().unwrap().unwrap().rating_column_count(), Some(7));

        let reservation = log.reserve(&record(SurveyType::Post, "B2", "")).unwrap();
        assert_eq!(reservation.mode(), CommitMode::Rewrite);
        reservation.commit().unwrap();

        assert_eq!(log.existing_header().unwrap().unwrap(), LogSchema::superset());
        let rows = log.read_rows().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].unique_code, "A1");
        assert_eq!(rows[0].open_ended_response, "first, \"quoted\"");
        assert_eq!(rows[0].ratings.len(), 7);
        assert_eq!(rows[1].unique_code, "B2");
        assert_eq!(rows[1].rating(10), Some(2));

        let names: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn fitting_legacy_header_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("all.csv");
        let legacy = LogSchema::for_survey(SurveyType::Pre).columns().join(",");
        std::fs::write(&path, format!("{legacy}\n")).unwrap();

        let log = TabularLog::new(&path);
        let reservation = log.reserve(&record(SurveyType::Pre, "A1", "")).unwrap();
        assert_eq!(reservation.mode(), CommitMode::Append);
        reservation.commit().unwrap();
        assert_eq!(
            log.existing_header().unwrap().unwrap(),
            LogSchema::for_survey(SurveyType::Pre)
        );
    }

    #[test]
    fn foreign_header_file_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("all.csv");
        std::fs::write(&path, "name,score\nx,1\n").unwrap();

        let err = TabularLog::new(&path)
            .append(&record(SurveyType::Pre, "A1", ""))
            .unwrap_err();
        assert!(matches!(err, StoreError::SchemaMismatch { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "name,score\nx,1\n");
    }

    #[test]
    fn malformed_rating_cell() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("all.csv");
        let header = LogSchema::for_survey(SurveyType::Pre).columns().join(",");
        std::fs::write(&path, format!("{header}\nPre,A1,2025-01-01,t,,x,1,1,1,1,1,1\n")).unwrap();

        let err = TabularLog::new(&path).read_rows().unwrap_err();
        assert!(matches!(err, StoreError::MalformedRow { line: 2, .. }));
    }
}
