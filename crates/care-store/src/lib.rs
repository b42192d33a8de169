//! CARE Store - submission persistence
//!
//! Every accepted submission becomes:
//! - [`RecordWriter`]: one indented JSON file, named from the respondent code,
//!   the submission second and a unique id suffix
//! - [`TabularLog`]: one appended row in the shared CSV log
//!
//! [`SurveyStore`] ties both together and drives the form's submission
//! lifecycle.
//!
//! # Example
//!
//! ```rust,ignore
//! use care_core::{FormSession, SurveyType};
//! use care_store::{StoreConfig, SurveyStore};
//!
//! let store = SurveyStore::open(StoreConfig::new().with_output_dir("responses"))?;
//! let mut form = FormSession::new(SurveyType::Pre, chrono::Local::now().date_naive());
//! form.set_respondent_code("MN30");
//!
//! let receipt = store.submit_now(&mut form)?;
//! println!("{}", receipt.confirmation());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod branding;
mod config;
mod error;
mod naming;
mod record_file;
mod store;
mod tabular;

// Re-exports
pub use branding::BrandingAsset;
pub use config::{StoreConfig, DEFAULT_LOGO_PATH, DEFAULT_LOG_FILE_NAME, DEFAULT_RECORD_PREFIX};
pub use error::StoreError;
pub use naming::{record_file_name, sanitize_code, RECORD_EXTENSION};
pub use record_file::{EncodedRecord, RecordWriter};
pub use store::{SubmissionReceipt, SurveyStore};
pub use tabular::{CommitMode, LogReservation, LogRow, LogSchema, TabularLog, FIXED_COLUMNS};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
