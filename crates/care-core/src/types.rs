//! Core identifier types
//!
//! - Submission identifiers (ULID, sortable by creation time)
//! - Respondent codes (self-chosen pseudonyms, required on submit)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

use crate::error::ValidationError;

/// Unique submission identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(pub Ulid);

impl SubmissionId {
    /// Generate new submission ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Short lower-case suffix used to disambiguate file names
    #[must_use]
    pub fn short_suffix(&self) -> String {
        let full = self.0.to_string();
        full[full.len() - 8..].to_ascii_lowercase()
    }
}

impl Default for SubmissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pseudonymous respondent code, e.g. `MN30`
///
/// Never empty; surrounding whitespace is trimmed. Uniqueness and format are
/// not checked: the same code is expected on a respondent's pre and post
/// submissions.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RespondentCode(String);

impl RespondentCode {
    /// Parse a user-entered code
    ///
    /// # Errors
    /// Returns [`ValidationError::MissingRespondentCode`] for empty or whitespace-only input
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::MissingRespondentCode);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Code as entered (trimmed)
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RespondentCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RespondentCode> for String {
    fn from(code: RespondentCode) -> Self {
        code.0
    }
}

impl FromStr for RespondentCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RespondentCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_rejects_blank() {
        assert_eq!(
            RespondentCode::parse(""),
            Err(ValidationError::MissingRespondentCode)
        );
        assert_eq!(
            RespondentCode::parse(" \t\n"),
            Err(ValidationError::MissingRespondentCode)
        );
    }

    #[test]
    fn code_is_trimmed() {
        assert_eq!(RespondentCode::parse("  MN30 ").unwrap().as_str(), "MN30");
    }

    #[test]
    fn code_deserialize_validates() {
        assert!(serde_json::from_str::<RespondentCode>("\"  \"").is_err());
        let code: RespondentCode = serde_json::from_str("\"AB12\"").unwrap();
        assert_eq!(code.to_string(), "AB12");
    }

    #[test]
    fn submission_ids_are_unique() {
        let a = SubmissionId::new();
        let b = SubmissionId::new();
        assert_ne!(a, b);
        assert_eq!(a.short_suffix().len(), 8);
        assert_eq!(a.short_suffix(), a.short_suffix().to_ascii_lowercase());
    }
}
