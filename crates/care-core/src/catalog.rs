//! Question catalog
//!
//! Static survey content: the pre/post statement lists, the open-ended prompt
//! for each survey type, and the five-point Likert scale.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CollectorError;

/// Survey title shown above the form
pub const SURVEY_TITLE: &str = "THE CARE JOURNAL LIKERT-SCALE SURVEY";

/// Intended audience line
pub const SURVEY_AUDIENCE: &str = "To be answered by Community Health Visitor";

const PRE_QUESTIONS: [&str; 7] = [
    "I feel confident facilitating reflective discussions with caregivers.",
    "I am comfortable helping caregivers explore their emotions.",
    "I regularly reflect on my own emotional responses to my work.",
    "I have strategies to manage secondary stress or fatigue.",
    "I feel supported by my team in practicing trauma-informed care.",
    "I believe a caregiver journal could support reflective work with families.",
    "I feel that reflective practice benefits both caregivers and practitioners.",
];

const POST_QUESTIONS: [&str; 10] = [
    "The journal supported caregivers' reflection and emotional awareness.",
    "It helped structured or deepen my reflective discussions with caregivers.",
    "Most caregivers were open to using the journal.",
    "Using the journal did not significantly add to my workload.",
    "The journal helped me stay attuned and reflective during visits.",
    "I observed improvements in caregiver-child interactions over time.",
    "Using the journal enhanced my sense of meaning and satisfaction in my work.",
    "I would continue using the journal with future families.",
    "Supporting caregivers through reflective work sometimes leaves me emotionally drained.",
    "Using the journal reminded me of the importance of caring for my own well-being.",
];

const PRE_OPEN_PROMPT: &str =
    "What supports or tools currently help you most in facilitating reflection with caregivers?";

const POST_OPEN_PROMPT: &str =
    "One thing that worked well or could be improved about the journal:";

/// Which questionnaire is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SurveyType {
    /// Before the respondent starts using the Care Journal
    #[serde(rename = "Pre-Care Journal Survey")]
    Pre,
    /// After the respondent has used the Care Journal
    #[serde(rename = "Post-Care Journal Survey")]
    Post,
}

impl SurveyType {
    /// All survey types, in display order
    pub const ALL: [SurveyType; 2] = [SurveyType::Pre, SurveyType::Post];

    /// Display label, also used in persisted artifacts
    #[inline]
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SurveyType::Pre => "Pre-Care Journal Survey",
            SurveyType::Post => "Post-Care Journal Survey",
        }
    }

    /// Likert statements for this survey, in order
    #[inline]
    #[must_use]
    pub fn questions(self) -> &'static [&'static str] {
        match self {
            SurveyType::Pre => &PRE_QUESTIONS,
            SurveyType::Post => &POST_QUESTIONS,
        }
    }

    /// Open-ended prompt for this survey
    #[inline]
    #[must_use]
    pub fn open_prompt(self) -> &'static str {
        match self {
            SurveyType::Pre => PRE_OPEN_PROMPT,
            SurveyType::Post => POST_OPEN_PROMPT,
        }
    }

    /// Number of rating questions
    #[inline]
    #[must_use]
    pub fn question_count(self) -> usize {
        self.questions().len()
    }

    /// Question identifiers `Q1..QN`
    pub fn question_ids(self) -> impl Iterator<Item = QuestionId> {
        (1..=self.question_count()).map(|n| QuestionId(n as u8))
    }

    /// Check whether `id` belongs to this survey's catalog
    #[inline]
    #[must_use]
    pub fn contains(self, id: QuestionId) -> bool {
        id.0 >= 1 && usize::from(id.0) <= self.question_count()
    }
}

impl fmt::Display for SurveyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SurveyType {
    type Err = CollectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        SurveyType::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(needle))
            .or_else(|| match needle.to_ascii_lowercase().as_str() {
                "pre" => Some(SurveyType::Pre),
                "post" => Some(SurveyType::Post),
                _ => None,
            })
            .ok_or_else(|| CollectorError::UnknownSurveyType(needle.to_string()))
    }
}

/// Largest question count across all catalogs
#[must_use]
pub fn max_question_count() -> usize {
    SurveyType::ALL
        .into_iter()
        .map(SurveyType::question_count)
        .max()
        .unwrap_or(0)
}

/// 1-based question identifier, rendered as `Q1`, `Q2`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QuestionId(u8);

impl QuestionId {
    /// Create from a 1-based index
    ///
    /// # Errors
    /// Returns error for index 0
    pub fn new(index: u8) -> Result<Self, CollectorError> {
        if index == 0 {
            return Err(CollectorError::InvalidQuestionId(index.to_string()));
        }
        Ok(Self(index))
    }

    /// 1-based index
    #[inline]
    #[must_use]
    pub fn index(self) -> u8 {
        self.0
    }

    /// Column / map key, e.g. `Q3`
    #[must_use]
    pub fn key(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.0)
    }
}

impl FromStr for QuestionId {
    type Err = CollectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix('Q')
            .or_else(|| s.strip_prefix('q'))
            .and_then(|n| n.parse::<u8>().ok())
            .filter(|n| *n > 0)
            .map(Self)
            .ok_or_else(|| CollectorError::InvalidQuestionId(s.to_string()))
    }
}

impl Serialize for QuestionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for QuestionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A single Likert answer in `1..=5`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct LikertRating(u8);

impl LikertRating {
    /// Lowest scale point
    pub const MIN: u8 = 1;
    /// Highest scale point
    pub const MAX: u8 = 5;
    /// Value a rating control reports when the respondent never touched it
    /// (the first option).
    pub const DEFAULT: LikertRating = LikertRating(1);

    const LABELS: [&'static str; 5] = [
        "Strongly Disagree",
        "Disagree",
        "Neutral",
        "Agree",
        "Strongly Agree",
    ];

    /// Create a rating
    ///
    /// # Errors
    /// Returns error if `value` is outside `1..=5`
    pub fn new(value: u8) -> Result<Self, CollectorError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(CollectorError::RatingOutOfRange(value))
        }
    }

    /// Numeric value
    #[inline]
    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    /// Scale label, e.g. `Neutral`
    #[inline]
    #[must_use]
    pub fn label(self) -> &'static str {
        Self::LABELS[usize::from(self.0 - 1)]
    }

    /// Every scale point, lowest first
    pub fn scale() -> impl Iterator<Item = LikertRating> {
        (Self::MIN..=Self::MAX).map(LikertRating)
    }
}

impl Default for LikertRating {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u8> for LikertRating {
    type Error = CollectorError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LikertRating> for u8 {
    fn from(rating: LikertRating) -> Self {
        rating.0
    }
}

impl fmt::Display for LikertRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.0, self.label())
    }
}

/// Read-only view over the question catalog
#[derive(Debug, Clone, Copy, Default)]
pub struct Catalog;

impl Catalog {
    /// Numbered statements of a survey
    pub fn entries(survey_type: SurveyType) -> impl Iterator<Item = (QuestionId, &'static str)> {
        survey_type.question_ids().zip(survey_type.questions().iter().copied())
    }
}
