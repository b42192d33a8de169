//! Submission lifecycle
//!
//! One submission moves through
//! `Idle -> Validating -> {Rejected | Building} -> WritingFile -> WritingLog -> Done`.
//! `Rejected`, `Failed` and `Done` all lead back to `Idle` so the form stays usable.

use serde::{Deserialize, Serialize};

use crate::error::LifecycleError;

/// State of the current submission attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SubmissionState {
    /// Form open, nothing in flight
    #[default]
    Idle,
    /// Checking the required field
    Validating,
    /// Validation failed; no I/O was performed
    Rejected,
    /// Assembling the record
    Building,
    /// Writing the individual record file
    WritingFile,
    /// Appending the shared log row
    WritingLog,
    /// Both artifacts written
    Done,
    /// An I/O step failed; remaining steps were skipped
    Failed,
}

impl SubmissionState {
    /// Whether this attempt has finished, successfully or not
    #[inline]
    #[must_use]
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Rejected | Self::Done | Self::Failed)
    }
}

/// States reachable from `from` in one step
#[must_use]
pub fn allowed_transitions(from: SubmissionState) -> Vec<SubmissionState> {
    use SubmissionState::*;
    match from {
        Idle => vec![Validating],
        Validating => vec![Rejected, Building],
        Rejected => vec![Idle],
        Building => vec![WritingFile],
        WritingFile => vec![WritingLog, Failed],
        WritingLog => vec![Done, Failed],
        Done => vec![Idle],
        Failed => vec![Idle],
    }
}

/// Validate a single transition
///
/// # Errors
/// Returns [`LifecycleError::IllegalTransition`] when `to` is not reachable from `from`
pub fn validate_transition(
    from: SubmissionState,
    to: SubmissionState,
) -> Result<(), LifecycleError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(LifecycleError::IllegalTransition { from, to })
    }
}

/// Tracks the state of one form's submissions and the path taken
#[derive(Debug, Clone, Default)]
pub struct SubmissionTracker {
    state: SubmissionState,
    history: Vec<SubmissionState>,
}

impl SubmissionTracker {
    /// New tracker in `Idle`
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    #[inline]
    #[must_use]
    pub fn state(&self) -> SubmissionState {
        self.state
    }

    /// States visited by the current attempt, excluding the starting `Idle`
    #[inline]
    #[must_use]
    pub fn history(&self) -> &[SubmissionState] {
        &self.history
    }

    /// Move to `to`
    ///
    /// # Errors
    /// Returns error on an illegal transition; the state is left unchanged
    pub fn advance(&mut self, to: SubmissionState) -> Result<(), LifecycleError> {
        validate_transition(self.state, to)?;
        if to == SubmissionState::Idle {
            self.history.clear();
        } else {
            self.history.push(to);
        }
        self.state = to;
        Ok(())
    }

    /// Return to `Idle` from a settled state; no-op when already idle
    ///
    /// # Errors
    /// Returns error if an attempt is still in flight
    pub fn reset(&mut self) -> Result<(), LifecycleError> {
        if self.state == SubmissionState::Idle {
            return Ok(());
        }
        self.advance(SubmissionState::Idle)
    }
}
