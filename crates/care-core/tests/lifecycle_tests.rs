use care_core::lifecycle::{allowed_transitions, validate_transition};
use care_core::{SubmissionState, SubmissionTracker};
use proptest::prelude::*;

#[test]
fn test_idle_transitions() {
    assert!(validate_transition(SubmissionState::Idle, SubmissionState::Validating).is_ok());

    assert!(validate_transition(SubmissionState::Idle, SubmissionState::Building).is_err());
    assert!(validate_transition(SubmissionState::Idle, SubmissionState::Done).is_err());
}

#[test]
fn test_settled_states_return_to_idle() {
    for settled in [
        SubmissionState::Rejected,
        SubmissionState::Done,
        SubmissionState::Failed,
    ] {
        assert_eq!(allowed_transitions(settled), vec![SubmissionState::Idle]);
        assert!(settled.is_settled());
    }
}

#[test]
fn test_log_write_requires_file_write() {
    let mut tracker = SubmissionTracker::new();
    tracker.advance(SubmissionState::Validating).unwrap();
    tracker.advance(SubmissionState::Building).unwrap();

    assert!(tracker.advance(SubmissionState::WritingLog).is_err());
    assert_eq!(tracker.state(), SubmissionState::Building);
}

fn any_state() -> impl Strategy<Value = SubmissionState> {
    prop_oneof![
        Just(SubmissionState::Idle),
        Just(SubmissionState::Validating),
        Just(SubmissionState::Rejected),
        Just(SubmissionState::Building),
        Just(SubmissionState::WritingFile),
        Just(SubmissionState::WritingLog),
        Just(SubmissionState::Done),
        Just(SubmissionState::Failed),
    ]
}

proptest! {
    #[test]
    fn prop_all_transitions_are_subset_of_allowed(from in any_state(), to in any_state()) {
        let res = validate_transition(from, to);
        let allowed = allowed_transitions(from);

        if res.is_ok() {
            prop_assert!(allowed.contains(&to));
        } else {
            prop_assert!(!allowed.contains(&to));
        }
    }

    #[test]
    fn prop_tracker_never_lands_in_illegal_state(steps in proptest::collection::vec(any_state(), 0..20)) {
        let mut tracker = SubmissionTracker::new();
        for to in steps {
            let before = tracker.state();
            match tracker.advance(to) {
                Ok(()) => prop_assert_eq!(tracker.state(), to),
                Err(_) => prop_assert_eq!(tracker.state(), before),
            }
        }
    }
}
