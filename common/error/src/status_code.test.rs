use super::*;
use strum::IntoEnumIterator;

#[test]
fn test_status_code_values_unique() {
    let mut seen = std::collections::HashSet::new();
    for code in StatusCode::iter() {
        assert!(seen.insert(code as i32), "duplicate value for {code:?}");
    }
}

#[test]
fn test_success_is_not_retryable() {
    let meta = StatusCode::Success.meta();
    assert!(!meta.retryable);
    assert!(!meta.log_error);
    assert_eq!(meta.category, StatusCategory::Success);
}

#[test]
fn test_execution_codes_classified() {
    for code in [
        StatusCode::SpawnFailed,
        StatusCode::ProcessFailed,
        StatusCode::Timeout,
        StatusCode::Cancelled,
    ] {
        assert_eq!(code.meta().category, StatusCategory::Execution);
    }
}

#[test]
fn test_process_failed_retryable() {
    // A non-zero exit may succeed on a different backend; fallback relies on this.
    assert!(StatusCode::ProcessFailed.meta().retryable);
    assert!(!StatusCode::SpawnFailed.meta().retryable);
}

#[test]
fn test_name_round_trip() {
    assert_eq!(StatusCode::NoViableCandidate.name(), "NoViableCandidate");
    assert_eq!(StatusCode::from_repr(4_000), Some(StatusCode::SpawnFailed));
}
