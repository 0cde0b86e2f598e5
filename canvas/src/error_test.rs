use super::*;

#[test]
fn only_network_failures_are_retryable() {
    assert!(CanvasError::Network("timeout".into()).is_retryable());
    assert!(!CanvasError::Unauthorized.is_retryable());
    assert!(!CanvasError::Forbidden("board 1".into()).is_retryable());
    assert!(!CanvasError::NotFound("note 2".into()).is_retryable());
    assert!(!CanvasError::Validation("bad".into()).is_retryable());
}

#[test]
fn unauthorized_requires_login() {
    assert!(CanvasError::Unauthorized.requires_login());
    assert!(!CanvasError::Forbidden(String::new()).requires_login());
}

#[test]
fn error_codes_are_distinct() {
    let errors = [
        CanvasError::Unauthorized,
        CanvasError::Forbidden(String::new()),
        CanvasError::NotFound(String::new()),
        CanvasError::Validation(String::new()),
        CanvasError::Network(String::new()),
    ];
    let mut codes: Vec<&str> = errors.iter().map(ErrorCode::error_code).collect();
    codes.sort_unstable();
    codes.dedup();
    assert_eq!(codes.len(), errors.len());
}

#[test]
fn display_carries_detail() {
    let err = CanvasError::Forbidden("board 7 is not yours".into());
    assert_eq!(err.to_string(), "permission denied: board 7 is not yours");
    assert_eq!(CanvasError::Unauthorized.to_string(), "not signed in");
}
