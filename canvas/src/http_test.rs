use super::*;

#[test]
fn status_mapping_covers_taxonomy() {
    assert_eq!(status_error(401, ""), CanvasError::Unauthorized);
    assert!(matches!(status_error(403, ""), CanvasError::Forbidden(_)));
    assert!(matches!(status_error(404, ""), CanvasError::NotFound(_)));
    assert!(matches!(status_error(400, ""), CanvasError::Validation(_)));
    assert!(matches!(status_error(409, ""), CanvasError::Validation(_)));
    assert!(matches!(status_error(422, ""), CanvasError::Validation(_)));
    assert!(matches!(status_error(500, ""), CanvasError::Network(_)));
    assert!(matches!(status_error(502, ""), CanvasError::Network(_)));
}

#[test]
fn server_error_message_is_used_as_detail() {
    let body = r#"{"code":"E_BOARD_NOT_OWNED","message":"board 4 is not yours"}"#;
    assert_eq!(status_error(403, body), CanvasError::Forbidden("board 4 is not yours".into()));
}

#[test]
fn plain_body_is_kept_and_empty_body_names_status() {
    assert_eq!(status_error(500, "boom"), CanvasError::Network("boom".into()));
    assert_eq!(status_error(503, ""), CanvasError::Network("HTTP 503".into()));
}

#[test]
fn malformed_success_body_is_network_error() {
    let err = parse_body::<Vec<Board>>("<html>").unwrap_err();
    assert!(err.is_retryable());
}

#[test]
fn board_list_parses_server_shape() {
    let boards: Vec<Board> =
        parse_body(r##"[{"id":1,"title":"Ideas","background":"#fef3c7","orderIndex":0}]"##).unwrap();
    assert_eq!(boards[0].order_index, 0);
}

#[test]
fn identity_ignores_extra_fields() {
    let user: UserIdentity = parse_body(r##"{"id":3,"email":"a@b.c","name":null,"color":"#fff"}"##).unwrap();
    assert_eq!(user.id, 3);
    assert_eq!(user.name, None);
}

#[test]
fn new_client_starts_signed_out() {
    let client = HttpPersistenceClient::new("http://localhost:3000/").unwrap();
    assert!(client.current_user().is_none());
    assert_eq!(client.url("/api/boards"), "http://localhost:3000/api/boards");
}

#[tokio::test]
async fn unreachable_server_is_network_error() {
    let client = HttpPersistenceClient::new("http://127.0.0.1:9").unwrap();
    let err = client.list_boards().await.unwrap_err();
    assert!(err.is_retryable());
}
