use super::*;

use crate::state::test_helpers::test_app_state;

#[tokio::test]
async fn healthz_is_ok() {
    assert_eq!(healthz().await, StatusCode::OK);
}

#[tokio::test]
async fn router_builds_without_route_conflicts() {
    let router = app(test_app_state());
    assert!(router.has_routes());
}
