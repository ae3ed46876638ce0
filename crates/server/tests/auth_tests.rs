//! Integration tests for credential gating, the stealth blocklist, and the
//! unknown-route fallback.

mod common;

use axum::http::StatusCode;
use common::*;
use tower::ServiceExt;

#[tokio::test]
async fn missing_or_wrong_token_is_unauthorized() {
    let app = app();

    let response = app
        .clone()
        .oneshot(request("POST", "/heartbeat?uid=A&part=P1", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(request("GET", "/count", Some("not-the-secret")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "unauthorized");

    // validation never runs before auth: bad params still get a 401
    let response = app
        .oneshot(request("POST", "/heartbeat", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn scopes_do_not_cross() {
    let app = app();

    let response = app
        .clone()
        .oneshot(request("GET", "/count", Some(CLIENT_TOKEN)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(request("POST", "/heartbeat?uid=A&part=P1", Some(ADMIN_TOKEN)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn blocklisted_origin_gets_an_empty_success() {
    let app = app();

    // no token at all
    let response = app
        .clone()
        .oneshot(request_from(
            "POST",
            "/heartbeat?uid=A&part=P1",
            None,
            BLOCKED_IP,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.is_empty());

    // even a valid admin credential changes nothing
    let response = app
        .clone()
        .oneshot(request_from("GET", "/count", Some(ADMIN_TOKEN), BLOCKED_IP))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.is_empty());

    // and the blocked heartbeat was never recorded
    let response = app
        .oneshot(request("GET", "/count", Some(ADMIN_TOKEN)))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["active"], 0);
}

#[tokio::test]
async fn unconfigured_secret_fails_closed() {
    let mut config = test_config();
    config.client_secret = None;
    let app = app_with(config);

    let response = app
        .oneshot(request(
            "POST",
            "/heartbeat?uid=A&part=P1",
            Some(CLIENT_TOKEN),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["error"], "server credentials not configured");
}

#[tokio::test]
async fn unknown_path_and_wrong_method_are_bad_requests() {
    let app = app();

    let response = app
        .clone()
        .oneshot(request("GET", "/nope", Some(ADMIN_TOKEN)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // wrong method on a real path folds into the same 400
    let response = app
        .clone()
        .oneshot(request("GET", "/heartbeat?uid=A&part=P1", Some(CLIENT_TOKEN)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(request("POST", "/count", Some(ADMIN_TOKEN)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn responses_are_marked_non_cacheable() {
    let app = app();

    let response = app
        .clone()
        .oneshot(request("GET", "/count", Some(ADMIN_TOKEN)))
        .await
        .unwrap();
    assert_eq!(response.headers()["cache-control"], "no-store");

    // the fallback carries the header too
    let response = app
        .oneshot(request("GET", "/nope", None))
        .await
        .unwrap();
    assert_eq!(response.headers()["cache-control"], "no-store");
}
