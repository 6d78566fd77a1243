// SPDX-FileCopyrightText: 2026 Tutorlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests of the REST surface against an in-process router.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Duration;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use tutorlink_gateway::auth::AuthConfig;
use tutorlink_gateway::build_router;
use tutorlink_gateway::identity::{ACTOR_ID_HEADER, ACTOR_ROLE_HEADER};
use tutorlink_gateway::server::{GatewayState, HealthState};
use tutorlink_test_utils::TestHarness;

const TOKEN: &str = "test-token";

async fn setup() -> (Router, TestHarness) {
    let harness = TestHarness::builder().build().await.unwrap();
    let state = GatewayState {
        manager: harness.manager.clone(),
        relay: harness.relay.clone(),
        auth: AuthConfig {
            bearer_token: Some(TOKEN.to_string()),
        },
        health: HealthState {
            start_time: std::time::Instant::now(),
        },
    };
    (build_router(state), harness)
}

fn request(method: &str, uri: &str, actor: Option<(&str, &str)>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {TOKEN}"));
    if let Some((id, role)) = actor {
        builder = builder
            .header(ACTOR_ID_HEADER, id)
            .header(ACTOR_ROLE_HEADER, role);
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

async fn create(app: &Router, requester: &str, helper: Option<&str>) -> String {
    let mut body = json!({ "topic": "Setting up video calls" });
    if let Some(helper) = helper {
        body["helper_id"] = json!(helper);
    }
    let (status, body) = send(
        app,
        request("POST", "/v1/sessions", Some((requester, "senior")), Some(body)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_needs_no_credentials() {
    let (app, _harness) = setup().await;
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn missing_or_wrong_bearer_is_rejected() {
    let (app, _harness) = setup().await;

    let req = Request::builder()
        .uri("/v1/sessions")
        .header(ACTOR_ID_HEADER, "r1")
        .header(ACTOR_ROLE_HEADER, "senior")
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&app, req).await.0, StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .uri("/v1/sessions")
        .header("authorization", "Bearer nope")
        .header(ACTOR_ID_HEADER, "r1")
        .header(ACTOR_ROLE_HEADER, "senior")
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&app, req).await.0, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_identity_is_unauthenticated() {
    let (app, _harness) = setup().await;
    let (status, body) = send(&app, request("GET", "/v1/sessions", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "unauthenticated");
}

#[tokio::test]
async fn only_seniors_create_sessions() {
    let (app, _harness) = setup().await;
    let (status, body) = send(
        &app,
        request(
            "POST",
            "/v1/sessions",
            Some(("v1", "volunteer")),
            Some(json!({ "topic": "anything" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["kind"], "unauthorized");
}

#[tokio::test]
async fn create_returns_caller_relative_summary() {
    let (app, _harness) = setup().await;
    let (status, body) = send(
        &app,
        request(
            "POST",
            "/v1/sessions",
            Some(("r1", "senior")),
            Some(json!({ "topic": "Email basics", "helper_id": "v1", "duration_minutes": 45 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let session = &body["session"];
    assert_eq!(session["status"], "scheduled");
    assert_eq!(session["counterpart_id"], "v1");
    assert_eq!(session["counterpart_name"], "Vera");
    assert_eq!(session["duration_minutes"], 45);
    assert_eq!(session["can_join"], false);
}

#[tokio::test]
async fn blank_topic_is_a_validation_error() {
    let (app, _harness) = setup().await;
    let (status, body) = send(
        &app,
        request(
            "POST",
            "/v1/sessions",
            Some(("r1", "senior")),
            Some(json!({ "topic": "   " })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "validation");
}

#[tokio::test]
async fn start_twice_conflicts() {
    let (app, _harness) = setup().await;
    let id = create(&app, "r1", Some("v1")).await;
    let uri = format!("/v1/sessions/{id}/transition");

    let (status, body) = send(
        &app,
        request("POST", &uri, Some(("v1", "volunteer")), Some(json!({ "action": "start" }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "in_progress");
    assert_eq!(body["can_join"], true);

    let (status, body) = send(
        &app,
        request("POST", &uri, Some(("v1", "volunteer")), Some(json!({ "action": "start" }))),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "invalid_transition");
}

#[tokio::test]
async fn outsiders_cannot_read_a_session() {
    let (app, _harness) = setup().await;
    let id = create(&app, "r1", Some("v1")).await;
    let uri = format!("/v1/sessions/{id}");

    let (status, _) = send(&app, request("GET", &uri, Some(("r2", "senior")), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, request("GET", &uri, Some(("a1", "admin")), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id.as_str());
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let (app, _harness) = setup().await;
    let (status, body) = send(
        &app,
        request("GET", "/v1/sessions/missing", Some(("a1", "admin")), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
}

#[tokio::test]
async fn invalid_status_filter_is_rejected() {
    let (app, _harness) = setup().await;
    let (status, _) = send(
        &app,
        request("GET", "/v1/sessions?status=paused", Some(("r1", "senior")), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn listing_shows_timed_out_sessions_as_completed() {
    let (app, harness) = setup().await;
    let id = create(&app, "r1", Some("v1")).await;
    let (status, _) = send(
        &app,
        request(
            "POST",
            &format!("/v1/sessions/{id}/transition"),
            Some(("v1", "volunteer")),
            Some(json!({ "action": "start" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    harness.advance(Duration::hours(3));

    let (status, body) = send(
        &app,
        request("GET", "/v1/sessions?status=completed", Some(("r1", "senior")), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["possibly_stale"], false);
    let sessions = body["sessions"].as_array().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["transition_reason"], "auto_completed_timeout");
}

#[tokio::test]
async fn single_read_is_marked_stale_when_cleanup_cannot_write() {
    let (app, harness) = setup().await;
    let id = create(&app, "r1", Some("v1")).await;
    let (status, _) = send(
        &app,
        request(
            "POST",
            &format!("/v1/sessions/{id}/transition"),
            Some(("v1", "volunteer")),
            Some(json!({ "action": "start" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let uri = format!("/v1/sessions/{id}");

    let (_, fresh) = send(&app, request("GET", &uri, Some(("r1", "senior")), None)).await;
    assert_eq!(fresh["possibly_stale"], false);

    harness.advance(Duration::hours(3));
    harness.store.fail_writes(true);
    let (status, body) = send(&app, request("GET", &uri, Some(("r1", "senior")), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");
    assert_eq!(body["can_join"], false);
    assert_eq!(body["possibly_stale"], true);

    harness.store.fail_writes(false);
    let (_, healed) = send(&app, request("GET", &uri, Some(("r1", "senior")), None)).await;
    assert_eq!(healed["status"], "completed");
    assert_eq!(healed["possibly_stale"], false);
}

#[tokio::test]
async fn listing_is_scoped_to_the_caller() {
    let (app, _harness) = setup().await;
    create(&app, "r1", Some("v1")).await;
    create(&app, "r2", None).await;

    let (_, mine) = send(&app, request("GET", "/v1/sessions", Some(("r1", "senior")), None)).await;
    assert_eq!(mine["sessions"].as_array().unwrap().len(), 1);

    let (_, all) = send(&app, request("GET", "/v1/sessions", Some(("a1", "admin")), None)).await;
    assert_eq!(all["sessions"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn sweep_is_admin_only() {
    let (app, harness) = setup().await;
    create(&app, "r1", None).await;
    harness.advance(Duration::hours(4));

    let (status, _) = send(&app, request("POST", "/v1/sweep", Some(("r1", "senior")), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, request("POST", "/v1/sweep", Some(("a1", "admin")), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["examined"], 1);
    assert_eq!(body["cancelled"], 1);
    assert_eq!(body["failed"], 0);
}

#[tokio::test]
async fn signals_publish_and_poll() {
    let (app, _harness) = setup().await;
    let uri = "/v1/sessions/s1/signals";

    let (status, first) = send(
        &app,
        request(
            "POST",
            uri,
            Some(("r1", "senior")),
            Some(json!({ "kind": "offer", "payload": { "sdp": "v=0" } })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let cursor = first["received_at"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        request(
            "POST",
            uri,
            Some(("v1", "volunteer")),
            Some(json!({ "kind": "answer", "payload": { "sdp": "v=0" } })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let (status, body) = send(&app, request("GET", uri, Some(("r1", "senior")), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["signals"].as_array().unwrap().len(), 2);

    let since = cursor.replace('+', "%2B");
    let (status, body) = send(
        &app,
        request("GET", &format!("{uri}?since={since}"), Some(("r1", "senior")), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let signals = body["signals"].as_array().unwrap();
    assert_eq!(signals.len(), 1);
    assert_eq!(signals[0]["kind"], "answer");
}

#[tokio::test]
async fn empty_signal_kind_is_rejected() {
    let (app, _harness) = setup().await;
    let (status, _) = send(
        &app,
        request(
            "POST",
            "/v1/sessions/s1/signals",
            Some(("r1", "senior")),
            Some(json!({ "kind": "" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn signals_on_a_known_session_need_a_participant() {
    let (app, _harness) = setup().await;
    let id = create(&app, "r1", Some("v1")).await;
    let uri = format!("/v1/sessions/{id}/signals");
    let offer = json!({ "kind": "offer", "payload": { "sdp": "v=0" } });

    let (status, body) = send(
        &app,
        request("POST", &uri, Some(("v2", "volunteer")), Some(offer.clone())),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["kind"], "unauthorized");
    let (status, _) = send(&app, request("GET", &uri, Some(("r2", "senior")), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        request("POST", &uri, Some(("v1", "volunteer")), Some(offer)),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let (status, body) = send(&app, request("GET", &uri, Some(("a1", "admin")), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["signals"].as_array().unwrap().len(), 1);
}
