mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::app::spawn_test_app;
use common::http::{get_json, post_json};

#[tokio::test]
async fn it_initial_status_is_dormant() {
    let app = spawn_test_app().await;

    let (status, body) = post_json(&app.app, "/api/control", json!({"action": "getStatus"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"isMonitoring": false, "currentScore": 50.0, "plantState": "dormant"})
    );
}

#[tokio::test]
async fn it_start_and_stop_monitoring() {
    let app = spawn_test_app().await;

    let (_, ack) = post_json(&app.app, "/api/control", json!({"action": "startMonitoring"})).await;
    assert_eq!(ack, json!({"success": true}));

    let (_, body) = get_json(&app.app, "/api/status").await;
    assert_eq!(body["isMonitoring"], true);
    assert_eq!(body["plantState"], "growing");

    post_json(&app.app, "/api/control", json!({"action": "stopMonitoring"})).await;
    let (_, body) = get_json(&app.app, "/api/status").await;
    assert_eq!(body["isMonitoring"], false);
    assert_eq!(body["currentScore"], 50.0);
    assert_eq!(body["plantState"], "dormant");
}

#[tokio::test]
async fn it_update_score_is_clamped() {
    let app = spawn_test_app().await;

    post_json(&app.app, "/api/control", json!({"action": "startMonitoring"})).await;
    let (_, ack) = post_json(
        &app.app,
        "/api/control",
        json!({"action": "updateScore", "score": 250}),
    )
    .await;
    assert_eq!(ack["success"], true);

    let (_, body) = get_json(&app.app, "/api/status").await;
    assert_eq!(body["currentScore"], 100.0);
}

#[tokio::test]
async fn it_drift_moves_score_only_without_live_feed() {
    let app = spawn_test_app().await;
    let monitor = app.state.monitor();

    post_json(&app.app, "/api/control", json!({"action": "startMonitoring"})).await;
    post_json(
        &app.app,
        "/api/bridge",
        json!({
            "action": "updatePosture",
            "data": {"postureScore": 64, "cervicalAngle": 158.0, "isPersonDetected": true}
        }),
    )
    .await;

    app.clock.advance_secs(5);
    monitor.drift_tick().await;
    let (_, body) = get_json(&app.app, "/api/status").await;
    assert_eq!(body["currentScore"], 64.0);

    app.clock.advance_secs(20);
    monitor.drift_tick().await;
    let (_, body) = get_json(&app.app, "/api/status").await;
    let score = body["currentScore"].as_f64().unwrap();
    assert!((0.0..=100.0).contains(&score));
    assert!((score - 64.0).abs() <= app.config.drift.step);
}
