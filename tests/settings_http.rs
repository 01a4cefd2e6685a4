mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::app::spawn_test_app;
use common::http::{assert_json_error, assert_status_ok_json, get_json, request, response_json};

#[tokio::test]
async fn it_settings_default_after_migration() {
    let app = spawn_test_app().await;

    let (status, body) = get_json(&app.app, "/api/settings").await;
    assert_status_ok_json(status, &body);
    assert_eq!(
        body["data"],
        json!({
            "voiceEnabled": true,
            "voiceType": "female",
            "notifications": true,
            "autoStart": true,
            "updateInterval": 5
        })
    );
}

#[tokio::test]
async fn it_settings_round_trip_through_put() {
    let app = spawn_test_app().await;
    let updated = json!({
        "voiceEnabled": false,
        "voiceType": "male",
        "notifications": false,
        "autoStart": true,
        "updateInterval": 10
    });

    let response = request(
        &app.app,
        Method::PUT,
        "/api/settings",
        Some(updated.clone()),
        &[],
    )
    .await;
    let (status, _, body) = response_json(response).await;
    assert_status_ok_json(status, &body);

    let (_, body) = get_json(&app.app, "/api/settings").await;
    assert_eq!(body["data"], updated);
}

#[tokio::test]
async fn it_settings_reject_bad_interval() {
    let app = spawn_test_app().await;

    let response = request(
        &app.app,
        Method::PUT,
        "/api/settings",
        Some(json!({
            "voiceEnabled": true,
            "voiceType": "female",
            "notifications": true,
            "autoStart": true,
            "updateInterval": 0
        })),
        &[],
    )
    .await;
    let (status, _, body) = response_json(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "VALIDATION_ERROR");
}

#[tokio::test]
async fn it_stats_start_empty() {
    let app = spawn_test_app().await;

    let (status, body) = get_json(&app.app, "/api/stats").await;
    assert_status_ok_json(status, &body);
    assert_eq!(body["data"]["totalSessions"], 0);
    assert_eq!(body["data"]["bestScore"], 0);
}

#[tokio::test]
async fn it_last_posture_missing_then_present() {
    let app = spawn_test_app().await;

    let (status, body) = get_json(&app.app, "/api/posture/last").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_json_error(&body, "NOT_FOUND");

    app.state
        .monitor()
        .update_posture(&neuralstride::bridge::PostureReport {
            posture_score: 55.0,
            cervical_angle: 149.5,
            is_person_detected: true,
        })
        .await;

    let (status, body) = get_json(&app.app, "/api/posture/last").await;
    assert_status_ok_json(status, &body);
    assert_eq!(body["data"]["angle"], 149.5);
}
