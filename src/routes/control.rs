use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::bridge::{dispatch_control, ControlMessage, ControlReply};
use crate::extractors::JsonBody;
use crate::monitor::MirrorStatus;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/control", post(handle))
        .route("/status", get(status))
}

pub async fn handle(
    State(state): State<AppState>,
    JsonBody(message): JsonBody<ControlMessage>,
) -> Json<ControlReply> {
    Json(dispatch_control(state.monitor(), message).await)
}

pub async fn status(State(state): State<AppState>) -> Json<MirrorStatus> {
    Json(state.monitor().get_status().await)
}
