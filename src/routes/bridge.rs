use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use crate::bridge::{dispatch_bridge, BridgeMessage, BridgeReply};
use crate::extractors::JsonBody;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(handle))
}

/// Entry point for foreground sessions. The sender is not authenticated.
pub async fn handle(
    State(state): State<AppState>,
    JsonBody(message): JsonBody<BridgeMessage>,
) -> Json<BridgeReply> {
    Json(dispatch_bridge(state.monitor(), message).await)
}
