use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use crate::extractors::JsonBody;
use crate::response::{ok, AppError};
use crate::state::AppState;
use crate::store::operations::settings::Settings;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/settings", get(get_settings).put(put_settings))
        .route("/stats", get(get_stats))
        .route("/posture/last", get(get_last_posture))
}

pub async fn get_settings(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.store().get_settings()?))
}

/// Replaces the stored preferences wholesale.
pub async fn put_settings(
    State(state): State<AppState>,
    JsonBody(settings): JsonBody<Settings>,
) -> Result<impl IntoResponse, AppError> {
    state.store().save_settings(&settings)?;
    tracing::info!(
        voice_enabled = settings.voice_enabled,
        notifications = settings.notifications,
        "Settings updated"
    );
    Ok(ok(settings))
}

pub async fn get_stats(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.store().get_stats()?))
}

pub async fn get_last_posture(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    match state.store().get_last_posture()? {
        Some(snapshot) => Ok(ok(snapshot)),
        None => Err(AppError::not_found("No posture reading received yet")),
    }
}
