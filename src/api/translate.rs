//! Batch translation endpoint

use axum::extract::State;
use tracing::debug;

use super::state::AppState;
use super::types::{ApiError, Json, TranslateRequest, TranslateResponse};

/// `POST /api/translate`
pub async fn translate(
    State(state): State<AppState>,
    Json(request): Json<TranslateRequest>,
) -> Result<Json<TranslateResponse>, ApiError> {
    debug!(
        segments = request.segments.len(),
        url = %request.url,
        "Translate request"
    );

    let translations = state
        .translation_service
        .translate(request.segments, &request.url)
        .await?;

    Ok(Json(TranslateResponse { translations }))
}
