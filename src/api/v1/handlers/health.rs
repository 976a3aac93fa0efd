/*
 * Responsibility
 * - GET /health (疎通用, 認証なし)
 * - GET /ready (DB 疎通込み, 認証なし)
 */
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::error::AppError;
use crate::state::AppState;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

/// GET /ready: DB まで疎通できるか確認する。失敗はログに残して 500。
pub async fn ready(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    sqlx::query("SELECT 1")
        .execute(&state.db)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "readiness check failed");
            AppError::Internal
        })?;

    Ok((StatusCode::OK, Json(json!({"status": "ready"}))))
}
