/*
 * Responsibility
 * - GET /me (認証必須)
 * - middleware → extractor の配線確認用に、検証済みの subject をそのまま返す
 */
use axum::{Json, response::IntoResponse};
use serde_json::json;

use crate::api::v1::extractors::AuthCtxExtractor;

pub async fn me(AuthCtxExtractor(ctx): AuthCtxExtractor) -> impl IntoResponse {
    Json(json!({ "user_id": ctx.user_id }))
}
