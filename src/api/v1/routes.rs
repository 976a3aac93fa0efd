/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - 公開ルートと認証必須ルートを分け、後者にだけ access middleware を掛ける
 */
use std::sync::Arc;

use axum::{Router, routing::get};

use crate::api::v1::handlers::{health::health, me::me};
use crate::middleware::auth::access;
use crate::services::auth::TokenCodec;

pub fn routes<S>(auth: Arc<TokenCodec>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let public = Router::new().route("/health", get(health));

    let protected = access::apply(Router::new().route("/me", get(me)), auth);

    public.merge(protected)
}
