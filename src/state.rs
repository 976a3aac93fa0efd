/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - db: PgPool, auth: TokenCodec
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::auth::TokenCodec;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub auth: Arc<TokenCodec>,
}

impl AppState {
    pub fn new(db: sqlx::PgPool, auth: Arc<TokenCodec>) -> Self {
        Self { db, auth }
    }
}
