/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - extensions は型で引くので、この型自体が固定のキーになる
 * - JWT の検証ロジックは middleware/services 側の責務
 */

/// 認証済みのリクエストに付与されるコンテキスト
///
/// `user_id` は token の `sub` をそのまま保持する (一意性は発行側の責任)。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCtx {
    pub user_id: String,
}

impl AuthCtx {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}
