//! access token（HS256 JWT）検証 → AuthCtx を extensions に入れる
//!
//! - `Authorization: Bearer <jwt>` を受け取る（`Bearer ` は省略可）
//! - 検証は TokenCodec に任せ、ここでは失敗をレスポンスに写すだけ
//! - 期限切れだけは区別して返す。それ以外の理由はクライアントに出さない（ログのみ）

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};
use thiserror::Error;

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::{TokenCodec, TokenError};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no bearer token supplied")]
    MissingToken,
    #[error(transparent)]
    Token(#[from] TokenError),
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Token(TokenError::Expired) => AppError::TokenExpired,
            AuthError::MissingToken | AuthError::Token(_) => AppError::Unauthorized,
        }
    }
}

/// 認証が必要なルートに middleware を掛ける。
///
/// `route_layer` なので、未定義パスは 401 ではなく 404 のまま。
///
/// ```ignore
/// let protected = Router::new().route("/me", get(me));
/// let protected = middleware::auth::access::apply(protected, state.auth.clone());
/// ```
pub fn apply<S>(router: Router<S>, codec: Arc<TokenCodec>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.route_layer(middleware::from_fn_with_state(codec, access_middleware))
}

/// Pull the token out of `Authorization`. A missing `Bearer ` prefix is tolerated.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let raw = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .unwrap_or_default();

    let token = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }

    Ok(token)
}

pub fn authenticate(headers: &HeaderMap, codec: &TokenCodec) -> Result<AuthCtx, AuthError> {
    let token = bearer_token(headers)?;
    let claims = codec.validate(token)?;

    Ok(AuthCtx::new(claims.sub))
}

async fn access_middleware(
    State(codec): State<Arc<TokenCodec>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_ctx = match authenticate(req.headers(), &codec) {
        Ok(ctx) => ctx,
        Err(err) => {
            tracing::warn!(
                error = %err,
                path = %req.uri().path(),
                "access token rejected"
            );
            return Err(err.into());
        }
    };

    tracing::debug!(user_id = %auth_ctx.user_id, "request authenticated");

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(auth_ctx);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderValue, StatusCode};
    use axum::{Json, routing::get};
    use chrono::{Duration, Utc};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::api::v1::extractors::AuthCtxExtractor;
    use crate::services::auth::TokenPolicy;

    fn codec() -> Arc<TokenCodec> {
        Arc::new(TokenCodec::new("gate-test-secret", TokenPolicy::default()).unwrap())
    }

    async fn whoami(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<Value> {
        Json(json!({ "user_id": ctx.user_id }))
    }

    fn app(codec: Arc<TokenCodec>) -> Router {
        apply(Router::new().route("/whoami", get(whoami)), codec)
    }

    async fn call(codec: Arc<TokenCodec>, authorization: Option<&str>) -> (StatusCode, Value) {
        let mut req = Request::builder().uri("/whoami");
        if let Some(value) = authorization {
            req = req.header(header::AUTHORIZATION, value);
        }

        let resp = app(codec)
            .oneshot(req.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn generic_unauthorized() -> Value {
        json!({ "error": { "code": "UNAUTHORIZED", "message": "unauthorized" } })
    }

    #[tokio::test]
    async fn missing_header_is_generic_unauthorized() {
        let (status, body) = call(codec(), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, generic_unauthorized());
    }

    #[tokio::test]
    async fn empty_header_is_generic_unauthorized() {
        for value in ["", "Bearer ", "   "] {
            let (status, body) = call(codec(), Some(value)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{value:?}");
            assert_eq!(body, generic_unauthorized());
        }
    }

    #[tokio::test]
    async fn expired_token_is_reported_distinctly() {
        let codec = codec();
        let token = codec
            .issue_at("user-9", "", Utc::now() - Duration::hours(2))
            .unwrap();

        let (status, body) = call(codec, Some(format!("Bearer {token}").as_str())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body,
            json!({ "error": { "code": "TOKEN_EXPIRED", "message": "token expired" } })
        );
        assert_ne!(body, generic_unauthorized());
    }

    #[tokio::test]
    async fn garbage_token_is_generic_unauthorized() {
        let (status, body) = call(codec(), Some("Bearer not-a-token")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, generic_unauthorized());
    }

    #[tokio::test]
    async fn token_from_another_secret_is_generic_unauthorized() {
        let other = TokenCodec::new("some-other-secret", TokenPolicy::default()).unwrap();
        let token = other.issue("user-9", "").unwrap();

        let (status, body) = call(codec(), Some(format!("Bearer {token}").as_str())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, generic_unauthorized());
    }

    #[tokio::test]
    async fn valid_token_reaches_handler_with_subject() {
        let codec = codec();
        let sub = uuid::Uuid::new_v4().to_string();
        let token = codec.issue(&sub, "user@example.com").unwrap();

        let (status, body) = call(codec, Some(format!("Bearer {token}").as_str())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "user_id": sub }));
    }

    #[tokio::test]
    async fn raw_token_without_prefix_is_accepted() {
        let codec = codec();
        let token = codec.issue("user-raw", "").unwrap();

        let (status, body) = call(codec, Some(token.as_str())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user_id"], "user-raw");
    }

    #[tokio::test]
    async fn unknown_route_is_not_gated() {
        let resp = app(codec())
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn bearer_prefix_is_optional() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("abc.def.ghi"));
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");

        headers.remove(header::AUTHORIZATION);
        assert!(matches!(bearer_token(&headers), Err(AuthError::MissingToken)));
    }

    #[test]
    fn only_expiry_maps_to_token_expired() {
        assert!(matches!(
            AppError::from(AuthError::Token(TokenError::Expired)),
            AppError::TokenExpired
        ));
        for err in [
            AuthError::MissingToken,
            AuthError::Token(TokenError::SignatureInvalid),
            AuthError::Token(TokenError::MalformedToken("x".into())),
            AuthError::Token(TokenError::ClaimsDecode("x".into())),
        ] {
            assert!(matches!(AppError::from(err), AppError::Unauthorized));
        }
    }

    #[test]
    fn authenticate_returns_subject() {
        let codec = codec();
        let token = codec.issue("user-1", "").unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );

        assert_eq!(authenticate(&headers, &codec).unwrap(), AuthCtx::new("user-1"));
    }
}
