//! HS256 access-token codec.
//!
//! - 発行: subject/email/issuer/exp を claims に詰めて共有鍵で署名
//! - 検証: 構造 → header → alg 固定 (HS256) → 署名 → claims decode → exp の順に確認
//!
//! This module never logs. Callers decide how failures surface.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use thiserror::Error;

use super::claims::Claims;

pub const DEFAULT_ISSUER: &str = "t&f";
pub const DEFAULT_TTL_SECONDS: i64 = 60 * 60;

// The only algorithm this service signs with or accepts.
const ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    Signing(String),
    #[error("malformed token: {0}")]
    MalformedToken(String),
    #[error("token signature is invalid")]
    SignatureInvalid,
    #[error("token expired")]
    Expired,
    #[error("token claims could not be decoded: {0}")]
    ClaimsDecode(String),
}

/// Issuance parameters that used to be hardcoded: issuer label and lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPolicy {
    pub issuer: String,
    pub ttl: Duration,
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self {
            issuer: DEFAULT_ISSUER.to_string(),
            ttl: Duration::seconds(DEFAULT_TTL_SECONDS),
        }
    }
}

pub fn issue_token(
    subject_id: &str,
    email: &str,
    secret: &[u8],
    policy: &TokenPolicy,
) -> Result<String, TokenError> {
    issue_token_at(subject_id, email, secret, policy, Utc::now())
}

/// Same as [`issue_token`], with the issuance instant supplied by the caller.
pub fn issue_token_at(
    subject_id: &str,
    email: &str,
    secret: &[u8],
    policy: &TokenPolicy,
    now: DateTime<Utc>,
) -> Result<String, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::Signing("empty signing secret".to_string()));
    }
    if subject_id.trim().is_empty() {
        return Err(TokenError::Signing("empty subject".to_string()));
    }

    let expires_at = now
        .checked_add_signed(policy.ttl)
        .ok_or_else(|| TokenError::Signing("token lifetime out of range".to_string()))?;

    let claims = Claims {
        sub: subject_id.to_string(),
        email: email.to_string(),
        iss: policy.issuer.clone(),
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
    };

    let mut header = Header::new(ALGORITHM);
    header.typ = Some("JWT".to_string());

    jsonwebtoken::encode(&header, &claims, &EncodingKey::from_secret(secret))
        .map_err(|e| TokenError::Signing(e.to_string()))
}

/// Validate against the current time. The clock is read exactly once.
pub fn validate_token(token: &str, secret: &[u8]) -> Result<Claims, TokenError> {
    validate_token_at(token, secret, Utc::now())
}

pub fn validate_token_at(
    token: &str,
    secret: &[u8],
    now: DateTime<Utc>,
) -> Result<Claims, TokenError> {
    let segments = token.split('.').collect::<Vec<_>>();
    if segments.len() != 3 || segments.iter().any(|s| s.is_empty()) {
        return Err(TokenError::MalformedToken(
            "expected three dot-separated segments".to_string(),
        ));
    }

    let header = jsonwebtoken::decode_header(token)
        .map_err(|e| TokenError::MalformedToken(format!("invalid header: {e}")))?;

    // alg pinning: never let the token pick its own verification algorithm
    if header.alg != ALGORITHM {
        return Err(TokenError::MalformedToken(format!(
            "unsupported algorithm {:?}",
            header.alg
        )));
    }

    // An empty key can never have produced a signature we issued.
    if secret.is_empty() {
        return Err(TokenError::SignatureInvalid);
    }

    // A signature segment that is not canonical base64url cannot match any MAC.
    if URL_SAFE_NO_PAD.decode(segments[2]).is_err() {
        return Err(TokenError::SignatureInvalid);
    }

    // exp is checked below against the caller's clock, not jsonwebtoken's.
    let mut validation = Validation::new(ALGORITHM);
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.set_required_spec_claims(&["exp", "sub"]);

    // HMAC verification goes through aws-lc's constant-time compare.
    let claims =
        jsonwebtoken::decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation)
            .map(|data| data.claims)
            .map_err(classify)?;

    if claims.sub.trim().is_empty() {
        return Err(TokenError::ClaimsDecode("empty 'sub' claim".to_string()));
    }

    if claims.is_expired_at(now) {
        return Err(TokenError::Expired);
    }

    Ok(claims)
}

// Header, alg and signature encoding were already checked, so whatever fails
// after the MAC comparison is a payload problem.
fn classify(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
        ErrorKind::InvalidToken | ErrorKind::InvalidAlgorithm => {
            TokenError::MalformedToken(err.to_string())
        }
        _ => TokenError::ClaimsDecode(err.to_string()),
    }
}

/// Process-wide codec: the signing secret and policy fixed at startup.
#[derive(Clone)]
pub struct TokenCodec {
    secret: Vec<u8>,
    policy: TokenPolicy,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenCodec")
            .field("policy", &self.policy)
            .finish()
    }
}

impl TokenCodec {
    pub fn new(secret: impl Into<Vec<u8>>, policy: TokenPolicy) -> Result<Self, TokenError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(TokenError::Signing("empty signing secret".to_string()));
        }
        Ok(Self { secret, policy })
    }

    pub fn issue(&self, subject_id: &str, email: &str) -> Result<String, TokenError> {
        issue_token(subject_id, email, &self.secret, &self.policy)
    }

    pub fn issue_at(
        &self,
        subject_id: &str,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        issue_token_at(subject_id, email, &self.secret, &self.policy, now)
    }

    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        validate_token(token, &self.secret)
    }
}
