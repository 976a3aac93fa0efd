/// Factory: build the process-wide `TokenCodec` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::{TokenCodec, TokenError, TokenPolicy};

pub fn build_token_codec(config: &Config) -> Result<Arc<TokenCodec>, TokenError> {
    let policy = TokenPolicy {
        issuer: config.jwt_issuer.clone(),
        ttl: config.jwt_ttl,
    };

    let codec = TokenCodec::new(config.jwt_secret.as_bytes(), policy)?;

    Ok(Arc::new(codec))
}
