pub mod claims;
pub mod factory;
pub mod jwt;

pub use claims::Claims;
pub use factory::build_token_codec;
pub use jwt::{TokenCodec, TokenError, TokenPolicy};
