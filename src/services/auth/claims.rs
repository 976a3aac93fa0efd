use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Access token claims.
///
/// - `sub` identifies the authenticated principal and must be non-empty.
/// - `email` is carried for convenience and never validated.
/// - `iss` is a deployment label; it does not select the verification key.
/// - `exp` / `iat` are seconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub iss: String,
    #[serde(default)]
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn subject_id(&self) -> &str {
        &self.sub
    }

    /// Valid-in-time iff `now < exp`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims_expiring_at(exp: i64) -> Claims {
        Claims {
            sub: "42".to_string(),
            email: String::new(),
            iss: "t&f".to_string(),
            iat: exp - 3600,
            exp,
        }
    }

    #[test]
    fn expiry_is_exclusive_of_the_expiry_instant() {
        let now = Utc::now();
        let exp = now.timestamp();

        assert!(claims_expiring_at(exp).is_expired_at(now));
        assert!(claims_expiring_at(exp - 1).is_expired_at(now));
        assert!(!claims_expiring_at(exp + 1).is_expired_at(now));
    }

    #[test]
    fn missing_optional_fields_decode_to_defaults() {
        let claims: Claims = serde_json::from_str(r#"{"sub":"abc","exp":10}"#).unwrap();

        assert_eq!(claims.subject_id(), "abc");
        assert_eq!(claims.email, "");
        assert_eq!(claims.iss, "");
        assert_eq!(claims.exp, 10);
    }
}
