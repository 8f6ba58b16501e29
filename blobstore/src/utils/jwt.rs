use crate::error::AppError;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Identity handed to the file routes by the bearer-token middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
}

pub fn encode(secret: &str, claims: &Claims) -> Result<String, AppError> {
    jsonwebtoken::encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Unauthorized(e.to_string()))
}

pub fn decode(secret: &str, token: &str) -> Result<Claims, AppError> {
    Ok(jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| AppError::Unauthorized(e.to_string()))?
    .claims)
}

pub fn gen_token(lifetime_secs: i64, secret: &str, name: &str) -> Result<String, AppError> {
    let claims = Claims {
        sub: name.to_string(),
        exp: (Utc::now() + Duration::seconds(lifetime_secs)).timestamp(),
    };
    encode(secret, &claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip() {
        let token = gen_token(60, "secret", "alice").unwrap();
        let claims = decode("secret", &token).unwrap();
        assert_eq!(claims.sub, "alice");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = gen_token(60, "secret", "alice").unwrap();
        assert!(matches!(decode("other", &token), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = gen_token(-3600, "secret", "alice").unwrap();
        assert!(matches!(decode("secret", &token), Err(AppError::Unauthorized(_))));
    }
}
