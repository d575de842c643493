//! Token Service
//!
//! JWT signing and validation (HS256). The claims payload is
//! caller-supplied; this service only stamps the expiry and issued-at
//! fields and verifies signatures on the way back in.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::AuthConfig;
use crate::shared::error::{AuthError, Result};

/// Signed claims: an arbitrary payload plus the standard timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(flatten)]
    pub payload: serde_json::Map<String, serde_json::Value>,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// JWT issue/verify service.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expiry_secs: i64,
    refresh_token_expiry_secs: i64,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_token_expiry_secs: config.access_token_expiry_secs,
            refresh_token_expiry_secs: config.refresh_token_expiry_secs,
        }
    }

    /// Sign the payload as a short-lived access token.
    pub fn create_access_token(
        &self,
        payload: serde_json::Map<String, serde_json::Value>,
    ) -> Result<String> {
        self.sign(payload, self.access_token_expiry_secs)
    }

    /// Sign the payload as a long-lived refresh token.
    pub fn create_refresh_token(
        &self,
        payload: serde_json::Map<String, serde_json::Value>,
    ) -> Result<String> {
        self.sign(payload, self.refresh_token_expiry_secs)
    }

    fn sign(
        &self,
        payload: serde_json::Map<String, serde_json::Value>,
        expiry_secs: i64,
    ) -> Result<String> {
        let now = Utc::now();
        let claims = TokenClaims {
            payload,
            exp: (now + Duration::seconds(expiry_secs)).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::internal(format!("Failed to sign token: {}", e)))
    }

    /// Verify a token and return its decoded claims.
    pub fn validate(&self, token: &str) -> Result<TokenClaims> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken {
                    message: e.to_string(),
                },
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(&AuthConfig {
            jwt_secret: "test-secret".to_string(),
            ..AuthConfig::default()
        })
    }

    fn payload(phone: &str) -> serde_json::Map<String, serde_json::Value> {
        let mut map = serde_json::Map::new();
        map.insert("phone".to_string(), serde_json::json!(phone));
        map.insert("user_type".to_string(), serde_json::json!("login"));
        map
    }

    #[test]
    fn test_round_trip() {
        let service = service();
        let token = service.create_access_token(payload("08123456789")).unwrap();

        let claims = service.validate(&token).unwrap();
        assert_eq!(claims.payload.get("phone"), Some(&serde_json::json!("08123456789")));
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let service = service();
        let token = service.create_access_token(payload("08123456789")).unwrap();

        let mut tampered = token.clone();
        tampered.pop();
        tampered.push(if token.ends_with('A') { 'B' } else { 'A' });

        match service.validate(&tampered) {
            Err(AuthError::InvalidToken { .. }) => {}
            other => panic!("Expected InvalidToken, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = service().create_access_token(payload("08123456789")).unwrap();

        let other = TokenService::new(&AuthConfig {
            jwt_secret: "other-secret".to_string(),
            ..AuthConfig::default()
        });

        assert!(other.validate(&token).is_err());
    }

    #[test]
    fn test_refresh_token_outlives_access_token() {
        let service = service();
        let access = service.create_access_token(payload("p")).unwrap();
        let refresh = service.create_refresh_token(payload("p")).unwrap();

        let access_claims = service.validate(&access).unwrap();
        let refresh_claims = service.validate(&refresh).unwrap();
        assert!(refresh_claims.exp > access_claims.exp);
    }
}
