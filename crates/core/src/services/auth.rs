//! Bearer token verification.
//!
//! Tokens are HS256 JWTs minted by the external identity provider. The `sub`
//! claim is the provider's stable user id and maps to `user.external_auth_id`.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use menlog_common::{AppError, AppResult, config::AuthConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Claims menlog reads from an identity token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Stable external user id.
    pub sub: String,
    /// Expiry (seconds since the epoch).
    pub exp: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Avatar URL.
    #[serde(default)]
    pub picture: Option<String>,
}

/// Verifies identity tokens against the configured secret.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Create a verifier from auth configuration.
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }
        match &config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Self {
            key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Verify a token and return its claims.
    pub fn verify(&self, token: &str) -> AppResult<IdentityClaims> {
        decode::<IdentityClaims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "Rejected identity token");
                AppError::Unauthorized
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::json;

    fn auth_config(issuer: Option<&str>) -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            issuer: issuer.map(str::to_string),
            audience: None,
        }
    }

    fn future_exp() -> u64 {
        (chrono::Utc::now().timestamp() + 3600) as u64
    }

    fn sign(claims: &serde_json::Value, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_verify_valid_token() {
        let verifier = TokenVerifier::new(&auth_config(None));
        let token = sign(
            &json!({"sub": "auth0|abc", "exp": future_exp(), "name": "麺太郎"}),
            "test-secret",
        );

        let claims = verifier.verify(&token).unwrap();

        assert_eq!(claims.sub, "auth0|abc");
        assert_eq!(claims.name.as_deref(), Some("麺太郎"));
        assert!(claims.email.is_none());
    }

    #[test]
    fn test_verify_wrong_secret() {
        let verifier = TokenVerifier::new(&auth_config(None));
        let token = sign(&json!({"sub": "x", "exp": future_exp()}), "other-secret");

        assert!(matches!(verifier.verify(&token), Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_verify_expired() {
        let verifier = TokenVerifier::new(&auth_config(None));
        let token = sign(&json!({"sub": "x", "exp": 1_000_000}), "test-secret");

        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn test_verify_issuer() {
        let verifier = TokenVerifier::new(&auth_config(Some("https://id.example")));
        let wrong = sign(
            &json!({"sub": "x", "exp": future_exp(), "iss": "https://evil.example"}),
            "test-secret",
        );
        let right = sign(
            &json!({"sub": "x", "exp": future_exp(), "iss": "https://id.example"}),
            "test-secret",
        );

        assert!(verifier.verify(&wrong).is_err());
        assert!(verifier.verify(&right).is_ok());
    }
}
