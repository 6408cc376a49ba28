//! Bearer token issuing and verification.
//!
//! Tokens are HS256 JWTs signed with `ACCESS_TOKEN_SECRET`. Whatever claims
//! the client submits to `POST /jwt` are signed as-is, with `iat` and `exp`
//! stamped by the server. Only the `email` claim is interpreted afterwards.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use fitlife_core::Email;

/// Lifetime of an issued token, in seconds.
pub const TOKEN_TTL_SECS: i64 = 60 * 60;

/// Errors from issuing or verifying tokens.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The token could not be signed.
    #[error("failed to sign token: {0}")]
    Sign(#[source] jsonwebtoken::errors::Error),

    /// Bad signature, malformed, expired, or missing the `email` claim.
    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

/// Decoded token payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Caller identity. Compared byte-for-byte with stored emails.
    pub email: String,
    pub iat: i64,
    pub exp: i64,
    /// Any other submitted claims.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Signs and verifies bearer tokens with one shared secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService").finish_non_exhaustive()
    }
}

impl TokenService {
    /// Create a token service for `secret`.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        // No clock tolerance on `exp`
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            validation,
        }
    }

    /// Sign `claims` with a one hour expiry.
    ///
    /// Submitted `iat`/`exp` values are replaced.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Sign` if encoding fails.
    pub fn issue(&self, mut claims: Map<String, Value>) -> Result<String, TokenError> {
        let iat = Utc::now().timestamp();
        claims.insert("iat".to_owned(), Value::from(iat));
        claims.insert("exp".to_owned(), Value::from(iat + TOKEN_TTL_SECS));

        encode(&Header::default(), &claims, &self.encoding).map_err(TokenError::Sign)
    }

    /// Sign a token carrying only `email`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Sign` if encoding fails.
    pub fn issue_for(&self, email: &Email) -> Result<String, TokenError> {
        let mut claims = Map::new();
        claims.insert("email".to_owned(), Value::String(email.as_str().to_owned()));
        self.issue(claims)
    }

    /// Verify signature and expiry and decode the claims.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` for any verification failure.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(TokenError::Invalid)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;
    use serde_json::json;

    use super::*;

    fn service(secret: &str) -> TokenService {
        TokenService::new(&SecretString::from(secret.to_owned()))
    }

    fn claims(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let tokens = service("kR7#pQ2!vX9@mL4$wN8%zB3^hT6&jF1*");
        let token = tokens
            .issue(claims(json!({ "email": "a@fitlifenow.com", "name": "Ana" })))
            .unwrap();

        let decoded = tokens.verify(&token).unwrap();
        assert_eq!(decoded.email, "a@fitlifenow.com");
        assert_eq!(decoded.extra.get("name"), Some(&json!("Ana")));
        assert_eq!(decoded.exp - decoded.iat, TOKEN_TTL_SECS);
    }

    #[test]
    fn test_submitted_expiry_is_replaced() {
        let tokens = service("kR7#pQ2!vX9@mL4$wN8%zB3^hT6&jF1*");
        let token = tokens
            .issue(claims(json!({ "email": "a@fitlifenow.com", "exp": 1 })))
            .unwrap();
        assert!(tokens.verify(&token).unwrap().exp > Utc::now().timestamp());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let email = Email::parse("a@fitlifenow.com").unwrap();
        let token = service("first-secret-first-secret-first!!")
            .issue_for(&email)
            .unwrap();
        let result = service("second-secret-second-secret-second").verify(&token);
        assert!(matches!(result, Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_expired_token_rejected() {
        let secret = "kR7#pQ2!vX9@mL4$wN8%zB3^hT6&jF1*";
        let past = Utc::now() - Duration::hours(2);
        let token = encode(
            &Header::default(),
            &json!({
                "email": "a@fitlifenow.com",
                "iat": past.timestamp(),
                "exp": past.timestamp() + TOKEN_TTL_SECS,
            }),
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        assert!(service(secret).verify(&token).is_err());
    }

    #[test]
    fn test_just_expired_token_rejected() {
        let secret = "kR7#pQ2!vX9@mL4$wN8%zB3^hT6&jF1*";
        let now = Utc::now().timestamp();
        let token = encode(
            &Header::default(),
            &json!({
                "email": "a@fitlifenow.com",
                "iat": now - TOKEN_TTL_SECS - 5,
                "exp": now - 5,
            }),
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            service(secret).verify(&token),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_token_without_email_rejected() {
        let tokens = service("kR7#pQ2!vX9@mL4$wN8%zB3^hT6&jF1*");
        let token = tokens.issue(claims(json!({ "name": "anonymous" }))).unwrap();
        assert!(tokens.verify(&token).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(service("kR7#pQ2!vX9@mL4$wN8%zB3^hT6&jF1*")
            .verify("not.a.token")
            .is_err());
    }
}
