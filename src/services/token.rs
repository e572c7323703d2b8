//! Session token codec
//!
//! Creates and verifies the signed JWT carried in the `token` cookie.
//! Tokens encode {user id, username, issued-at} and are signed with
//! HS256 over a shared secret; validity is determined purely by the
//! signature check, with no server-side state and no revocation list
//! (logout just discards the client-held value).
//!
//! Tokens carry no expiry claim, so a valid token authenticates
//! indefinitely until the secret is rotated; `main` warns about this
//! at startup.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Error types for token operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Signature mismatch or malformed payload
    #[error("invalid token: {0}")]
    Invalid(String),

    /// Signing failed
    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Decoded identity carried by a verified token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthClaims {
    /// User ID
    pub id: i64,
    /// Username at issue time
    pub username: String,
    /// Unix timestamp the token was issued at
    pub iat: i64,
}

/// Wire format of the JWT payload.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: i64,
    username: String,
    iat: i64,
}

/// Codec for issuing and verifying session tokens.
///
/// Construct one per process with the configured secret and share it via
/// the application state; there are no ambient globals.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenCodec {
    /// Create a codec signing with the given shared secret.
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issue a signed token for the given identity.
    pub fn issue(&self, user_id: i64, username: &str) -> Result<String, TokenError> {
        let claims = Claims {
            sub: user_id,
            username: username.to_string(),
            iat: chrono::Utc::now().timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify a token and return the identity it carries.
    ///
    /// Fails if the signature mismatches or the payload is malformed.
    pub fn verify(&self, token: &str) -> Result<AuthClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // No expiry claim is set on issue, so none is required or checked.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| TokenError::Invalid(e.to_string()))?;

        Ok(AuthClaims {
            id: data.claims.sub,
            username: data.claims.username,
            iat: data.claims.iat,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new("test-secret-key")
    }

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let codec = codec();

        let token = codec.issue(42, "alice").expect("Failed to issue token");
        assert!(!token.is_empty());

        let claims = codec.verify(&token).expect("Failed to verify token");
        assert_eq!(claims.id, 42);
        assert_eq!(claims.username, "alice");
        assert!(claims.iat > 0);
    }

    #[test]
    fn test_verify_garbage_fails() {
        let result = codec().verify("not-a-token");
        assert!(matches!(result, Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_verify_wrong_secret_fails() {
        let token = TokenCodec::new("secret-a")
            .issue(1, "alice")
            .expect("Failed to issue token");

        let result = TokenCodec::new("secret-b").verify(&token);
        assert!(matches!(result, Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_verify_tampered_payload_fails() {
        let codec = codec();
        let token = codec.issue(1, "alice").expect("Failed to issue token");

        // Flip a character in the payload segment
        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        assert_eq!(parts.len(), 3);
        let payload = parts[1].clone();
        let flipped = if payload.starts_with('A') { "B" } else { "A" };
        parts[1] = format!("{}{}", flipped, &payload[1..]);
        let tampered = parts.join(".");

        assert!(codec.verify(&tampered).is_err());
    }

    #[test]
    fn test_old_token_still_verifies() {
        // No expiry claim: a token issued long ago stays valid.
        let codec = codec();
        let token = codec.issue(7, "bob").expect("Failed to issue token");

        let claims = codec.verify(&token).expect("Token should verify");
        assert_eq!(claims.id, 7);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(20))]

        #[test]
        fn property_token_roundtrip(
            user_id in 1i64..1_000_000,
            username in "[a-zA-Z0-9_]{1,30}",
        ) {
            let codec = TokenCodec::new("property-test-secret");

            let token = codec.issue(user_id, &username).expect("issue should succeed");
            let claims = codec.verify(&token).expect("verify should succeed");

            prop_assert_eq!(claims.id, user_id);
            prop_assert_eq!(claims.username, username);
        }

        #[test]
        fn property_cross_secret_rejection(
            user_id in 1i64..1000,
            secret_a in "[a-z]{8,20}",
            secret_b in "[A-Z]{8,20}",
        ) {
            let token = TokenCodec::new(&secret_a)
                .issue(user_id, "user")
                .expect("issue should succeed");

            prop_assert!(TokenCodec::new(&secret_b).verify(&token).is_err());
        }
    }
}
