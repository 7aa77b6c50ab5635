//! Symmetric session-token codec.
//!
//! The application session cookie carries a compact HS*-signed JWT. The wire
//! format is inherited from the original deployment and is a contract, not an
//! internal type: `permissions` travels as a single comma-joined string and is
//! split into a set on decode.

use std::collections::BTreeSet;

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claim granted to every issued session token.
pub const LOGGED_IN_CLAIM: &str = "read_loggedIn";

#[derive(Debug, Error)]
pub enum CodecError {
    /// Only the HMAC family is valid for the session-token domain.
    #[error("unsupported session token algorithm: {0:?}")]
    UnsupportedAlgorithm(Algorithm),
    /// Signature mismatch, malformed structure, algorithm mismatch or
    /// (when enforced) expiry. Callers must not surface the detail.
    #[error("invalid token")]
    Invalid(#[source] jsonwebtoken::errors::Error),
    #[error("failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// Decoded payload of an application session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub user_id: String,
    /// Subject identifier; mirrors `user_id` on the wire.
    pub sub: String,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
    /// Comma-joined claim strings (wire contract).
    pub permissions: String,
}

impl SessionClaims {
    /// Build claims for a login request. `exp`/`iat` are placeholders until
    /// [`TokenCodec::issue`] stamps them.
    pub fn new(user_id: &str, username: &str, permissions: &[String]) -> Self {
        Self {
            user_id: user_id.to_string(),
            sub: user_id.to_string(),
            username: username.to_string(),
            iat: 0,
            exp: 0,
            permissions: permissions.join(","),
        }
    }

    /// The held claim set, split out of the wire encoding.
    pub fn permission_set(&self) -> BTreeSet<String> {
        self.permissions
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Issues and validates symmetric session tokens.
///
/// Expiry enforcement is a policy of the codec (`enforce_expiry`), not of the
/// token: diagnostics and tests may decode past-expiry tokens by overriding it.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    enforce_expiry: bool,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key material stays out of logs.
        f.debug_struct("TokenCodec")
            .field("algorithm", &self.algorithm)
            .field("enforce_expiry", &self.enforce_expiry)
            .finish()
    }
}

impl TokenCodec {
    pub fn new(
        secret: &str,
        algorithm: Algorithm,
        enforce_expiry: bool,
    ) -> Result<Self, CodecError> {
        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(CodecError::UnsupportedAlgorithm(algorithm));
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            algorithm,
            enforce_expiry,
        })
    }

    /// Serialize and sign `claims`, stamping `iat` = now and `exp` = now + ttl.
    pub fn issue(&self, claims: &SessionClaims, ttl: Duration) -> Result<String, CodecError> {
        let now = Utc::now();
        let mut claims = claims.clone();
        claims.iat = now.timestamp();
        claims.exp = (now + ttl).timestamp();

        jsonwebtoken::encode(&Header::new(self.algorithm), &claims, &self.encoding)
            .map_err(CodecError::Signing)
    }

    /// Verify signature and structure under the codec's expiry policy.
    pub fn decode(&self, token: &str) -> Result<SessionClaims, CodecError> {
        self.decode_with_expiry(token, self.enforce_expiry)
    }

    /// Verify signature and structure, overriding expiry enforcement.
    pub fn decode_with_expiry(
        &self,
        token: &str,
        enforce_expiry: bool,
    ) -> Result<SessionClaims, CodecError> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_aud = false;
        validation.validate_exp = enforce_expiry;
        if !enforce_expiry {
            validation.required_spec_claims.remove("exp");
        }

        jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(CodecError::Invalid)
    }
}
