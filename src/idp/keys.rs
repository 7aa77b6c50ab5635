//! Process-lifetime RSA signing keys for the mock IdP.
//!
//! One 2048-bit key pair is generated at startup and never rotated or
//! persisted. The private half feeds an RS256 `EncodingKey`; the public half
//! is published as a JWK so relying parties can verify issued ID tokens.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use rand::rngs::OsRng;
use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

/// Key identifier published in JWKS and stamped into every token header.
pub const KEY_ID: &str = "mock-idp-key-id";

const KEY_BITS: usize = 2048;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("rsa key generation failed: {0}")]
    Generate(String),
    #[error("failed to sign identity token")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

pub struct IdpKeys {
    encoding: EncodingKey,
    public_jwk: Value,
}

impl std::fmt::Debug for IdpKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Private key material stays out of Debug output.
        f.debug_struct("IdpKeys").field("kid", &KEY_ID).finish()
    }
}

impl IdpKeys {
    pub fn generate() -> Result<Self, KeyError> {
        let mut rng = OsRng;
        let private_key = RsaPrivateKey::new(&mut rng, KEY_BITS)
            .map_err(|e| KeyError::Generate(e.to_string()))?;
        let public_key = RsaPublicKey::from(&private_key);

        let private_pem = private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| KeyError::Generate(e.to_string()))?;
        let encoding = EncodingKey::from_rsa_pem(private_pem.as_bytes())
            .map_err(|e| KeyError::Generate(e.to_string()))?;

        let public_jwk = json!({
            "kty": "RSA",
            "use": "sig",
            "alg": "RS256",
            "kid": KEY_ID,
            "n": URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be()),
            "e": URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be()),
        });

        Ok(Self { encoding, public_jwk })
    }

    /// Sign `claims` as an RS256 compact JWT with the published `kid`.
    pub fn sign<T: Serialize>(&self, claims: &T) -> Result<String, KeyError> {
        let mut header = Header::new(Algorithm::RS256);
        header.typ = Some("JWT".to_string());
        header.kid = Some(KEY_ID.to_string());

        jsonwebtoken::encode(&header, claims, &self.encoding).map_err(KeyError::Signing)
    }

    /// Public key in JWK form. Never includes private parameters.
    pub fn public_jwk(&self) -> &Value {
        &self.public_jwk
    }
}
