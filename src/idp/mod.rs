//! In-process mock OpenID Connect provider.
//!
//! Implements just enough of the authorization-code flow to exercise the
//! session middleware end to end: discovery, an interactive claim-selection
//! form in place of a credential check, single-use code exchange, and a JWKS
//! endpoint backed by a startup-generated RSA key.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use chrono::Utc;
use serde_json::{Map, Value, json};

use crate::error::AppError;
use crate::state::AppState;

pub mod handlers;
pub mod keys;
pub mod personas;
pub mod store;
mod views;

use keys::IdpKeys;
use store::CodeStore;

/// ID tokens are valid for one hour, mirroring the advertised `expires_in`.
pub const ID_TOKEN_TTL_SECS: i64 = 3600;

/// Fixed opaque access token returned alongside every ID token.
pub const ACCESS_TOKEN: &str = "mock-access-token";

#[derive(Clone, Debug)]
pub struct MockIdp {
    keys: Arc<IdpKeys>,
    codes: CodeStore,
    audience: String,
}

impl MockIdp {
    pub fn new(audience: impl Into<String>) -> Result<Self, keys::KeyError> {
        Ok(Self {
            keys: Arc::new(IdpKeys::generate()?),
            codes: CodeStore::new(),
            audience: audience.into(),
        })
    }

    pub fn codes(&self) -> &CodeStore {
        &self.codes
    }

    pub fn jwks(&self) -> Value {
        json!({ "keys": [self.keys.public_jwk()] })
    }

    /// Build and sign an ID token for the stored claim set. The chosen claims
    /// are layered over the standard envelope, so a form-supplied `sub` or
    /// `aud` wins over the defaults. Returns the compact JWT together with
    /// the exact payload that was signed.
    pub fn sign_id_token(
        &self,
        issuer: &str,
        stored: &Map<String, Value>,
    ) -> Result<(String, Map<String, Value>), AppError> {
        let now = Utc::now().timestamp();

        let mut payload = Map::new();
        payload.insert("iss".into(), json!(issuer));
        payload.insert("aud".into(), json!(self.audience));
        payload.insert("iat".into(), json!(now));
        payload.insert("exp".into(), json!(now + ID_TOKEN_TTL_SECS));
        payload.insert("sub".into(), json!("user-default"));
        for (key, value) in stored {
            payload.insert(key.clone(), value.clone());
        }

        let token = self
            .keys
            .sign(&payload)
            .map_err(|e| AppError::Configuration(format!("id token signing failed: {e}")))?;
        Ok((token, payload))
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::dashboard))
        .route("/jwks", get(handlers::jwks))
        .route("/persona-template", get(handlers::persona_template))
        .route(
            "/{mode}/.well-known/openid-configuration",
            get(handlers::discovery),
        )
        .route("/{mode}/oidc/authorize", get(handlers::authorize))
        .route("/{mode}/oidc/login-callback", post(handlers::login_callback))
        .route("/{mode}/oidc/token", post(handlers::token))
        .route("/{mode}/oidc/callback-preview", get(handlers::callback_preview))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn id_token_envelope_defaults_and_overrides() {
        let idp = MockIdp::new("my-keycloak-client").unwrap();

        let (_, payload) = idp.sign_id_token("https://issuer.test/idp/oidc", &Map::new()).unwrap();
        assert_eq!(payload["iss"], "https://issuer.test/idp/oidc");
        assert_eq!(payload["aud"], "my-keycloak-client");
        assert_eq!(payload["sub"], "user-default");
        assert_eq!(
            payload["exp"].as_i64().unwrap() - payload["iat"].as_i64().unwrap(),
            ID_TOKEN_TTL_SECS
        );

        let stored = personas::template("admin");
        let (_, payload) = idp.sign_id_token("https://issuer.test/idp/oidc", &stored).unwrap();
        assert_eq!(payload["sub"], "admin-999");
        assert_eq!(payload["is_internal"], true);
    }
}
