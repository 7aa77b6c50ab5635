/*
 * Responsibility
 * - Load environment configuration (bind address, signing secret, base URLs,
 *   mail/storage settings)
 * - Validate configuration (startup fails on missing/invalid values)
 */
use std::net::SocketAddr;
use std::str::FromStr;

use jsonwebtoken::Algorithm;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    /// Public base URL of this app, used for login links and IdP issuer URLs.
    pub public_base_url: String,
    /// Base URL of the storage origin backing presigned login-link fetches.
    pub storage_base_url: String,

    pub session_secret: String,
    pub session_algorithm: Algorithm,
    pub enforce_expiry: bool,

    pub idp_audience: String,

    pub resend_api_key: Option<String>,
    pub mail_from: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let public_base_url = std::env::var("APP_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}", port))
            .trim_end_matches('/')
            .to_string();

        let storage_base_url = std::env::var("STORAGE_BASE_URL")
            .unwrap_or_else(|_| public_base_url.clone())
            .trim_end_matches('/')
            .to_string();

        // A baked-in secret is acceptable for local demos only.
        let session_secret = match std::env::var("SECRET_KEY") {
            Ok(secret) if !secret.is_empty() => secret,
            _ if app_env.is_production() => return Err(ConfigError::Missing("SECRET_KEY")),
            _ => "your_super_secret_key".to_string(),
        };

        let session_algorithm = match std::env::var("ALGORITHM")
            .unwrap_or_else(|_| "HS256".to_string())
            .as_str()
        {
            "HS256" => Algorithm::HS256,
            "HS384" => Algorithm::HS384,
            "HS512" => Algorithm::HS512,
            _ => return Err(ConfigError::Invalid("ALGORITHM")),
        };

        let enforce_expiry = std::env::var("SESSION_ENFORCE_EXPIRY")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(true);

        let idp_audience =
            std::env::var("MOCK_IDP_AUDIENCE").unwrap_or_else(|_| "my-keycloak-client".to_string());

        let resend_api_key = std::env::var("RESEND_API_KEY").ok().filter(|k| !k.is_empty());

        let mail_from = std::env::var("MAIL_FROM")
            .unwrap_or_else(|_| "welcome@jwt-experience.localhost".to_string());

        Ok(Self {
            addr,
            app_env,
            public_base_url,
            storage_base_url,
            session_secret,
            session_algorithm,
            enforce_expiry,
            idp_audience,
            resend_api_key,
            mail_from,
        })
    }

    /// Fixed configuration for tests: no env access, no mail credentials.
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            app_env: AppEnv::Development,
            public_base_url: base_url.trim_end_matches('/').to_string(),
            storage_base_url: base_url.trim_end_matches('/').to_string(),
            session_secret: "test-secret".to_string(),
            session_algorithm: Algorithm::HS256,
            enforce_expiry: true,
            idp_audience: "my-keycloak-client".to_string(),
            resend_api_key: None,
            mail_from: "welcome@jwt-experience.localhost".to_string(),
        }
    }
}
