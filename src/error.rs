/*
 * Responsibility
 * - App-wide AppError definition
 * - IntoResponse mapping (HTML pages for the browser app, JSON for the IdP
 *   protocol surface)
 */
use axum::{
    Json,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::api::views;

#[derive(Debug, Error)]
pub enum AppError {
    /// No valid session at a gated route.
    #[error("unauthenticated")]
    Unauthenticated,

    /// Valid session, missing claim. The diagnostic fields are safe to show:
    /// they contain no key material and only the caller's own claims.
    #[error("missing required claim: {required}")]
    Forbidden {
        required: String,
        permissions: Vec<String>,
        subject: String,
    },

    /// Unknown or already-consumed authorization code.
    #[error("invalid_grant")]
    InvalidGrant,

    /// Operator-supplied form input (claim JSON, redirect URI) could not be
    /// parsed.
    #[error("malformed claims: {0}")]
    MalformedClaims(String),

    /// Browser form input failed validation.
    #[error("invalid form input: {0}")]
    InvalidForm(&'static str),

    /// Programmer error (e.g. a claim template placeholder with no matching
    /// path parameter). Logged; never explained to the client.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The presigned login link was refused by the storage origin.
    #[error("invalid or expired login link")]
    LinkRejected,

    /// The storage origin could not be reached.
    #[error("error contacting storage")]
    StoreUnavailable,

    /// Object storage refused a write during login-token upload.
    #[error("failed to store login token")]
    Store(#[from] crate::services::object_store::StoreError),

    /// The mail provider rejected or failed to deliver the login email.
    #[error("failed to send login email")]
    Mail(#[from] crate::services::mailer::MailError),

    #[error("internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, Html(views::unauthorized_page())).into_response()
            }
            AppError::Forbidden {
                required,
                permissions,
                subject,
            } => (
                StatusCode::FORBIDDEN,
                Html(views::forbidden_page(&required, &permissions, &subject)),
            )
                .into_response(),
            AppError::InvalidGrant => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": "invalid_grant" })))
                    .into_response()
            }
            AppError::MalformedClaims(message) => {
                (StatusCode::BAD_REQUEST, format!("malformed claims: {message}"))
                    .into_response()
            }
            AppError::InvalidForm(message) => {
                (StatusCode::BAD_REQUEST, format!("invalid form input: {message}"))
                    .into_response()
            }
            AppError::Configuration(message) => {
                error!(%message, "configuration error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
            AppError::LinkRejected => {
                (StatusCode::FORBIDDEN, "invalid or expired login link").into_response()
            }
            AppError::StoreUnavailable => {
                (StatusCode::BAD_GATEWAY, "error contacting storage").into_response()
            }
            AppError::Store(err) => {
                error!(error = %err, "login token upload failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "failed to store login token").into_response()
            }
            AppError::Mail(err) => {
                error!(error = %err, "login email failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "failed to send login email").into_response()
            }
            AppError::Internal => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
        }
    }
}
