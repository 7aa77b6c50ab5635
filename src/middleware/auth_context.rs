//! Session-cookie decoding → AuthContext in request extensions.
//!
//! Runs on every request before any handler. A missing or invalid cookie is
//! not an error here: the request continues anonymously and enforcement is
//! left to the per-route claim gate.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::services::token_codec::SessionClaims;
use crate::state::AppState;

/// Cookie carrying the application session token.
pub const AUTH_COOKIE: &str = "auth_token";

/// Decoded authentication state of the current request.
#[derive(Clone, Debug, Default)]
pub struct AuthContext {
    claims: Option<SessionClaims>,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self { claims: None }
    }

    pub fn authenticated(claims: SessionClaims) -> Self {
        Self { claims: Some(claims) }
    }

    pub fn claims(&self) -> Option<&SessionClaims> {
        self.claims.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.claims.is_some()
    }
}

pub async fn attach(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let ctx = match jar.get(AUTH_COOKIE) {
        None => AuthContext::anonymous(),
        Some(cookie) => match state.codec.decode(cookie.value()) {
            Ok(claims) => AuthContext::authenticated(claims),
            Err(err) => {
                // Bad token: treat as unauthenticated, never tell the client why.
                tracing::debug!(error = %err, "rejecting session cookie");
                AuthContext::anonymous()
            }
        },
    };

    req.extensions_mut().insert(ctx);
    next.run(req).await
}
