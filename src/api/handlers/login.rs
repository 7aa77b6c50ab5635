/*
 * Responsibility
 * - Login-link flow: issue a session token, park it in object storage,
 *   email a presigned link, redeem that link into a session cookie
 * - /blob is the in-memory store's presigned-GET origin
 */
use std::time::Duration;

use axum::{
    extract::{Path, Query, RawQuery, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::Form;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use url::Url;
use uuid::Uuid;

use crate::api::views;
use crate::error::AppError;
use crate::middleware::auth_context::AUTH_COOKIE;
use crate::services::object_store::{FETCH_TIMEOUT, StoreError};
use crate::services::token_codec::{LOGGED_IN_CLAIM, SessionClaims};
use crate::state::AppState;

/// Login links (stored object and presign) are valid for five minutes.
const LINK_TTL: Duration = Duration::from_secs(5 * 60);

/// Longest session lifetime the signup form accepts (30 days).
const MAX_SESSION_MINUTES: i64 = 60 * 24 * 30;

#[derive(Debug, Deserialize)]
pub struct RequestLoginForm {
    email: String,
    /// Session-token lifetime in minutes.
    expire_in: i64,
    /// Repeated checkbox field.
    #[serde(default)]
    permissions: Vec<String>,
}

impl RequestLoginForm {
    fn validate(&self) -> Result<(), &'static str> {
        if self.email.trim().is_empty() {
            return Err("email is required");
        }
        // Bounded so the lifetime stays well inside what the token
        // arithmetic can represent.
        if !(1..=MAX_SESSION_MINUTES).contains(&self.expire_in) {
            return Err("expire_in must be between 1 minute and 30 days");
        }
        Ok(())
    }
}

pub async fn request_login(
    State(state): State<AppState>,
    Form(form): Form<RequestLoginForm>,
) -> Result<Html<String>, AppError> {
    form.validate().map_err(AppError::InvalidForm)?;

    let mut permissions = form.permissions;
    permissions.push(LOGGED_IN_CLAIM.to_string());

    let request_id = Uuid::new_v4().to_string();
    let claims = SessionClaims::new(&request_id, &form.email, &permissions);
    let token = state
        .codec
        .issue(&claims, chrono::Duration::minutes(form.expire_in))
        .map_err(|e| AppError::Configuration(format!("session token signing: {e}")))?;

    let object_key = format!("{request_id}.jwt");
    state
        .store
        .put(&object_key, token.into_bytes(), "application/jwt", LINK_TTL)
        .await?;

    let presigned = state.store.presign_get(&object_key, LINK_TTL).await?;

    // The emailed link routes back through this app; only the presign query
    // is carried over.
    let presigned = Url::parse(&presigned)
        .map_err(|e| AppError::Configuration(format!("bad presigned url: {e}")))?;
    let query = presigned.query().unwrap_or_default();
    let login_link = format!(
        "{}/jwt/{}?{}",
        state.config.public_base_url, object_key, query
    );

    let body = format!(
        r#"<div>
<div>Thanks for joining the JWT experience.</div>
<div><a href="{login_link}">Click here</a></div>
<div>to retrieve your login token.</div>
</div>"#
    );
    state
        .mailer
        .send(
            std::slice::from_ref(&form.email),
            "Welcome to the JWT Experience",
            &body,
        )
        .await?;

    tracing::info!(email = %form.email, "sent login link");
    Ok(Html(views::thanks_page(&form.email)))
}

/// Redeem an emailed login link: fetch the token from the storage origin via
/// the presigned query, then install it as the session cookie.
pub async fn redeem_login_link(
    State(state): State<AppState>,
    Path(object): Path<String>,
    RawQuery(query): RawQuery,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AppError> {
    let query = query.filter(|q| !q.is_empty()).ok_or(AppError::LinkRejected)?;

    let url = format!("{}/blob/{}?{}", state.config.storage_base_url, object, query);
    let response = state
        .http
        .get(&url)
        .timeout(FETCH_TIMEOUT)
        .send()
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "storage fetch failed");
            AppError::StoreUnavailable
        })?;

    // The origin answers 403/404 for bad or expired presigns.
    if response.status() != reqwest::StatusCode::OK {
        return Err(AppError::LinkRejected);
    }

    let token = response
        .text()
        .await
        .map_err(|_| AppError::StoreUnavailable)?;

    let production = state.config.app_env.is_production();
    let cookie = Cookie::build((AUTH_COOKIE, token))
        .path("/")
        .same_site(SameSite::Lax)
        .http_only(production)
        .secure(production);

    Ok((jar.add(cookie), Redirect::to("/logged-in")))
}

#[derive(Debug, Deserialize)]
pub struct BlobQuery {
    token: Option<String>,
}

/// Presigned-GET origin for [`MemoryObjectStore`] URLs.
///
/// [`MemoryObjectStore`]: crate::services::object_store::MemoryObjectStore
pub async fn serve_blob(
    State(state): State<AppState>,
    Path(object): Path<String>,
    Query(query): Query<BlobQuery>,
) -> Result<Response, AppError> {
    let token = query.token.ok_or(AppError::LinkRejected)?;

    match state.store.read_presigned(&object, &token).await {
        Ok((bytes, content_type)) => {
            Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
        }
        Err(StoreError::NotFound) => Ok(StatusCode::NOT_FOUND.into_response()),
        Err(StoreError::Rejected) => Err(AppError::LinkRejected),
        Err(StoreError::Unavailable(_)) => Err(AppError::StoreUnavailable),
    }
}
