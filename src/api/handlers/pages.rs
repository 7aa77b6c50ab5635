/*
 * Responsibility
 * - Browser pages: signup, logged-in home, claim demo, token show/hide,
 *   logout
 * - Claim enforcement happens in the route layer; handlers here only read
 *   the already-attached AuthContext
 */
use axum::{
    Extension,
    extract::{Path, Query},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;

use crate::api::views;
use crate::error::AppError;
use crate::middleware::auth_context::{AUTH_COOKIE, AuthContext};

/// Claims offered on the signup form. `read_loggedIn` is granted implicitly.
const SAMPLE_PERMISSIONS: &[(&str, &str)] = &[
    ("read_foo", "Read /foo"),
    ("write_foo", "Write /foo"),
    ("read_bar", "Read /bar"),
    ("write_bar", "Write /bar"),
];

#[derive(Debug, Deserialize)]
pub struct HomeQuery {
    msg: Option<String>,
    need: Option<String>,
}

pub async fn home(
    Extension(ctx): Extension<AuthContext>,
    Query(query): Query<HomeQuery>,
) -> Response {
    if ctx.is_authenticated() {
        return Redirect::to("/logged-in").into_response();
    }

    let alert = match (query.msg.as_deref(), query.need.as_deref()) {
        (Some("missing_claim"), Some(need)) => Some(format!(
            "You were redirected because you do not have the '{need}' permission."
        )),
        (Some("missing_token"), _) => {
            Some("You must be logged in to view that page.".to_string())
        }
        _ => None,
    };

    Html(views::home_page(alert.as_deref(), SAMPLE_PERMISSIONS)).into_response()
}

pub async fn logged_in(Extension(ctx): Extension<AuthContext>) -> Result<Html<String>, AppError> {
    let claims = ctx.claims().ok_or(AppError::Unauthenticated)?;
    let permissions: Vec<String> = claims.permission_set().into_iter().collect();

    Ok(Html(views::logged_in_page(&claims.username, &permissions)))
}

pub async fn claim_page(
    Path((op, entity)): Path<(String, String)>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Html<String>, AppError> {
    let claims = ctx.claims().ok_or(AppError::Unauthenticated)?;
    let required = format!("{op}_{entity}");
    let permissions: Vec<String> = claims.permission_set().into_iter().collect();

    Ok(Html(views::claim_page(&required, &permissions, &claims.sub)))
}

/// htmx fragment echoing the caller's own session cookie.
pub async fn show_token(jar: CookieJar) -> Result<Html<String>, AppError> {
    let cookie = jar.get(AUTH_COOKIE).ok_or(AppError::Unauthenticated)?;
    Ok(Html(views::show_token_fragment(cookie.value())))
}

pub async fn hide_token() -> Html<String> {
    Html(views::hide_token_fragment())
}

pub async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    let jar = jar.remove(Cookie::build((AUTH_COOKIE, "")).path("/"));
    (jar, Redirect::to("/"))
}
