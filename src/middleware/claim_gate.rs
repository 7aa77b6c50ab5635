//! Per-route claim enforcement.
//!
//! A gated route declares a required-claim expression, either a literal
//! (`"read_loggedIn"`) or a template over path parameters (`"{op}_{entity}"`).
//! The gate reads the [`AuthContext`] attached by the session middleware and
//! either short-circuits with 401/403 or lets the handler run untouched.
//!
//! Attach with `route_layer`:
//!
//! ```ignore
//! .route(
//!     "/logged-in",
//!     get(pages::logged_in).route_layer(middleware::from_fn(
//!         |params: RawPathParams, req: Request, next: Next| {
//!             claim_gate::enforce("read_loggedIn", params, req, next)
//!         },
//!     )),
//! )
//! ```

use axum::{
    extract::{RawPathParams, Request},
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::middleware::auth_context::AuthContext;

pub async fn enforce(
    required: &'static str,
    params: RawPathParams,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ctx = req
        .extensions()
        .get::<AuthContext>()
        .cloned()
        .unwrap_or_default();

    // No valid token is always "unauthenticated", never "forbidden".
    let Some(claims) = ctx.claims() else {
        return Err(AppError::Unauthenticated);
    };

    let resolved = resolve_with(required, |name| {
        params
            .iter()
            .find(|(param, _)| *param == name)
            .map(|(_, value)| value)
    })?;

    let held = claims.permission_set();
    if !held.contains(&resolved) {
        return Err(AppError::Forbidden {
            required: resolved,
            permissions: held.into_iter().collect(),
            subject: claims.sub.clone(),
        });
    }

    Ok(next.run(req).await)
}

/// Resolve `{placeholder}`s in a claim expression against path parameters.
///
/// This is deliberately not a template engine: placeholders must match a path
/// parameter exactly, and an unresolved placeholder is a programmer error in
/// the route definition, reported as [`AppError::Configuration`].
fn resolve_with<'a, F>(expr: &str, lookup: F) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<&'a str>,
{
    if !expr.contains('{') {
        return Ok(expr.to_string());
    }

    let mut resolved = String::with_capacity(expr.len());
    let mut rest = expr;

    while let Some(open) = rest.find('{') {
        resolved.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            return Err(AppError::Configuration(format!(
                "unterminated placeholder in claim template '{expr}'"
            )));
        };
        let name = &after[..close];
        let Some(value) = lookup(name) else {
            return Err(AppError::Configuration(format!(
                "missing path parameter '{name}' for claim template '{expr}'"
            )));
        };
        resolved.push_str(value);
        rest = &after[close + 1..];
    }
    resolved.push_str(rest);

    Ok(resolved)
}
