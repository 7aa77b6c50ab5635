/*
 * Responsibility
 * - Browser-facing route table
 * - Per-route claim gates attached with route_layer, so unmatched paths
 *   still 404 instead of 401
 */
use axum::{
    Router,
    extract::{RawPathParams, Request},
    middleware::{self, Next},
    routing::{get, post},
};

use crate::api::handlers::{login, pages};
use crate::middleware::claim_gate;
use crate::services::token_codec::LOGGED_IN_CLAIM;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::home))
        .route("/request-login", post(login::request_login))
        .route("/jwt/{object}", get(login::redeem_login_link))
        .route("/blob/{object}", get(login::serve_blob))
        .route(
            "/logged-in",
            get(pages::logged_in).route_layer(middleware::from_fn(
                |params: RawPathParams, req: Request, next: Next| {
                    claim_gate::enforce(LOGGED_IN_CLAIM, params, req, next)
                },
            )),
        )
        .route(
            "/logged-in/claim/{op}/{entity}",
            get(pages::claim_page).route_layer(middleware::from_fn(
                |params: RawPathParams, req: Request, next: Next| {
                    claim_gate::enforce("{op}_{entity}", params, req, next)
                },
            )),
        )
        .route(
            "/logged-in/showToken",
            get(pages::show_token).route_layer(middleware::from_fn(
                |params: RawPathParams, req: Request, next: Next| {
                    claim_gate::enforce(LOGGED_IN_CLAIM, params, req, next)
                },
            )),
        )
        .route(
            "/logged-in/hideToken",
            get(pages::hide_token).route_layer(middleware::from_fn(
                |params: RawPathParams, req: Request, next: Next| {
                    claim_gate::enforce(LOGGED_IN_CLAIM, params, req, next)
                },
            )),
        )
        .route(
            "/logout",
            get(pages::logout).route_layer(middleware::from_fn(
                |params: RawPathParams, req: Request, next: Next| {
                    claim_gate::enforce(LOGGED_IN_CLAIM, params, req, next)
                },
            )),
        )
}
