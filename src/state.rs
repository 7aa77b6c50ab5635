/*
 * Responsibility
 * - Shared per-process context handed to the Router (AppState)
 * - Clone-cheap: members are Arc-backed or key handles
 */
use std::sync::Arc;

use crate::config::Config;
use crate::idp::MockIdp;
use crate::services::mailer::Mailer;
use crate::services::object_store::ObjectStore;
use crate::services::token_codec::TokenCodec;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub codec: TokenCodec,
    pub idp: MockIdp,
    pub mailer: Arc<dyn Mailer>,
    pub store: Arc<dyn ObjectStore>,
    pub http: reqwest::Client,
}
