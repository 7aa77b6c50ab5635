//! Single-use authorization-code storage.
//!
//! Codes are opaque random strings mapping to the claim set chosen on the
//! login form. Redemption removes the entry under a write lock, so concurrent
//! exchanges of the same code resolve to exactly one winner.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::random;

const CODE_BYTES: usize = 32;

#[derive(Clone, Debug, Default)]
pub struct CodeStore {
    codes: Arc<RwLock<HashMap<String, Map<String, Value>>>>,
}

impl CodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a fresh code bound to `claims`.
    pub async fn issue(&self, claims: Map<String, Value>) -> Result<String, getrandom::Error> {
        let code = random::hex_token(CODE_BYTES)?;
        self.codes.write().await.insert(code.clone(), claims);
        Ok(code)
    }

    /// Redeem `code`, consuming it. Returns `None` for unknown or
    /// already-redeemed codes.
    pub async fn pop(&self, code: &str) -> Option<Map<String, Value>> {
        self.codes.write().await.remove(code)
    }
}
