//! Object storage collaborator for login tokens.
//!
//! The login flow writes a signed token under an opaque key, hands the user a
//! presigned GET URL over email, and later fetches that URL on the user's
//! behalf. `MemoryObjectStore` plays the storage origin for demo deployments:
//! its presigned URLs point at this app's own `/blob/{key}` route, which reads
//! back through [`ObjectStore::read_presigned`].

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::random;

/// Timeout policy for the presigned-URL fetch performed while redeeming a
/// login link.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object not found")]
    NotFound,
    /// Bad or expired presign parameters. Maps to the storage origin's 403.
    #[error("presigned request rejected")]
    Rejected,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `key`. The object itself expires after `ttl`.
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        ttl: Duration,
    ) -> Result<(), StoreError>;

    /// Produce a time-limited GET URL for `key`.
    async fn presign_get(&self, key: &str, ttl: Duration) -> Result<String, StoreError>;

    /// Origin-side read of a presigned request (backs the `/blob` route of
    /// the in-memory store).
    async fn read_presigned(&self, key: &str, token: &str)
    -> Result<(Vec<u8>, String), StoreError>;
}

struct StoredObject {
    bytes: Vec<u8>,
    content_type: String,
    expires_at: Instant,
    presign: Option<Presign>,
}

struct Presign {
    token: String,
    expires_at: Instant,
}

/// Process-local storage origin.
pub struct MemoryObjectStore {
    base_url: String,
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl MemoryObjectStore {
    /// `base_url` is the public root under which `/blob/{key}` is served.
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            objects: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
                expires_at: Instant::now() + ttl,
                presign: None,
            },
        );
        Ok(())
    }

    async fn presign_get(&self, key: &str, ttl: Duration) -> Result<String, StoreError> {
        let token =
            random::hex_token(32).map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let mut objects = self.objects.write().await;
        let object = objects.get_mut(key).ok_or(StoreError::NotFound)?;
        object.presign = Some(Presign {
            token: token.clone(),
            expires_at: Instant::now() + ttl,
        });

        Ok(format!("{}/blob/{}?token={}", self.base_url, key, token))
    }

    async fn read_presigned(
        &self,
        key: &str,
        token: &str,
    ) -> Result<(Vec<u8>, String), StoreError> {
        let objects = self.objects.read().await;
        let object = objects.get(key).ok_or(StoreError::NotFound)?;

        let now = Instant::now();
        if object.expires_at < now {
            return Err(StoreError::Rejected);
        }

        match &object.presign {
            Some(presign) if presign.token == token && presign.expires_at >= now => {
                Ok((object.bytes.clone(), object.content_type.clone()))
            }
            _ => Err(StoreError::Rejected),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn presigned_read_round_trips() {
        let store = MemoryObjectStore::new("http://store.test".into());
        store
            .put("a.jwt", b"token-bytes".to_vec(), "application/jwt", Duration::from_secs(300))
            .await
            .unwrap();

        let url = store.presign_get("a.jwt", Duration::from_secs(300)).await.unwrap();
        assert!(url.starts_with("http://store.test/blob/a.jwt?token="));

        let token = url.split("token=").nth(1).unwrap();
        let (bytes, content_type) = store.read_presigned("a.jwt", token).await.unwrap();
        assert_eq!(bytes, b"token-bytes");
        assert_eq!(content_type, "application/jwt");
    }

    #[tokio::test]
    async fn wrong_token_is_rejected() {
        let store = MemoryObjectStore::new("http://store.test".into());
        store
            .put("a.jwt", b"x".to_vec(), "application/jwt", Duration::from_secs(300))
            .await
            .unwrap();
        store.presign_get("a.jwt", Duration::from_secs(300)).await.unwrap();

        assert!(matches!(
            store.read_presigned("a.jwt", "deadbeef").await,
            Err(StoreError::Rejected)
        ));
    }

    #[tokio::test]
    async fn unknown_key_is_not_found() {
        let store = MemoryObjectStore::new("http://store.test".into());
        assert!(matches!(
            store.read_presigned("missing.jwt", "t").await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store.presign_get("missing.jwt", Duration::from_secs(10)).await,
            Err(StoreError::NotFound)
        ));
    }
}
