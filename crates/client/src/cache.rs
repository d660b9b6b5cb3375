//! Local persistent cache for product image sets.
//!
//! Recovery path for images lost to a page reload or a transient backend
//! image-pipeline failure: every successful authoritative fetch writes
//! through, and an empty or failed fetch falls back to the last-known-good
//! set when one exists. The cache is never the primary source while a fresh
//! fetch succeeds.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vitrine_core::ProductId;

use crate::services::ImageService;
use crate::store::KeyValueStore;

/// Last-known-good image set for one product.
///
/// `urls` is non-empty by construction: a product with zero known images has
/// no cache entry at all, which keeps "never fetched" distinguishable from
/// "confirmed empty".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedImageSet {
    pub product_id: ProductId,
    pub urls: Vec<String>,
    pub cached_at: DateTime<Utc>,
}

/// Write-through image cache over a best-effort [`KeyValueStore`].
#[derive(Debug)]
pub struct ImageCache<S> {
    store: S,
}

impl<S: KeyValueStore> ImageCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn key(product_id: ProductId) -> String {
        format!("images:{product_id}")
    }

    pub async fn get(&self, product_id: ProductId) -> Option<CachedImageSet> {
        let raw = self.store.get_item(&Self::key(product_id)).await?;
        match serde_json::from_str::<CachedImageSet>(&raw) {
            Ok(set) if !set.urls.is_empty() => Some(set),
            Ok(_) => {
                // An empty entry should never have been written; drop it.
                self.store.remove_item(&Self::key(product_id)).await;
                None
            }
            Err(err) => {
                tracing::warn!(%product_id, %err, "discarding unreadable cached image set");
                self.store.remove_item(&Self::key(product_id)).await;
                None
            }
        }
    }

    /// Record a successful authoritative fetch. Empty sets are not written.
    pub async fn put(&self, product_id: ProductId, urls: &[String]) {
        if urls.is_empty() {
            tracing::debug!(%product_id, "skipping cache write for empty image set");
            return;
        }
        let set = CachedImageSet {
            product_id,
            urls: urls.to_vec(),
            cached_at: Utc::now(),
        };
        match serde_json::to_string(&set) {
            Ok(raw) => self.store.set_item(&Self::key(product_id), &raw).await,
            Err(err) => {
                tracing::warn!(%product_id, %err, "failed to serialize image set for cache");
            }
        }
    }

    pub async fn invalidate(&self, product_id: ProductId) {
        self.store.remove_item(&Self::key(product_id)).await;
    }

    /// Fetch the authoritative image set, writing through on success and
    /// masking an empty or failed fetch with the cached set when one exists.
    pub async fn refresh<F: ImageService>(
        &self,
        product_id: ProductId,
        service: &F,
        timeout: Duration,
    ) -> Vec<String> {
        let fetched = tokio::time::timeout(timeout, service.fetch_images(product_id)).await;

        match fetched {
            Ok(Ok(descriptors)) if !descriptors.is_empty() => {
                let urls: Vec<String> = descriptors.into_iter().map(|d| d.url).collect();
                self.put(product_id, &urls).await;
                urls
            }
            Ok(Ok(_)) => match self.get(product_id).await {
                Some(cached) => {
                    tracing::warn!(%product_id, "image fetch returned empty; using cached set");
                    cached.urls
                }
                None => Vec::new(),
            },
            Ok(Err(err)) => self.fallback(product_id, &err.to_string()).await,
            Err(_) => self.fallback(product_id, "request timed out").await,
        }
    }

    async fn fallback(&self, product_id: ProductId, reason: &str) -> Vec<String> {
        match self.get(product_id).await {
            Some(cached) => {
                tracing::warn!(%product_id, reason, "image fetch failed; using cached set");
                cached.urls
            }
            None => {
                tracing::warn!(%product_id, reason, "image fetch failed and no cached set exists");
                Vec::new()
            }
        }
    }
}
