//! Session-wide product cache.

use async_trait::async_trait;
use futures::future::join_all;
use grocer_commerce::catalog::Product;
use grocer_commerce::ProductId;
use grocer_data::{ApiClient, FetchError};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Where products come from.
#[async_trait]
pub trait ProductSource: Send + Sync {
    async fn fetch_product(&self, id: &ProductId) -> Result<Product, FetchError>;
}

#[async_trait]
impl ProductSource for ApiClient {
    async fn fetch_product(&self, id: &ProductId) -> Result<Product, FetchError> {
        self.products().get(id).await
    }
}

/// Products fetched during this session, keyed by id.
///
/// Entries are never evicted. A failed fetch leaves no entry, so the next
/// lookup tries again.
pub struct ProductCache {
    source: Arc<dyn ProductSource>,
    products: RwLock<HashMap<ProductId, Product>>,
}

impl std::fmt::Debug for ProductCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductCache")
            .field("cached", &self.products.read().len())
            .finish()
    }
}

impl ProductCache {
    pub fn new(source: Arc<dyn ProductSource>) -> Self {
        Self {
            source,
            products: RwLock::new(HashMap::new()),
        }
    }

    pub fn get_cached(&self, id: &ProductId) -> Option<Product> {
        self.products.read().get(id).cloned()
    }

    pub fn contains(&self, id: &ProductId) -> bool {
        self.products.read().contains_key(id)
    }

    pub fn insert(&self, product: Product) {
        self.products.write().insert(product.id.clone(), product);
    }

    pub fn len(&self) -> usize {
        self.products.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.read().is_empty()
    }

    /// Cached product, or fetch and cache it. Fetch failures are logged and
    /// yield `None`.
    pub async fn get_or_fetch(&self, id: &ProductId) -> Option<Product> {
        if let Some(product) = self.get_cached(id) {
            return Some(product);
        }

        match self.source.fetch_product(id).await {
            Ok(product) => {
                self.insert(product.clone());
                Some(product)
            }
            Err(e) => {
                warn!(product_id = %id, error = %e, "product fetch failed");
                None
            }
        }
    }

    /// Fetch every id not cached yet, concurrently. Returns how many were
    /// added.
    pub async fn load_missing<I>(&self, ids: I) -> usize
    where
        I: IntoIterator<Item = ProductId>,
    {
        let mut seen = HashSet::new();
        let missing: Vec<ProductId> = ids
            .into_iter()
            .filter(|id| !self.contains(id) && seen.insert(id.clone()))
            .collect();
        if missing.is_empty() {
            return 0;
        }

        debug!(count = missing.len(), "loading products");
        let results = join_all(missing.iter().map(|id| self.source.fetch_product(id))).await;

        let mut loaded = 0;
        for (id, result) in missing.iter().zip(results) {
            match result {
                Ok(product) => {
                    self.insert(product);
                    loaded += 1;
                }
                Err(e) => warn!(product_id = %id, error = %e, "product fetch failed"),
            }
        }
        loaded
    }

    /// Drop every cached product.
    pub fn clear(&self) {
        self.products.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grocer_data::mock::MockTransport;
    use grocer_data::{FetchClient, Method};
    use serde_json::json;

    fn cache(mock: &MockTransport) -> ProductCache {
        let api = ApiClient::new(FetchClient::new(Arc::new(mock.clone()), "https://api.test"));
        ProductCache::new(Arc::new(api))
    }

    #[tokio::test]
    async fn test_fetches_once() {
        let mock = MockTransport::new();
        mock.respond_always(
            Method::Get,
            "/products/p1",
            200,
            json!({"data": {"id": "p1", "name": "Riz", "price": 12500}}),
        );
        let cache = cache(&mock);

        assert!(cache.get_or_fetch(&"p1".into()).await.is_some());
        assert!(cache.get_or_fetch(&"p1".into()).await.is_some());
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let mock = MockTransport::new();
        let cache = cache(&mock);

        assert!(cache.get_or_fetch(&"gone".into()).await.is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_load_missing_is_idempotent() {
        let mock = MockTransport::new();
        mock.respond_always(Method::Get, "/products/p1", 200, json!({"id": "p1", "name": "Riz", "price": 100}));
        mock.respond_always(Method::Get, "/products/p2", 200, json!({"id": "p2", "name": "Huile", "price": 200}));
        let cache = cache(&mock);
        let ids: Vec<ProductId> = vec!["p1".into(), "p2".into(), "p1".into(), "p3".into()];

        assert_eq!(cache.load_missing(ids.clone()).await, 2);
        assert_eq!(mock.request_count(), 3);

        assert_eq!(cache.load_missing(ids).await, 0);
        // p3 failed and is retried; the cached two are not
        assert_eq!(mock.request_count(), 4);
    }
}
