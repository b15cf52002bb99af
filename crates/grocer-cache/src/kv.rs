//! Key-value store wrapper with automatic serialization.

use crate::backend::{Backend, FileBackend, MemoryBackend};
use crate::CacheError;
use serde::{de::DeserializeOwned, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Type-safe cache over a [`Backend`].
///
/// Values are stored as JSON. Clones share the same backend.
#[derive(Clone)]
pub struct Cache {
    backend: Arc<dyn Backend>,
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache").finish_non_exhaustive()
    }
}

impl Cache {
    pub fn new(backend: impl Backend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Open an in-memory store.
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// Open an on-disk store rooted at `dir`.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let cache = Cache::open_dir("/var/lib/grocer")?;
    /// ```
    pub fn open_dir(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        Ok(Self::new(FileBackend::open(dir)?))
    }

    /// Get a value from the cache.
    ///
    /// Returns `None` if the key doesn't exist.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.backend.get(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Set a value in the cache.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(value)?;
        self.backend.set(key, &bytes)
    }

    pub fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.backend.delete(key)
    }

    pub fn exists(&self, key: &str) -> Result<bool, CacheError> {
        self.backend.exists(key)
    }

    /// All keys in the store, sorted.
    pub fn keys(&self) -> Result<Vec<String>, CacheError> {
        self.backend.keys()
    }

    /// Keys starting with `prefix:`.
    pub fn keys_in(&self, prefix: &str) -> Result<Vec<String>, CacheError> {
        let namespace = format!("{}:", prefix);
        Ok(self
            .keys()?
            .into_iter()
            .filter(|k| k.starts_with(&namespace))
            .collect())
    }
}

/// Helper to build cache keys with namespacing.
///
/// # Example
///
/// ```rust
/// use grocer_cache::cache_key;
///
/// let key = cache_key!("products", "p42");
/// assert_eq!(key, "products:p42");
/// ```
#[macro_export]
macro_rules! cache_key {
    ($prefix:expr, $($part:expr),+) => {{
        let mut key = String::from($prefix);
        $(
            key.push(':');
            key.push_str(&$part.to_string());
        )+
        key
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Line {
        product_id: String,
        quantity: i64,
    }

    #[test]
    fn test_typed_roundtrip_and_namespaces() {
        let cache = Cache::in_memory();
        let line = Line {
            product_id: "p1".into(),
            quantity: 2,
        };
        cache.set(&cache_key!("lines", "p1"), &line).unwrap();
        cache.set("cart", &vec![1, 2]).unwrap();

        assert_eq!(cache.get::<Line>("lines:p1").unwrap(), Some(line));
        assert_eq!(cache.keys_in("lines").unwrap(), vec!["lines:p1"]);
        assert!(cache.get::<Line>("lines:p2").unwrap().is_none());
    }

    #[test]
    fn test_wrong_shape_is_a_serialization_error() {
        let cache = Cache::in_memory();
        cache.set("cart", &"not a line").unwrap();
        assert!(matches!(
            cache.get::<Line>("cart"),
            Err(CacheError::SerializeError(_))
        ));
    }

    #[test]
    fn test_clones_share_backend() {
        let cache = Cache::in_memory();
        let other = cache.clone();
        cache.set("k", &1).unwrap();
        assert_eq!(other.get::<i32>("k").unwrap(), Some(1));
    }
}
