//! A single typed value persisted under one key.

use crate::{Cache, CacheError};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::marker::PhantomData;
use tracing::warn;

/// Stored envelope around a slot value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotData<T> {
    pub data: T,
    /// Incremented on every write.
    pub version: u64,
    pub updated_at: DateTime<Utc>,
}

/// A typed value bound to one cache key, e.g. the saved cart.
///
/// # Example
///
/// ```rust
/// use grocer_cache::{Cache, Slot};
///
/// let slot: Slot<Vec<String>> = Slot::new(Cache::in_memory(), "cart");
/// slot.store(&vec!["p1".to_string()]).unwrap();
/// assert_eq!(slot.load_or_default(), vec!["p1".to_string()]);
/// ```
pub struct Slot<T> {
    cache: Cache,
    key: String,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            key: self.key.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Slot").field("key", &self.key).finish()
    }
}

impl<T> Slot<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(cache: Cache, key: impl Into<String>) -> Self {
        Self {
            cache,
            key: key.into(),
            _phantom: PhantomData,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Full envelope including version.
    pub fn load_versioned(&self) -> Result<Option<SlotData<T>>, CacheError> {
        self.cache.get::<SlotData<T>>(&self.key)
    }

    pub fn load(&self) -> Result<Option<T>, CacheError> {
        Ok(self.load_versioned()?.map(|s| s.data))
    }

    /// Write `data`, bumping the version.
    pub fn store(&self, data: &T) -> Result<u64, CacheError> {
        let version = self
            .cache
            .get::<SlotData<serde_json::Value>>(&self.key)
            .ok()
            .flatten()
            .map(|s| s.version + 1)
            .unwrap_or(1);
        let envelope = SlotData {
            data,
            version,
            updated_at: Utc::now(),
        };
        self.cache.set(&self.key, &envelope)?;
        Ok(version)
    }

    pub fn clear(&self) -> Result<(), CacheError> {
        self.cache.delete(&self.key)
    }
}

impl<T> Slot<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    /// Stored value, or the default when missing or unreadable.
    ///
    /// An unreadable value is logged and left in place until the next write.
    pub fn load_or_default(&self) -> T {
        match self.load() {
            Ok(Some(data)) => data,
            Ok(None) => T::default(),
            Err(e) => {
                warn!(key = %self.key, error = %e, "discarding unreadable stored value");
                T::default()
            }
        }
    }

    /// Read, modify and write back.
    pub fn update<F>(&self, f: F) -> Result<T, CacheError>
    where
        F: FnOnce(&mut T),
    {
        let mut data = self.load()?.unwrap_or_default();
        f(&mut data);
        self.store(&data)?;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versions_increase() {
        let slot: Slot<Vec<u32>> = Slot::new(Cache::in_memory(), "cart");
        assert_eq!(slot.store(&vec![1]).unwrap(), 1);
        assert_eq!(slot.store(&vec![1, 2]).unwrap(), 2);
        let stored = slot.load_versioned().unwrap().unwrap();
        assert_eq!(stored.version, 2);
        assert_eq!(stored.data, vec![1, 2]);
    }

    #[test]
    fn test_update_starts_from_default() {
        let slot: Slot<Vec<u32>> = Slot::new(Cache::in_memory(), "cart");
        let data = slot.update(|v| v.push(7)).unwrap();
        assert_eq!(data, vec![7]);
        assert_eq!(slot.load().unwrap(), Some(vec![7]));
    }

    #[test]
    fn test_corrupt_value_falls_back_to_default() {
        let cache = Cache::in_memory();
        cache.set("cart", &"garbage").unwrap();
        let slot: Slot<Vec<u32>> = Slot::new(cache, "cart");
        assert!(slot.load().is_err());
        assert!(slot.load_or_default().is_empty());
        assert_eq!(slot.store(&vec![3]).unwrap(), 1);
    }

    #[test]
    fn test_survives_reopen_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        {
            let slot: Slot<Vec<u32>> = Slot::new(Cache::open_dir(dir.path()).unwrap(), "cart");
            slot.store(&vec![4, 5]).unwrap();
        }
        let slot: Slot<Vec<u32>> = Slot::new(Cache::open_dir(dir.path()).unwrap(), "cart");
        assert_eq!(slot.load_or_default(), vec![4, 5]);
        slot.clear().unwrap();
        assert_eq!(slot.load().unwrap(), None);
    }
}
