//! Typed key-value storage for the grocer storefront.
//!
//! Values are serialized as JSON into a byte [`Backend`]: memory for tests and
//! short-lived sessions, a directory of files for anything that must survive a
//! restart (the saved cart).
//!
//! # Example
//!
//! ```rust
//! use grocer_cache::{cache_key, Cache};
//!
//! let cache = Cache::in_memory();
//! cache.set(&cache_key!("products", "p1"), &12_500).unwrap();
//! let price: Option<i64> = cache.get("products:p1").unwrap();
//! assert_eq!(price, Some(12_500));
//! ```

mod backend;
mod error;
mod kv;
mod slot;

pub use backend::{Backend, FileBackend, MemoryBackend};
pub use error::CacheError;
pub use kv::Cache;
pub use slot::{Slot, SlotData};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, Slot};
}
