//! Cache collaborator for the Strata blob store.
//!
//! The blob store keeps decoded text in a shared cache keyed by blob address.
//! This crate defines the [`BlobCache`] contract plus two implementations:
//!
//! - [`InMemoryCache`]: bounded LRU with per-entry expiry
//! - [`NullCache`]: stores nothing, for callers that want no caching
//!
//! Keys are built with [`global_key`] so that every component, including the
//! tenant's domain id, is escaped and cannot collide with another.

pub mod key;
pub mod memory;
pub mod traits;

pub use key::global_key;
pub use memory::{CacheStats, InMemoryCache, NullCache, DEFAULT_CAPACITY};
pub use traits::BlobCache;
