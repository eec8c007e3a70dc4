//! Layered blob store for Strata.
//!
//! Text blobs are addressed by strings such as `tt:1234`. A [`BlobStore`]
//! writes new text through the flag pipeline into an append-only row store,
//! optionally spilling the payload to an external cluster, and reads blobs
//! back through a shared read-through cache.
//!
//! - [`BlobStore`]: single and batch reads, writes, payload expansion
//! - [`StrataConfig`]: TOML configuration for the store and external clusters
//! - [`BatchResult`]: per-address values plus non-fatal warnings
//!
//! ```
//! use std::sync::Arc;
//!
//! use strata_cache::InMemoryCache;
//! use strata_external::ExternalStoreAccess;
//! use strata_rows::InMemoryRowStore;
//! use strata_store::BlobStore;
//!
//! let store = BlobStore::new(
//!     Arc::new(InMemoryRowStore::new()),
//!     Arc::new(ExternalStoreAccess::disabled()),
//!     Arc::new(InMemoryCache::new()),
//! );
//! let address = store.store_blob("hello").unwrap();
//! assert_eq!(store.get_blob(&address.to_string()).unwrap(), "hello");
//! ```

pub mod config;
pub mod error;
pub mod status;
pub mod store;

pub use config::{BlobStoreConfig, ExternalEncoding, StrataConfig, DEFAULT_CACHE_EXPIRY_SECS};
pub use error::{AccessFailure, StoreError, StoreResult};
pub use status::{BatchResult, MessageKind, StatusMessage, INTERNAL_ERROR_MESSAGE, REMEDY_HINT};
pub use store::{BlobStore, CACHE_NAMESPACE};
