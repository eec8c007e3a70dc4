//! External store gateway for the Strata blob store.
//!
//! Large or cold blobs can live outside the primary row store, in one of
//! several external clusters. A row flagged `external` holds a pointer of the
//! form `protocol://cluster/id[/item]` instead of the data itself.
//!
//! - [`ExternalPointer`]: parsed pointer
//! - [`ExternalBackend`]: storage for one protocol, addressing many clusters
//! - [`ExternalStoreAccess`]: routes pointers to backends by protocol and
//!   spreads writes over the configured write stores
//! - [`InMemoryExternalBackend`]: `HashMap`-based backend for tests and embedding

pub mod access;
pub mod config;
pub mod error;
pub mod memory;
pub mod pointer;
pub mod traits;

pub use access::ExternalStoreAccess;
pub use config::ExternalStoreConfig;
pub use error::{ExternalError, ExternalResult};
pub use memory::InMemoryExternalBackend;
pub use pointer::ExternalPointer;
pub use traits::ExternalBackend;
