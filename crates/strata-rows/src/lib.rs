//! Row store adapter for the Strata blob store.
//!
//! The primary store keeps blobs as rows of `(text_id, raw bytes, flags)`.
//! Rows are append-only: they are inserted once and never updated.
//!
//! All backends implement the [`RowStore`] trait:
//!
//! - [`InMemoryRowStore`]: `BTreeMap`-based store for tests and embedding

pub mod error;
pub mod memory;
pub mod row;
pub mod traits;

pub use error::{RowError, RowResult};
pub use memory::{InMemoryRowStore, DEFAULT_DOMAIN_ID};
pub use row::StoredRow;
pub use traits::RowStore;
