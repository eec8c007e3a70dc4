//! Foundation types for the Strata blob store.
//!
//! Every stored blob is referenced by a [`BlobAddress`] of the form
//! `schema:identifier[?k=v&k=v]`, and every stored payload travels with a set
//! of [`BlobFlags`] describing how to turn the raw bytes back into text.
//!
//! # Key Types
//!
//! - [`BlobAddress`]: parsed `(schema, identifier, parameters)` triple
//! - [`BlobFlags`]: order-insensitive set of storage flags (`gzip`, `object`, ...)
//! - [`AddressError`]: structural failures while parsing addresses

pub mod address;
pub mod error;
pub mod flags;

pub use address::{BlobAddress, BAD_SCHEMA, EXTERNAL_SCHEMA, ROW_SCHEMA};
pub use error::{AddressError, AddressResult};
pub use flags::{BlobFlag, BlobFlags};
