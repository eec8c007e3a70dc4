//! Flag pipeline for the Strata blob store.
//!
//! Stored payloads carry [`BlobFlags`](strata_types::BlobFlags) describing the
//! transforms applied on write. [`compress`] applies them to fresh text and
//! [`expand`] reverses them in a fixed order:
//!
//! 1. `gzip`: raw deflate ([`deflate`], [`inflate`])
//! 2. `object`: versioned [`Envelope`] decoding
//! 3. no `utf-8` + configured legacy encoding: [`LegacyEncoding`] decoding
//!
//! The `external` flag is not handled here: resolving pointers needs an
//! external store, so the orchestrator fetches first and then runs [`expand`]
//! over the fetched bytes.

pub mod deflate;
pub mod envelope;
pub mod error;
pub mod legacy;
pub mod pipeline;

pub use deflate::{deflate, inflate, MAX_INFLATED_SIZE};
pub use envelope::{ConcatenatedBlob, Envelope};
pub use error::{CodecError, CodecResult};
pub use legacy::LegacyEncoding;
pub use pipeline::{compress, expand};
