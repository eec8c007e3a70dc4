//! Object envelopes for `object`-flagged blobs.
//!
//! An envelope wraps either a single payload or a concatenated bundle of many
//! texts (typically successive revisions) compressed together. The bundle is
//! keyed by the BLAKE3 digest of each text and remembers a default key: the
//! text the owning row stands for.
//!
//! # Wire format
//!
//! ```text
//! +------+---------+------------------------------+
//! | STEN | version | bincode(WireEnvelope)        |
//! | 4 B  | 1 B     | ...                          |
//! +------+---------+------------------------------+
//! ```
//!
//! In the concatenated variant the item map is bincode-encoded and then raw
//! deflated before being placed in the wire struct.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::deflate::{deflate, inflate};
use crate::error::{CodecError, CodecResult};

const ENVELOPE_MAGIC: &[u8; 4] = b"STEN";
const ENVELOPE_VERSION: u8 = 1;
const HEADER_LEN: usize = ENVELOPE_MAGIC.len() + 1;

/// A decoded object envelope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Envelope {
    /// A single payload.
    Flat(Vec<u8>),
    /// Many texts compressed together.
    Concatenated(ConcatenatedBlob),
}

#[derive(Serialize, Deserialize)]
enum WireEnvelope {
    Flat(Vec<u8>),
    Concatenated {
        default_key: Option<String>,
        compressed: Vec<u8>,
    },
}

impl Envelope {
    /// Serialize with the versioned header.
    pub fn to_bytes(&self) -> CodecResult<Vec<u8>> {
        let wire = match self {
            Self::Flat(data) => WireEnvelope::Flat(data.clone()),
            Self::Concatenated(blob) => {
                let items = bincode::serialize(&blob.items)
                    .map_err(|e| CodecError::Compression(e.to_string()))?;
                WireEnvelope::Concatenated {
                    default_key: blob.default_key.clone(),
                    compressed: deflate(&items)?,
                }
            }
        };
        let body =
            bincode::serialize(&wire).map_err(|e| CodecError::Compression(e.to_string()))?;

        let mut out = Vec::with_capacity(HEADER_LEN + body.len());
        out.extend_from_slice(ENVELOPE_MAGIC);
        out.push(ENVELOPE_VERSION);
        out.extend_from_slice(&body);
        Ok(out)
    }

    /// Decode an envelope, checking magic and version first.
    pub fn from_bytes(data: &[u8]) -> CodecResult<Self> {
        if data.len() < HEADER_LEN || &data[..4] != ENVELOPE_MAGIC {
            return Err(CodecError::BadEnvelope("missing envelope header".into()));
        }
        let version = data[4];
        if version != ENVELOPE_VERSION {
            return Err(CodecError::BadEnvelope(format!(
                "unsupported envelope version {version}"
            )));
        }

        let wire: WireEnvelope = bincode::deserialize(&data[HEADER_LEN..])
            .map_err(|e| CodecError::BadEnvelope(e.to_string()))?;

        match wire {
            WireEnvelope::Flat(data) => Ok(Self::Flat(data)),
            WireEnvelope::Concatenated {
                default_key,
                compressed,
            } => {
                let items: BTreeMap<String, Vec<u8>> = bincode::deserialize(&inflate(&compressed)?)
                    .map_err(|e| CodecError::BadEnvelope(e.to_string()))?;
                Ok(Self::Concatenated(ConcatenatedBlob { items, default_key }))
            }
        }
    }

    /// The text this envelope stands for.
    pub fn text(&self) -> CodecResult<&[u8]> {
        match self {
            Self::Flat(data) => Ok(data.as_slice()),
            Self::Concatenated(blob) => match &blob.default_key {
                Some(key) => blob
                    .get_item(key)
                    .ok_or_else(|| CodecError::MissingItem(key.clone())),
                None => Err(CodecError::MissingItem(String::new())),
            },
        }
    }

    /// A specific item. Flat envelopes have no keyed items.
    pub fn item(&self, key: &str) -> CodecResult<&[u8]> {
        match self {
            Self::Flat(_) => Err(CodecError::MissingItem(key.to_string())),
            Self::Concatenated(blob) => blob
                .get_item(key)
                .ok_or_else(|| CodecError::MissingItem(key.to_string())),
        }
    }
}

/// A bundle of texts keyed by content digest.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConcatenatedBlob {
    items: BTreeMap<String, Vec<u8>>,
    default_key: Option<String>,
}

impl ConcatenatedBlob {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key under which `text` is stored.
    pub fn key_for(text: &[u8]) -> String {
        hex::encode(blake3::hash(text).as_bytes())
    }

    /// Add a text and return its key. Adding the same text twice is a no-op.
    pub fn add_item(&mut self, text: &[u8]) -> String {
        let key = Self::key_for(text);
        self.items
            .entry(key.clone())
            .or_insert_with(|| text.to_vec());
        key
    }

    pub fn get_item(&self, key: &str) -> Option<&[u8]> {
        self.items.get(key).map(Vec::as_slice)
    }

    /// Add a text and make it the default.
    pub fn set_text(&mut self, text: &[u8]) -> String {
        let key = self.add_item(text);
        self.default_key = Some(key.clone());
        key
    }

    /// The default text, if one was set.
    pub fn text(&self) -> Option<&[u8]> {
        self.default_key.as_deref().and_then(|key| self.get_item(key))
    }

    pub fn default_key(&self) -> Option<&str> {
        self.default_key.as_deref()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
