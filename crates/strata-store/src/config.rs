use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strata_external::ExternalStoreConfig;

use crate::error::{StoreError, StoreResult};

/// One week.
pub const DEFAULT_CACHE_EXPIRY_SECS: u64 = 604_800;

/// Which legacy encoding applies to payloads fetched from external stores
/// that carry no `utf-8` flag.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExternalEncoding {
    /// Use the store's own `legacy_encoding`.
    #[default]
    Inherit,
    /// Treat external payloads as UTF-8 regardless of flags.
    Utf8,
    /// Use a dedicated encoding label for external payloads.
    Label(String),
}

/// Per-instance policy of a [`BlobStore`](crate::BlobStore).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlobStoreConfig {
    /// Deflate new blobs before writing them.
    pub compress_blobs: bool,
    /// Encoding of rows written without the `utf-8` flag, e.g. `windows-1252`.
    pub legacy_encoding: Option<String>,
    /// Lifetime of cached blob text, in seconds. Zero disables expiry.
    pub cache_expiry_secs: u64,
    /// Write new blob payloads to the external store and keep only a pointer
    /// in the row.
    pub use_external_store: bool,
    /// Legacy encoding applied to externally stored payloads.
    pub external_encoding: ExternalEncoding,
}

impl Default for BlobStoreConfig {
    fn default() -> Self {
        Self {
            compress_blobs: false,
            legacy_encoding: None,
            cache_expiry_secs: DEFAULT_CACHE_EXPIRY_SECS,
            use_external_store: false,
            external_encoding: ExternalEncoding::Inherit,
        }
    }
}

impl BlobStoreConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_expiry_secs)
    }

    /// The legacy encoding label for payloads read from external stores.
    pub fn external_legacy_encoding(&self) -> Option<&str> {
        match &self.external_encoding {
            ExternalEncoding::Inherit => self.legacy_encoding.as_deref(),
            ExternalEncoding::Utf8 => None,
            ExternalEncoding::Label(label) => Some(label),
        }
    }
}

/// Top-level configuration file: blob store policy plus external clusters.
///
/// ```toml
/// [store]
/// compress_blobs = true
/// legacy_encoding = "windows-1252"
///
/// [external]
/// protocols = ["DB"]
/// write_stores = ["DB://cluster1"]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrataConfig {
    pub store: BlobStoreConfig,
    pub external: ExternalStoreConfig,
}

impl StrataConfig {
    pub fn from_toml_str(source: &str) -> StoreResult<Self> {
        toml::from_str(source).map_err(|e| StoreError::Config(e.to_string()))
    }

    pub fn from_file(path: &Path) -> StoreResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn to_toml_string(&self) -> StoreResult<String> {
        toml::to_string(self).map_err(|e| StoreError::Config(e.to_string()))
    }
}
