use strata_codec::CodecError;
use strata_external::ExternalError;
use strata_rows::RowError;
use thiserror::Error;

/// Why a structurally valid address could not be resolved.
///
/// The `Display` text is the operator-facing description used in batch
/// warnings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessFailure {
    #[error("Unknown blob address schema: {schema}")]
    UnknownSchema { address: String, schema: String },

    #[error("Unable to fetch blob at {address}")]
    NotFound { address: String },

    #[error("Unable to fetch blob at {address}")]
    Unavailable { address: String, reason: String },

    #[error("Bad data in blob at {address}")]
    BadData { address: String },
}

impl AccessFailure {
    pub fn address(&self) -> &str {
        match self {
            Self::UnknownSchema { address, .. }
            | Self::NotFound { address }
            | Self::Unavailable { address, .. }
            | Self::BadData { address } => address,
        }
    }
}

/// Errors from blob store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The address is known to be bad or is structurally invalid.
    /// Never worth retrying.
    #[error("Bad blob address: {address}")]
    BadBlob { address: String, reason: String },

    /// The address is valid but its blob cannot be loaded.
    #[error("{0}")]
    BlobAccess(AccessFailure),

    #[error("row store error: {0}")]
    Row(#[from] RowError),

    #[error("external store error: {0}")]
    External(#[from] ExternalError),

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Returns `true` for failures caused by the address itself.
    pub fn is_bad_blob(&self) -> bool {
        matches!(self, Self::BadBlob { .. })
    }

    /// Returns `true` for valid addresses that could not be resolved.
    pub fn is_access_failure(&self) -> bool {
        matches!(self, Self::BlobAccess(_))
    }
}

impl From<AccessFailure> for StoreError {
    fn from(failure: AccessFailure) -> Self {
        Self::BlobAccess(failure)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
