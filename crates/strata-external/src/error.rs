use strata_codec::CodecError;
use thiserror::Error;

/// Errors from external store operations.
#[derive(Debug, Error)]
pub enum ExternalError {
    /// The pointer does not have the `protocol://cluster/id` shape.
    #[error("malformed external pointer {pointer:?}: {reason}")]
    MalformedPointer { pointer: String, reason: String },

    /// No backend is registered for the protocol.
    #[error("no external store backend for protocol {0:?}")]
    UnknownProtocol(String),

    /// The protocol has a backend but is not enabled in configuration.
    #[error("external store protocol {0:?} is not enabled")]
    ProtocolDisabled(String),

    /// The backend does not know the cluster.
    #[error("unknown external cluster {0:?}")]
    UnknownCluster(String),

    /// The cluster does not accept writes.
    #[error("external cluster {0:?} is read-only")]
    ReadOnly(String),

    /// The backend failed while reading or writing.
    #[error("external store failure at {location}: {reason}")]
    Backend { location: String, reason: String },

    /// No write stores are configured.
    #[error("no external write stores configured")]
    NoWriteStores,

    /// Every configured write store rejected the write.
    #[error("all external write stores failed: {0}")]
    AllWritesFailed(String),

    /// The fetched payload could not be decoded.
    #[error("external payload could not be decoded: {0}")]
    Codec(#[from] CodecError),
}

impl ExternalError {
    /// Returns `true` if the pointer or the fetched bytes are at fault, as
    /// opposed to the store being unreachable or misconfigured.
    pub fn is_data_error(&self) -> bool {
        matches!(self, Self::MalformedPointer { .. } | Self::Codec(_))
    }
}

pub type ExternalResult<T> = Result<T, ExternalError>;
