use thiserror::Error;

/// Errors from the flag pipeline.
///
/// Everything except [`CodecError::Compression`] and
/// [`CodecError::UnknownEncoding`] describes bad stored data rather than a
/// failure of the system.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("decompression failed: {0}")]
    Decompression(String),

    #[error("compression failed: {0}")]
    Compression(String),

    #[error("inflated payload exceeds {max} bytes")]
    TooLarge { max: usize },

    #[error("unknown legacy encoding: {0}")]
    UnknownEncoding(String),

    #[error("payload is not valid UTF-8")]
    InvalidUtf8,

    #[error("invalid envelope: {0}")]
    BadEnvelope(String),

    #[error("envelope has no item {0:?}")]
    MissingItem(String),

    #[error("blob is flagged as corrupt")]
    FlaggedCorrupt,
}

impl CodecError {
    /// Returns `true` for errors caused by the stored payload itself.
    pub fn is_data_error(&self) -> bool {
        !matches!(self, Self::Compression(_) | Self::UnknownEncoding(_))
    }
}

pub type CodecResult<T> = Result<T, CodecError>;
