use thiserror::Error;

/// Errors from row store operations.
#[derive(Debug, Error)]
pub enum RowError {
    /// The store could not be reached or failed mid-query.
    #[error("row store unavailable: {0}")]
    Unavailable(String),

    /// The store does not accept writes.
    #[error("row store is read-only")]
    ReadOnly,

    /// Text ids start at 1.
    #[error("invalid text id {0}")]
    InvalidTextId(u64),
}

pub type RowResult<T> = Result<T, RowError>;
