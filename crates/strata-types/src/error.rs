use thiserror::Error;

/// Structural errors produced while decoding a blob address.
///
/// These are never retried: the address itself is wrong.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("malformed blob address {address:?}: {reason}")]
    Malformed { address: String, reason: String },

    #[error("expected a text id in address {address:?}")]
    InvalidTextId { address: String },

    #[error("address {address:?} has schema {actual:?}, expected {expected:?}")]
    WrongSchema {
        address: String,
        expected: String,
        actual: String,
    },
}

pub type AddressResult<T> = Result<T, AddressError>;
