//! Error types for IBC Tickets Core.

use thiserror::Error;

/// Errors raised while encoding or decoding stored values.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("empty value")]
    Empty,

    #[error("malformed value: {0}")]
    Malformed(String),

    #[error("encoding error: {0}")]
    Encoding(String),
}

impl From<serde_json::Error> for CodecError {
    fn from(e: serde_json::Error) -> Self {
        CodecError::Malformed(e.to_string())
    }
}

/// Validation errors for keys, owners and coin amounts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unable to resolve chain name and tx hash from key {0:?}")]
    MalformedKey(String),

    #[error("key component {0} must not be empty")]
    EmptyComponent(&'static str),

    #[error("key component {component} must not contain {forbidden:?}: {value:?}")]
    ForbiddenChar {
        component: &'static str,
        forbidden: char,
        value: String,
    },

    #[error("owner is not valid hex: {0:?}")]
    InvalidOwner(String),

    #[error("amount is not a non-negative integer: {0:?}")]
    InvalidAmount(String),

    #[error("invalid denomination: {0:?}")]
    InvalidDenom(String),

    #[error("invalid coin: {0:?}")]
    InvalidCoin(String),

    #[error("amount overflow for denomination {0}")]
    AmountOverflow(String),
}
