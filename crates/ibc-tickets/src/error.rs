//! Error types for the ticket store.

use ibc_tickets_backend::BackendError;
use ibc_tickets_core::{CachedEntry, CodecError, ValidationError};
use thiserror::Error;

/// Errors that can occur during ticket store operations.
#[derive(Debug, Error)]
pub enum TicketStoreError {
    /// No live value under the key.
    #[error("ticket not found: {key}")]
    NotFound { key: String },

    /// A stored value could not be decoded.
    #[error("cannot decode value at {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: CodecError,
    },

    /// Invalid key, owner or coin input.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The backend call failed or timed out.
    #[error("backend {op} failed for {key}: {source}")]
    Backend {
        op: &'static str,
        key: String,
        #[source]
        source: BackendError,
    },

    /// A cached chain snapshot is absent.
    #[error("cannot fetch {0} from cache")]
    CacheMiss(CachedEntry),

    /// A chase operation was given a ticket with no origin link.
    #[error("ticket at {key} is not a derived ticket")]
    NotDerived { key: String },
}

impl TicketStoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, TicketStoreError::NotFound { .. } | TicketStoreError::CacheMiss(_))
    }
}

/// Result type for ticket store operations.
pub type Result<T> = std::result::Result<T, TicketStoreError>;
