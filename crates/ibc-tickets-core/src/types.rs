//! Strong type definitions for IBC tickets.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// The owner of a ticket, hex-encoded.
///
/// The raw owner identity is an arbitrary byte string (usually a bech32
/// address). It is stored hex-encoded so it is always a safe set name and
/// JSON string, whatever bytes the caller handed in.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    /// Encode a raw owner identity.
    pub fn from_identity(identity: impl AsRef<[u8]>) -> Self {
        Self(hex::encode(identity))
    }

    /// Wrap an already hex-encoded owner.
    pub fn from_hex(s: &str) -> Result<Self, ValidationError> {
        if s.len() % 2 != 0 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ValidationError::InvalidOwner(s.to_string()));
        }
        Ok(Self(s.to_ascii_lowercase()))
    }

    /// The hex string, which doubles as the owner-index set name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode back to the raw identity bytes.
    pub fn to_identity(&self) -> Vec<u8> {
        // from_identity/from_hex only admit valid hex.
        hex::decode(&self.0).unwrap_or_default()
    }
}

impl fmt::Debug for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OwnerId({})", self.0)
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for OwnerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
