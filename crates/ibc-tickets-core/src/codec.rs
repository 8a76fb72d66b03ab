//! JSON wire codec for tickets.
//!
//! ```text
//! {"owner":string,"info":string,"height":number,"status":string,
//!  "tx_hashes":[{"Chain":string,"Status":string,"TxHash":string}],"error":string}
//! ```
//!
//! Every field except `status` is omitted when empty. Field order is fixed,
//! so equal tickets always encode to identical bytes.

use crate::error::CodecError;
use crate::ticket::Ticket;

/// Encode a ticket to its stored JSON form.
pub fn encode_ticket(ticket: &Ticket) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(ticket).map_err(|e| CodecError::Encoding(e.to_string()))
}

/// Decode a stored value. Empty and malformed values are rejected.
///
/// `status` is required. Writers that omit it for an empty status, as some
/// older services do for derived tickets, produce values this rejects with
/// a decode error.
pub fn decode_ticket(bytes: &[u8]) -> Result<Ticket, CodecError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(CodecError::Empty);
    }
    Ok(serde_json::from_slice(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::OriginKey;
    use crate::ticket::{TicketLink, TicketStatus, TxHashEntry};
    use crate::types::OwnerId;

    #[test]
    fn test_decode_requires_status() {
        let value = br#"{"owner":"6164647231","info":"cosmoshub/ABC","height":7}"#;
        assert!(matches!(decode_ticket(value), Err(CodecError::Malformed(ref msg)) if msg.contains("status")));
    }

    #[test]
    fn test_encode_pending_omits_empty_fields() {
        let ticket = Ticket::pending(OwnerId::from_identity("addr1"));
        let json = String::from_utf8(encode_ticket(&ticket).unwrap()).unwrap();
        assert_eq!(json, r#"{"owner":"6164647231","status":"pending"}"#);
    }

    #[test]
    fn test_encode_derived_ticket() {
        let ticket = Ticket::derived(
            OriginKey::new("cosmoshub", "ABC123").unwrap(),
            Some(OwnerId::from_identity("addr1")),
            TxHashEntry::new("cosmoshub", TicketStatus::Transit, "ABC123"),
            150,
        );
        let json = String::from_utf8(encode_ticket(&ticket).unwrap()).unwrap();
        assert_eq!(
            json,
            r#"{"owner":"6164647231","info":"cosmoshub/ABC123","height":150,"status":"transit","tx_hashes":[{"Chain":"cosmoshub","Status":"transit","TxHash":"ABC123"}]}"#
        );
    }

    #[test]
    fn test_decode_roundtrip_failed() {
        let ticket = Ticket::failed("insufficient funds", 12);
        let decoded = decode_ticket(&encode_ticket(&ticket).unwrap()).unwrap();
        assert_eq!(decoded, ticket);
    }

    #[test]
    fn test_decode_empty_is_error() {
        assert!(matches!(decode_ticket(b""), Err(CodecError::Empty)));
        assert!(matches!(decode_ticket(b"  \n"), Err(CodecError::Empty)));
    }

    #[test]
    fn test_decode_malformed_is_error() {
        assert!(matches!(decode_ticket(b"{not json"), Err(CodecError::Malformed(_))));
        assert!(matches!(
            decode_ticket(br#"{"owner":"6164647231"}"#),
            Err(CodecError::Malformed(_))
        ));
        assert!(matches!(
            decode_ticket(br#"{"status":"exploded"}"#),
            Err(CodecError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_rejects_bad_owner_and_info() {
        assert!(decode_ticket(br#"{"owner":"xyz","status":"pending"}"#).is_err());
        assert!(decode_ticket(br#"{"info":"not-an-origin","status":"transit"}"#).is_err());
    }

    #[test]
    fn test_decode_tolerates_unknown_fields() {
        let ticket = decode_ticket(br#"{"status":"complete","height":7,"extra":true}"#).unwrap();
        assert_eq!(ticket.status, TicketStatus::Complete);
        assert_eq!(ticket.height, 7);
        assert_eq!(ticket.link, TicketLink::Origin);
    }
}
