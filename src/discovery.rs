//! Answers multicast discovery probes.
//!
//! A client looking for a server sends a 2-byte probe to the discovery
//! group. While a session slot is free the server answers the sender with
//! its protocol version and TCP port:
//!
//! ```text
//! probe:  | version | any |
//! reply:  | version | port hi | port lo |
//! ```

use crate::protocol::PROTOCOL_VERSION;
use tracing::trace;

/// Byte length of a well-formed probe.
pub const PROBE_LEN: usize = 2;

/// Byte length of a reply.
pub const REPLY_LEN: usize = 3;

/// Reply to send for `probe`, if any.
///
/// Malformed probes and probes received while the pool is full get no
/// answer.
pub fn respond(probe: &[u8], has_free_slot: bool, port: u16) -> Option<[u8; REPLY_LEN]> {
    if probe.len() != PROBE_LEN || probe[0] != PROTOCOL_VERSION {
        trace!(len = probe.len(), "Dropping malformed probe");
        return None;
    }
    if !has_free_slot {
        trace!("Pool full, not answering probe");
        return None;
    }
    let [hi, lo] = port.to_be_bytes();
    Some([PROTOCOL_VERSION, hi, lo])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_carries_port_in_network_order() {
        assert_eq!(
            respond(&[PROTOCOL_VERSION, 0], true, 0x1f90),
            Some([PROTOCOL_VERSION, 0x1f, 0x90])
        );
    }

    #[test]
    fn test_wrong_length_dropped() {
        assert_eq!(respond(&[PROTOCOL_VERSION], true, 1), None);
        assert_eq!(respond(&[PROTOCOL_VERSION, 0, 0], true, 1), None);
        assert_eq!(respond(&[], true, 1), None);
    }

    #[test]
    fn test_wrong_version_dropped() {
        assert_eq!(respond(&[PROTOCOL_VERSION + 1, 0], true, 1), None);
    }

    #[test]
    fn test_full_pool_silent() {
        assert_eq!(respond(&[PROTOCOL_VERSION, 0], false, 1), None);
    }
}
