//! Host link framing: OSC 1.0 messages inside SLIP frames.
//!
//! The scheduler never touches bytes from the host link directly; it sees
//! decoded [`Message`]s and typed [`Outbound`] replies through the
//! [`Transport`](crate::io::Transport) trait. This module is the codec a
//! transport implementation uses underneath.
//!
//! ```text
//! serial bytes ──► SlipDecoder ──► osc::decode ──► Message ──► Router
//! Outbound ──► Message ──► osc::encode ──► slip::encode ──► serial bytes
//! ```

mod message;
pub mod osc;
pub mod slip;

pub use message::{Arg, Message, Outbound, MAX_ADDRESS_LEN, MAX_ARGS, MAX_BLOB_LEN};
pub use slip::SlipDecoder;

/// Largest OSC packet this device builds or accepts.
pub const MAX_PACKET_LEN: usize = 128;

/// Largest SLIP-encoded frame: every byte escaped plus two delimiters.
pub const MAX_FRAME_LEN: usize = MAX_PACKET_LEN * 2 + 2;

/// Encode `outbound` as a complete SLIP frame into `out`.
///
/// Returns the number of bytes written.
pub fn encode_frame(outbound: &Outbound, out: &mut [u8]) -> Result<usize, crate::WireError> {
    let mut packet = [0u8; MAX_PACKET_LEN];
    let len = osc::encode(&outbound.to_message(), &mut packet)?;
    slip::encode(&packet[..len], out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outbound_frame_decodes_back_to_message() {
        let mut frame = [0u8; MAX_FRAME_LEN];
        let n = encode_frame(
            &Outbound::Key {
                index: 3,
                value: 100,
            },
            &mut frame,
        )
        .unwrap();

        let mut slip = SlipDecoder::<MAX_PACKET_LEN>::new();
        let mut decoded = None;
        for &b in &frame[..n] {
            if let Ok(Some(packet)) = slip.push(b) {
                decoded = Some(osc::decode(packet).unwrap());
            }
        }
        let msg = decoded.expect("frame should complete");
        assert_eq!(msg.address(), "/key");
        assert_eq!(msg.int(0), Some(3));
        assert_eq!(msg.int(1), Some(100));
    }
}
