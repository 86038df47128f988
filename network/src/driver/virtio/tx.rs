//! VirtIO TX logic.
//!
//! Fire-and-forget transmit - never wait for completion!

use crate::types::VirtioNetHdr;

use super::queue::{Producer, PushError};

/// Queue a frame on transmitq1 behind a zeroed header of `header_len` bytes.
///
/// # Returns
/// - `true`: entry queued, caller should ring the doorbell
/// - `false`: frame dropped (ring full or frame too large)
pub fn transmit(tx: &Producer, header_len: usize, frame: &[u8]) -> bool {
    let mut buf = VirtioNetHdr::zeroed().encode(header_len);
    buf.extend_from_slice(frame);

    match tx.push(buf) {
        Ok(()) => true,
        Err(PushError::Full(_)) => {
            log::warn!("virtio-net: tx ring full, dropping {} byte frame", frame.len());
            false
        }
        Err(PushError::TooLong { len, entry_len }) => {
            log::warn!("virtio-net: tx entry {} exceeds {} bytes, dropping", len, entry_len);
            false
        }
    }
}
