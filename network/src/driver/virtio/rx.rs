//! VirtIO RX logic.
//!
//! Poll-based receive - never block!

use crate::types::Frame;

use super::queue::Consumer;

/// Pop one entry from receiveq1 and strip the legacy header.
///
/// # Returns
/// - `Some(frame)`: Ethernet frame (may be empty if the entry was exactly a header)
/// - `None`: nothing pending, or a runt entry that was dropped
pub fn receive(rx: &Consumer, header_len: usize) -> Option<Frame> {
    let mut buf = rx.pop()?;

    if buf.len() < header_len {
        log::trace!("virtio-net: dropping {} byte rx entry", buf.len());
        return None;
    }

    buf.drain(..header_len);
    Some(buf)
}
