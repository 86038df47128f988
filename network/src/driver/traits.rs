//! Driver trait definitions.
//!
//! The link bridge talks to NIC drivers only through [`NetworkDriver`].

use alloc::sync::Arc;

/// Callback invoked with every received Ethernet frame (no legacy header).
pub type RxHandler = Arc<dyn Fn(&[u8]) + Send + Sync>;

/// Core network device interface.
pub trait NetworkDriver: Send + Sync {
    /// Transmit an Ethernet frame.
    ///
    /// # Contract
    /// - MUST return immediately (fire-and-forget)
    /// - Frames that cannot be queued are dropped
    fn transmit(&self, frame: &[u8]);

    /// Install the handler the receive loop dispatches frames to.
    fn set_rx_handler(&self, handler: RxHandler);
}
