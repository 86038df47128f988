//! VirtIO transport abstraction.
//!
//! The register-level transport (MMIO or PCI) is provided by the platform.
//! The driver only needs queue sizing, queue hand-over, readiness,
//! doorbells and the device configuration region.
//!
//! All methods take `&self`: register accesses are volatile I/O and the
//! transport is shared between the receive loop and the transmit path.

use alloc::vec::Vec;

use super::queue::QueueEnd;

/// receiveq1
pub const RXQ: u16 = 0;
/// transmitq1
pub const TXQ: u16 = 1;

pub trait Transport: Send + Sync {
    /// Reset the device and negotiate features.
    ///
    /// Returns the subset of `requested` the device accepted.
    fn negotiate(&self, requested: u64) -> u64;

    /// VirtIO device type.
    fn device_id(&self) -> u32;

    /// Maximum number of entries the device supports for `queue`.
    fn max_queue_size(&self, queue: u16) -> u16;

    /// Whether `queue` is already enabled.
    fn queue_ready(&self, queue: u16) -> bool;

    /// Program the number of entries used for `queue`.
    fn set_queue_size(&self, queue: u16, size: u16);

    /// Hand the device end of a ring to the transport.
    fn set_queue(&self, queue: u16, end: QueueEnd);

    /// Mark the programmed queues ready (DRIVER_OK).
    fn set_ready(&self);

    /// Ring the doorbell of `queue`.
    fn notify(&self, queue: u16);

    /// Read `size` bytes of device configuration space.
    fn read_config(&self, size: usize) -> Vec<u8>;
}
