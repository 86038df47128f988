//! VirtIO-net driver.
//!
//! ```text
//!   Net::start ──▶ receive loop ──▶ rx::receive ──▶ RxHandler
//!   Net::tx    ──▶ tx::transmit ──▶ transmitq1 ──▶ Transport::notify
//! ```

pub mod config;
pub mod driver;
pub mod init;
pub mod queue;
pub mod rx;
pub mod transport;
pub mod tx;

// Re-exports
pub use config::{
    Config, ConfigLayout, Features, LinkParams, NetOptions, DEFAULT_HEADER_LEN,
    VIRTIO_NET_DEVICE_ID,
};
pub use driver::{Net, RingLayout};
pub use queue::{Consumer, Direction, Producer, PushError, QueueEnd};
pub use transport::{Transport, RXQ, TXQ};
