//! Driver abstraction module.
//!
//! Provides the NetworkDriver trait and the VirtIO-net implementation.

pub mod traits;
pub mod virtio;

// Re-exports
pub use traits::{NetworkDriver, RxHandler};
pub use virtio::{Net, NetOptions, Transport};
