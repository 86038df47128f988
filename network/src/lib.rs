//! VirtIO network driver
//!
//! Drives a VirtIO-net device over an abstract ring transport and bridges its
//! Ethernet frames to the smoltcp TCP/IP stack.

#![no_std]

extern crate alloc;

pub mod driver;
pub mod error;
pub mod stack;
pub mod types;

#[cfg(test)]
mod testing;

pub use driver::virtio::{Config, ConfigLayout, Features, RingLayout};
pub use driver::{Net, NetOptions, NetworkDriver, RxHandler, Transport};
pub use error::{ConfigUnavailable, NetworkError, Result};
pub use stack::{ChannelEndpoint, Interface, InterfaceConfig, LinkEndpoint, Nic};
pub use types::{Frame, MacAddress};
