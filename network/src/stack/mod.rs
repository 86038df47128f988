//! Link-layer integration with the protocol stack.
//!
//! This module provides the bridge between the VirtIO-net driver and the
//! smoltcp TCP/IP stack.
//!
//! # Components
//!
//! - [`LinkEndpoint`] - Packet consumer contract seen by the bridge
//! - [`Nic`] - Ethernet framing between a `NetworkDriver` and a `LinkEndpoint`
//! - [`ChannelEndpoint`] - Queue-backed endpoint, exposed to smoltcp via [`StackDevice`]
//! - [`Interface`] - Static IPv4 smoltcp interface over a `Net` device

mod channel;
mod interface;
mod link;
mod nic;

pub use channel::{ChannelEndpoint, StackDevice, StackRxToken, StackTxToken};
pub use interface::{Interface, InterfaceConfig, QUEUE_LEN};
pub use link::{LinkEndpoint, OutboundNotify, OutboundPacket, PacketBuffer};
pub use nic::Nic;
