//! Link endpoint contract between the frame bridge and a protocol stack.

use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;

use crate::types::MacAddress;

/// Inbound packet handed to the protocol stack.
///
/// The link header sits in a reserved region in front of the payload, so
/// `as_bytes()` is the original frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketBuffer {
    data: Vec<u8>,
    reserved: usize,
}

impl PacketBuffer {
    /// Buffer with `reserve` zeroed header bytes followed by `payload`.
    pub fn new(reserve: usize, payload: &[u8]) -> Self {
        let mut data = vec![0u8; reserve];
        data.extend_from_slice(payload);
        Self { data, reserved: reserve }
    }

    /// Reserved link-header region.
    pub fn link_header(&self) -> &[u8] {
        &self.data[..self.reserved]
    }

    pub fn link_header_mut(&mut self) -> &mut [u8] {
        &mut self.data[..self.reserved]
    }

    pub fn payload(&self) -> &[u8] {
        &self.data[self.reserved..]
    }

    /// Header region followed by payload.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Outbound packet produced by the protocol stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundPacket {
    /// Link address of the next hop, as resolved by the stack.
    pub remote_link_address: MacAddress,
    /// Network protocol number (EtherType).
    pub protocol: u16,
    /// Payload segments, in wire order.
    pub segments: Vec<Vec<u8>>,
}

impl OutboundPacket {
    pub fn new(remote_link_address: MacAddress, protocol: u16, payload: Vec<u8>) -> Self {
        Self {
            remote_link_address,
            protocol,
            segments: vec![payload],
        }
    }

    pub fn as_slices(&self) -> impl Iterator<Item = &[u8]> {
        self.segments.iter().map(|s| s.as_slice())
    }

    /// Total payload length over all segments.
    pub fn payload_len(&self) -> usize {
        self.segments.iter().map(|s| s.len()).sum()
    }
}

/// Sink told when a new outbound packet was queued.
pub trait OutboundNotify: Send + Sync {
    fn outbound_ready(&self);
}

/// Packet consumer side of the link.
pub trait LinkEndpoint: Send + Sync {
    /// Deliver an inbound packet tagged with its network protocol.
    fn inject_inbound(&self, protocol: u16, packet: PacketBuffer);

    /// Next queued outbound packet, if any.
    fn read(&self) -> Option<OutboundPacket>;

    /// Register a sink invoked whenever an outbound packet is queued.
    fn add_notify(&self, sink: Arc<dyn OutboundNotify>);
}
