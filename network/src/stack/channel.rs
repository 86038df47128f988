//! Queue-backed link endpoint and its smoltcp device adapter.
//!
//! ```text
//!   Nic ──inject_inbound──▶ inbound ──▶ StackDevice::receive ──▶ smoltcp
//!   smoltcp ──TxToken──▶ write_packet ──▶ outbound ──notify──▶ Nic
//! ```

use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;

use crossbeam_queue::ArrayQueue;
use smoltcp::phy::{Device, DeviceCapabilities, Medium, RxToken, TxToken};
use smoltcp::time::Instant;
use spin::Mutex;

use crate::types::{EthernetHeader, MacAddress, ETH_HLEN};

use super::link::{LinkEndpoint, OutboundNotify, OutboundPacket, PacketBuffer};

/// Bounded in-memory link endpoint.
pub struct ChannelEndpoint {
    inbound: ArrayQueue<(u16, PacketBuffer)>,
    outbound: ArrayQueue<OutboundPacket>,
    sinks: Mutex<Vec<Arc<dyn OutboundNotify>>>,
    mtu: usize,
    mac: MacAddress,
}

impl ChannelEndpoint {
    /// Endpoint with `capacity` entries per direction (at least one).
    pub fn new(capacity: usize, mtu: usize, mac: MacAddress) -> Self {
        let capacity = capacity.max(1);
        Self {
            inbound: ArrayQueue::new(capacity),
            outbound: ArrayQueue::new(capacity),
            sinks: Mutex::new(Vec::new()),
            mtu,
            mac,
        }
    }

    pub fn mtu(&self) -> usize {
        self.mtu
    }

    pub fn mac_address(&self) -> MacAddress {
        self.mac
    }

    /// Next inbound packet with its network protocol.
    pub fn read_inbound(&self) -> Option<(u16, PacketBuffer)> {
        self.inbound.pop()
    }

    /// Queue an outbound packet without telling the sinks.
    pub fn queue_outbound(&self, packet: OutboundPacket) -> bool {
        match self.outbound.push(packet) {
            Ok(()) => true,
            Err(packet) => {
                log::warn!(
                    "channel: outbound queue full, dropping {} byte packet",
                    packet.payload_len()
                );
                false
            }
        }
    }

    /// Queue an outbound packet and run every sink before returning.
    pub fn write_packet(&self, packet: OutboundPacket) -> bool {
        if !self.queue_outbound(packet) {
            return false;
        }
        self.notify_all();
        true
    }

    pub fn notify_all(&self) {
        // Sinks may read back into this endpoint
        let sinks = self.sinks.lock().clone();
        for sink in sinks {
            sink.outbound_ready();
        }
    }

    /// Number of registered sinks.
    pub fn notify_sinks(&self) -> usize {
        self.sinks.lock().len()
    }

    pub fn outbound_full(&self) -> bool {
        self.outbound.is_full()
    }
}

impl LinkEndpoint for ChannelEndpoint {
    fn inject_inbound(&self, protocol: u16, packet: PacketBuffer) {
        if let Err((_, packet)) = self.inbound.push((protocol, packet)) {
            log::trace!("channel: inbound queue full, dropping {} byte packet", packet.len());
        }
    }

    fn read(&self) -> Option<OutboundPacket> {
        self.outbound.pop()
    }

    fn add_notify(&self, sink: Arc<dyn OutboundNotify>) {
        self.sinks.lock().push(sink);
    }
}

/// Exposes a [`ChannelEndpoint`] to smoltcp as an Ethernet device.
pub struct StackDevice {
    link: Arc<ChannelEndpoint>,
}

impl StackDevice {
    pub fn new(link: Arc<ChannelEndpoint>) -> Self {
        Self { link }
    }

    pub fn link(&self) -> &Arc<ChannelEndpoint> {
        &self.link
    }
}

impl Device for StackDevice {
    type RxToken<'a> = StackRxToken where Self: 'a;
    type TxToken<'a> = StackTxToken<'a> where Self: 'a;

    fn capabilities(&self) -> DeviceCapabilities {
        let mut caps = DeviceCapabilities::default();
        caps.max_transmission_unit = self.link.mtu();
        caps.medium = Medium::Ethernet;
        caps
    }

    fn receive(&mut self, _timestamp: Instant) -> Option<(Self::RxToken<'_>, Self::TxToken<'_>)> {
        // Link header is still in front of the payload
        let (_, packet) = self.link.read_inbound()?;
        Some((
            StackRxToken {
                frame: packet.into_bytes(),
            },
            StackTxToken { link: &self.link },
        ))
    }

    fn transmit(&mut self, _timestamp: Instant) -> Option<Self::TxToken<'_>> {
        if self.link.outbound_full() {
            return None;
        }
        Some(StackTxToken { link: &self.link })
    }
}

pub struct StackRxToken {
    frame: Vec<u8>,
}

impl RxToken for StackRxToken {
    fn consume<R, F>(mut self, f: F) -> R
    where
        F: FnOnce(&mut [u8]) -> R,
    {
        f(&mut self.frame)
    }
}

pub struct StackTxToken<'a> {
    link: &'a ChannelEndpoint,
}

impl<'a> TxToken for StackTxToken<'a> {
    fn consume<R, F>(self, len: usize, f: F) -> R
    where
        F: FnOnce(&mut [u8]) -> R,
    {
        let mut buffer = vec![0u8; len];
        let result = f(&mut buffer);

        match EthernetHeader::parse(&buffer) {
            Some(hdr) => {
                let payload = buffer.split_off(ETH_HLEN);
                let packet = OutboundPacket::new(hdr.dst, hdr.ethertype, payload);
                self.link.write_packet(packet);
            }
            None => log::trace!("channel: stack emitted {} byte runt", len),
        }

        result
    }
}
