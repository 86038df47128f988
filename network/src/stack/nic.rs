//! Ethernet bridge between a NIC driver and a link endpoint.
//!
//! ```text
//!   driver rx ──▶ Nic::rx ──parse 14-byte header──▶ LinkEndpoint::inject_inbound
//!   LinkEndpoint notify ──▶ Nic::tx ──synthesize header──▶ NetworkDriver::transmit
//! ```

use alloc::sync::{Arc, Weak};
use alloc::vec::Vec;

use crate::driver::NetworkDriver;
use crate::error::{NetworkError, Result};
use crate::types::{EthernetHeader, Frame, MacAddress, ETH_HLEN};

use super::link::{LinkEndpoint, OutboundNotify, PacketBuffer};

/// Virtual Ethernet instance bound to a physical device.
pub struct Nic<E: LinkEndpoint, D: NetworkDriver> {
    /// Protocol stack side.
    link: Option<Arc<E>>,
    /// Device the frames go to; the bridge can run detached.
    device: Option<Arc<D>>,
    /// Source address of transmitted frames.
    mac: MacAddress,
}

impl<E, D> Nic<E, D>
where
    E: LinkEndpoint + 'static,
    D: NetworkDriver + 'static,
{
    pub fn new(link: Option<Arc<E>>, device: Option<Arc<D>>, mac: MacAddress) -> Self {
        Self { link, device, mac }
    }

    pub fn mac_address(&self) -> MacAddress {
        self.mac
    }

    pub fn link(&self) -> Option<&Arc<E>> {
        self.link.as_ref()
    }

    pub fn device(&self) -> Option<&Arc<D>> {
        self.device.as_ref()
    }

    /// Wire the bridge to its device and endpoint.
    ///
    /// Received frames go straight to the endpoint; outbound notifications
    /// from the endpoint transmit synchronously on the device.
    pub fn init(&self) -> Result<()> {
        let link = self.link.as_ref().ok_or(NetworkError::MissingEndpoint)?;

        let device = match &self.device {
            Some(device) => device,
            None => return Ok(()),
        };

        let rx_link = link.clone();
        device.set_rx_handler(Arc::new(move |frame: &[u8]| deliver(&*rx_link, frame)));

        link.add_notify(Arc::new(Notification {
            link: Arc::downgrade(link),
            device: Arc::downgrade(device),
            mac: self.mac,
        }));

        log::debug!("nic {}: bridge attached", self.mac);
        Ok(())
    }

    /// Receive a single Ethernet frame from the device.
    pub fn rx(&self, frame: &[u8]) {
        if let Some(link) = &self.link {
            deliver(&**link, frame);
        }
    }

    /// Render the next outbound packet as an Ethernet frame.
    pub fn tx(&self) -> Option<Frame> {
        render(&**self.link.as_ref()?, self.mac)
    }
}

/// Outbound notification sink registered by `Nic::init`.
struct Notification<E, D> {
    link: Weak<E>,
    device: Weak<D>,
    mac: MacAddress,
}

impl<E: LinkEndpoint, D: NetworkDriver> OutboundNotify for Notification<E, D> {
    fn outbound_ready(&self) {
        let (link, device) = match (self.link.upgrade(), self.device.upgrade()) {
            (Some(link), Some(device)) => (link, device),
            _ => return,
        };

        if let Some(frame) = render(&*link, self.mac) {
            device.transmit(&frame);
        }
    }
}

fn deliver<E: LinkEndpoint + ?Sized>(link: &E, frame: &[u8]) {
    let hdr = match EthernetHeader::parse(frame) {
        Some(hdr) => hdr,
        None => {
            log::trace!("nic: dropping {} byte runt", frame.len());
            return;
        }
    };

    let mut pkt = PacketBuffer::new(ETH_HLEN, &frame[ETH_HLEN..]);
    pkt.link_header_mut().copy_from_slice(&frame[..ETH_HLEN]);

    link.inject_inbound(hdr.ethertype, pkt);
}

fn render<E: LinkEndpoint + ?Sized>(link: &E, src: MacAddress) -> Option<Frame> {
    let pkt = link.read()?;

    let hdr = EthernetHeader::new(pkt.remote_link_address, src, pkt.protocol);

    let mut buf = Vec::with_capacity(ETH_HLEN + pkt.payload_len());
    buf.extend_from_slice(&hdr.to_bytes());
    for segment in pkt.as_slices() {
        buf.extend_from_slice(segment);
    }

    Some(buf)
}
