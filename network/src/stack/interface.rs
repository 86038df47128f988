//! smoltcp interface wired to a VirtIO-net device.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Interface                              │
//! │  (smoltcp Interface + socket set, static IPv4)              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │              StackDevice / ChannelEndpoint                  │
//! │  (inbound + outbound packet queues)                         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Nic                                  │
//! │  (Ethernet header parse / synthesis)                        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Net<T: Transport>                      │
//! │  (receiveq1 / transmitq1)                                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let net = Arc::new(Net::new(transport, NetOptions::default()));
//! let config = InterfaceConfig::static_ip("10.0.2.15", "255.255.255.0", Some("10.0.2.2"));
//! let mut iface = Interface::init(net.clone(), &config)?;
//!
//! // Receive loop on its own task
//! spawn(move || net.start(true));
//!
//! loop {
//!     iface.poll(get_time_ms());
//! }
//! ```

use alloc::sync::Arc;
use alloc::vec;
use core::net::Ipv4Addr;

use smoltcp::iface::{Config, Interface as IpInterface, SocketSet};
use smoltcp::time::Instant;
use smoltcp::wire::{EthernetAddress, IpAddress, IpCidr, Ipv4Address};

use crate::driver::virtio::{Features, Net, Transport};
use crate::error::{ConfigUnavailable, NetworkError, Result};
use crate::types::MacAddress;

use super::channel::{ChannelEndpoint, StackDevice};
use super::nic::Nic;

/// Entries per direction in the endpoint queues.
pub const QUEUE_LEN: usize = 256;

/// Static IPv4 configuration in dotted-quad form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceConfig<'a> {
    pub ip: &'a str,
    pub netmask: &'a str,
    pub gateway: Option<&'a str>,
}

impl<'a> InterfaceConfig<'a> {
    pub const fn static_ip(ip: &'a str, netmask: &'a str, gateway: Option<&'a str>) -> Self {
        Self {
            ip,
            netmask,
            gateway,
        }
    }
}

/// Parsed form of [`InterfaceConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Addressing {
    ip: Ipv4Addr,
    prefix_len: u8,
    gateway: Option<Ipv4Addr>,
}

impl Addressing {
    fn parse(config: &InterfaceConfig<'_>) -> Result<Self> {
        let ip = parse_addr(config.ip)?;
        let prefix_len = prefix_len(parse_addr(config.netmask)?)?;
        let gateway = config.gateway.map(parse_addr).transpose()?;
        Ok(Self {
            ip,
            prefix_len,
            gateway,
        })
    }
}

fn parse_addr(s: &str) -> Result<Ipv4Addr> {
    s.trim().parse().map_err(|_| NetworkError::InvalidAddress)
}

/// Prefix length of a contiguous netmask.
fn prefix_len(mask: Ipv4Addr) -> Result<u8> {
    let bits = u32::from(mask);
    let ones = bits.leading_ones();
    if bits.count_ones() != ones {
        return Err(NetworkError::InvalidAddress);
    }
    Ok(ones as u8)
}

/// Station address from the device configuration.
///
/// The mac field only means something under `VIRTIO_NET_F_MAC`, and a
/// zero or group address cannot source frames.
fn station_address<T: Transport>(net: &Net<T>) -> Result<MacAddress> {
    if !net.features().contains(Features::MAC) {
        return Err(ConfigUnavailable::MacNotOffered.into());
    }
    let mac = net.config()?.mac;
    if !mac.is_unicast() {
        return Err(ConfigUnavailable::InvalidMac(mac).into());
    }
    Ok(mac)
}

fn to_smoltcp(addr: Ipv4Addr) -> Ipv4Address {
    Ipv4Address::from_bytes(&addr.octets())
}

/// IP interface over a VirtIO-net device.
pub struct Interface<T: Transport + 'static> {
    /// Device driver.
    net: Arc<Net<T>>,
    /// Ethernet bridge between the driver and the endpoint.
    nic: Nic<ChannelEndpoint, Net<T>>,
    /// smoltcp's view of the endpoint.
    device: StackDevice,
    /// smoltcp interface.
    iface: IpInterface,
    /// Socket set.
    sockets: SocketSet<'static>,
    addressing: Addressing,
}

impl<T: Transport + 'static> Interface<T> {
    /// Bring up the device and attach a static IPv4 stack to it.
    pub fn init(net: Arc<Net<T>>, config: &InterfaceConfig<'_>) -> Result<Self> {
        net.init()?;

        let mac = station_address(&net)?;
        let addressing = Addressing::parse(config)?;

        let link = Arc::new(ChannelEndpoint::new(
            QUEUE_LEN,
            net.options().mtu as usize,
            mac,
        ));
        let mut device = StackDevice::new(link.clone());

        let smoltcp_config = Config::new(EthernetAddress(mac.0).into());
        let mut iface = IpInterface::new(smoltcp_config, &mut device, Instant::from_millis(0));

        let cidr = IpCidr::new(IpAddress::Ipv4(to_smoltcp(addressing.ip)), addressing.prefix_len);
        iface.update_ip_addrs(|addrs| {
            if addrs.push(cidr).is_err() {
                log::warn!("stack: no room for address {}", cidr);
            }
        });

        if let Some(gw) = addressing.gateway {
            if iface.routes_mut().add_default_ipv4_route(to_smoltcp(gw)).is_err() {
                log::warn!("stack: route table full, no default route via {}", gw);
            }
        }

        let nic = Nic::new(Some(link), Some(net.clone()), mac);
        nic.init()?;

        log::info!(
            "stack: {} up as {}/{}",
            mac,
            addressing.ip,
            addressing.prefix_len
        );

        Ok(Self {
            net,
            nic,
            device,
            iface,
            sockets: SocketSet::new(vec![]),
            addressing,
        })
    }

    /// Poll the interface - must be called regularly.
    ///
    /// Returns `true` if any socket activity occurred.
    pub fn poll(&mut self, timestamp_ms: u64) -> bool {
        let timestamp = Instant::from_millis(timestamp_ms as i64);
        self.iface.poll(timestamp, &mut self.device, &mut self.sockets)
    }

    pub fn sockets(&self) -> &SocketSet<'static> {
        &self.sockets
    }

    pub fn sockets_mut(&mut self) -> &mut SocketSet<'static> {
        &mut self.sockets
    }

    /// smoltcp interface, for socket calls that need its context.
    pub fn iface_mut(&mut self) -> &mut IpInterface {
        &mut self.iface
    }

    pub fn ipv4_addr(&self) -> Ipv4Addr {
        self.addressing.ip
    }

    pub fn prefix_len(&self) -> u8 {
        self.addressing.prefix_len
    }

    pub fn gateway(&self) -> Option<Ipv4Addr> {
        self.addressing.gateway
    }

    pub fn mac_address(&self) -> MacAddress {
        self.nic.mac_address()
    }

    pub fn net(&self) -> &Arc<Net<T>> {
        &self.net
    }

    pub fn link(&self) -> &Arc<ChannelEndpoint> {
        self.device.link()
    }
}
