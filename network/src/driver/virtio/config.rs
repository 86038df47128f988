//! VirtIO-net configuration, feature flags and driver options.
//!
//! # Reference
//! VirtIO Spec §5.1.3 (feature bits), §5.1.4 (device configuration layout)

use bitflags::bitflags;

use crate::error::ConfigUnavailable;
use crate::types::{MacAddress, ETH_FRAME_MAX, VIRTIO_NET_HDR_LEGACY_SIZE};

/// VirtIO device type of a network card.
pub const VIRTIO_NET_DEVICE_ID: u32 = 0x01;

/// Header length used when the options leave it unset.
pub const DEFAULT_HEADER_LEN: usize = VIRTIO_NET_HDR_LEGACY_SIZE;

// Link status
pub const STATUS_DOWN: u16 = 0;
pub const STATUS_UP: u16 = 1;

// Speed in units of 1Mbps
pub const SPEED_MIN: u32 = 0x0000_0000;
pub const SPEED_MAX: u32 = 0x7fff_ffff;

pub const DUPLEX_HALF: u8 = 0x00;
pub const DUPLEX_FULL: u8 = 0x01;

/// RSS hash types (`supported_hash_types`).
pub mod hash_types {
    pub const IPV4: u32 = 1 << 0;
    pub const TCPV4: u32 = 1 << 1;
    pub const UDPV4: u32 = 1 << 2;
    pub const IPV6: u32 = 1 << 3;
    pub const TCPV6: u32 = 1 << 4;
    pub const UDPV6: u32 = 1 << 5;
    pub const IP_EX: u32 = 1 << 6;
    pub const TCP_EX: u32 = 1 << 7;
    pub const UDP_EX: u32 = 1 << 8;
}

bitflags! {
    /// Feature bits understood by this driver.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Features: u64 {
        /// Device handles packets with partial checksum.
        const CSUM = 1 << 0;
        /// Device reports its maximum MTU.
        const MTU = 1 << 3;
        /// Device has a MAC address in config space.
        const MAC = 1 << 5;
        /// Link status field is valid.
        const STATUS = 1 << 16;
        /// Speed and duplex fields are valid.
        const SPEED_DUPLEX = 1 << 63;
    }
}

impl Features {
    /// Everything the driver asks for by default.
    pub const DRIVER: Self = Self::CSUM
        .union(Self::MTU)
        .union(Self::MAC)
        .union(Self::STATUS)
        .union(Self::SPEED_DUPLEX);
}

/// Size of the device configuration record.
///
/// Devices differ in how much of `virtio_net_config` they expose; the
/// layout is chosen explicitly rather than derived from feature bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigLayout {
    /// mac, status, max_virtqueue_pairs, mtu.
    Basic,
    /// Basic plus speed, duplex and RSS parameters.
    #[default]
    Extended,
}

impl ConfigLayout {
    pub const fn size(self) -> usize {
        match self {
            ConfigLayout::Basic => 12,
            ConfigLayout::Extended => 24,
        }
    }
}

/// Speed, duplex and RSS fields of the extended layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkParams {
    /// Device speed in units of 1Mbps.
    pub speed: u32,
    /// `DUPLEX_HALF` or `DUPLEX_FULL`.
    pub duplex: u8,
    /// Receive Side Scaling hash maximum key size.
    pub rss_max_key_size: u8,
    /// Receive Side Scaling maximum indirection table length.
    pub rss_max_indirection_table_length: u16,
    /// Bitmask of `hash_types`.
    pub supported_hash_types: u32,
}

/// Decoded `virtio_net_config`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Config {
    /// Interface physical address.
    pub mac: MacAddress,
    /// `STATUS_DOWN` / `STATUS_UP`.
    pub status: u16,
    /// Maximum number of rx/tx queue pairs.
    pub max_virtqueue_pairs: u16,
    /// Ethernet MTU advertised by the device.
    pub mtu: u16,
    /// Present only with `ConfigLayout::Extended`.
    pub link: Option<LinkParams>,
}

impl Config {
    /// Decode a little-endian configuration region.
    ///
    /// The region must be exactly `layout.size()` bytes.
    pub fn decode(raw: &[u8], layout: ConfigLayout) -> Result<Self, ConfigUnavailable> {
        if raw.len() != layout.size() {
            return Err(ConfigUnavailable::RegionSize {
                expected: layout.size(),
                found: raw.len(),
            });
        }

        let le16 = |off: usize| u16::from_le_bytes([raw[off], raw[off + 1]]);

        let mut mac = [0u8; 6];
        mac.copy_from_slice(&raw[0..6]);

        let link = match layout {
            ConfigLayout::Basic => None,
            ConfigLayout::Extended => Some(LinkParams {
                speed: u32::from_le_bytes([raw[12], raw[13], raw[14], raw[15]]),
                duplex: raw[16],
                rss_max_key_size: raw[17],
                rss_max_indirection_table_length: le16(18),
                supported_hash_types: u32::from_le_bytes([raw[20], raw[21], raw[22], raw[23]]),
            }),
        };

        Ok(Self {
            mac: MacAddress(mac),
            status: le16(6),
            max_virtqueue_pairs: le16(8),
            mtu: le16(10),
            link,
        })
    }

    pub fn link_up(&self) -> bool {
        self.status & STATUS_UP != 0
    }
}

/// Driver-side options fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetOptions {
    /// Largest Ethernet frame carried per ring entry, 14-byte header included
    /// and legacy header excluded. The device MTU is checked against this
    /// minus the Ethernet header.
    pub mtu: u16,
    /// Legacy header length; `DEFAULT_HEADER_LEN` when unset.
    pub header_len: Option<usize>,
    /// Expected configuration record layout.
    pub config_layout: ConfigLayout,
    /// Features requested during negotiation.
    pub features: Features,
}

impl Default for NetOptions {
    fn default() -> Self {
        Self::new(ETH_FRAME_MAX as u16)
    }
}

impl NetOptions {
    pub const fn new(mtu: u16) -> Self {
        Self {
            mtu,
            header_len: None,
            config_layout: ConfigLayout::Extended,
            features: Features::DRIVER,
        }
    }

    pub const fn with_header_len(mut self, len: usize) -> Self {
        self.header_len = Some(len);
        self
    }

    pub const fn with_config_layout(mut self, layout: ConfigLayout) -> Self {
        self.config_layout = layout;
        self
    }

    pub const fn with_features(mut self, features: Features) -> Self {
        self.features = features;
        self
    }

    /// Effective header length.
    pub fn header_len(&self) -> usize {
        self.header_len.unwrap_or(DEFAULT_HEADER_LEN)
    }

    /// Length of every ring entry.
    pub fn entry_len(&self) -> usize {
        self.mtu as usize + self.header_len()
    }
}
