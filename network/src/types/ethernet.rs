//! Ethernet frame types and helpers.
//!
//! # Reference
//! IEEE 802.3

use core::fmt;

/// Length of a MAC address.
pub const ETH_ALEN: usize = 6;
/// Length of the Ethernet header (dst + src + EtherType).
pub const ETH_HLEN: usize = 14;
/// Default Ethernet payload MTU.
pub const ETH_MTU: usize = 1500;
/// Largest untagged frame, header included, FCS excluded.
pub const ETH_FRAME_MAX: usize = ETH_HLEN + ETH_MTU;

// Common EtherTypes
pub const ETH_P_IP: u16 = 0x0800;
pub const ETH_P_ARP: u16 = 0x0806;
pub const ETH_P_IPV6: u16 = 0x86DD;

/// MAC address (6 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacAddress(pub [u8; ETH_ALEN]);

impl MacAddress {
    /// Broadcast MAC address
    pub const BROADCAST: Self = Self([0xFF; ETH_ALEN]);

    /// Zero MAC address
    pub const ZERO: Self = Self([0x00; ETH_ALEN]);

    pub const fn new(bytes: [u8; ETH_ALEN]) -> Self {
        Self(bytes)
    }

    /// Build from a slice, `None` unless it is exactly 6 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let raw: [u8; ETH_ALEN] = bytes.try_into().ok()?;
        Some(Self(raw))
    }

    pub const fn as_bytes(&self) -> &[u8; ETH_ALEN] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ETH_ALEN]
    }

    /// Group bit set (broadcast included).
    pub fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }

    /// Usable as a station's own address.
    pub fn is_unicast(&self) -> bool {
        !self.is_multicast() && !self.is_zero()
    }
}

impl From<[u8; ETH_ALEN]> for MacAddress {
    fn from(bytes: [u8; ETH_ALEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

/// Ethernet header.
///
/// Wire layout: `dst[6] ++ src[6] ++ ethertype[2]`, EtherType big-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthernetHeader {
    pub dst: MacAddress,
    pub src: MacAddress,
    pub ethertype: u16,
}

impl EthernetHeader {
    pub const SIZE: usize = ETH_HLEN;

    pub const fn new(dst: MacAddress, src: MacAddress, ethertype: u16) -> Self {
        Self { dst, src, ethertype }
    }

    /// Parse the leading 14 bytes of `frame`.
    ///
    /// Returns `None` for runt frames.
    pub fn parse(frame: &[u8]) -> Option<Self> {
        if frame.len() < ETH_HLEN {
            return None;
        }

        let mut dst = [0u8; ETH_ALEN];
        let mut src = [0u8; ETH_ALEN];
        dst.copy_from_slice(&frame[0..6]);
        src.copy_from_slice(&frame[6..12]);

        Some(Self {
            dst: MacAddress(dst),
            src: MacAddress(src),
            ethertype: u16::from_be_bytes([frame[12], frame[13]]),
        })
    }

    /// Serialize to wire format.
    pub fn to_bytes(&self) -> [u8; ETH_HLEN] {
        let mut out = [0u8; ETH_HLEN];
        out[0..6].copy_from_slice(&self.dst.0);
        out[6..12].copy_from_slice(&self.src.0);
        out[12..14].copy_from_slice(&self.ethertype.to_be_bytes());
        out
    }
}
