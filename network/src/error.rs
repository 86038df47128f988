//! Network error types

use core::fmt;

use crate::types::MacAddress;

pub type Result<T> = core::result::Result<T, NetworkError>;

/// Reason the device configuration record cannot be returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigUnavailable {
    /// `init()` has not read the configuration region yet.
    NotInitialized,
    /// The transport returned a region of the wrong size.
    RegionSize { expected: usize, found: usize },
    /// `VIRTIO_NET_F_MAC` was not negotiated, so the mac field is undefined.
    MacNotOffered,
    /// The device reported a zero or multicast station address.
    InvalidMac(MacAddress),
}

impl fmt::Display for ConfigUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInitialized => write!(f, "device not initialized"),
            Self::RegionSize { expected, found } => {
                write!(f, "config region is {} bytes, expected {}", found, expected)
            }
            Self::MacNotOffered => write!(f, "device offers no MAC address"),
            Self::InvalidMac(mac) => write!(f, "device MAC {} is not unicast", mac),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// Transport reports a device type other than network card.
    IdentityMismatch { expected: u32, found: u32 },
    /// Requested MTU larger than the device advertises.
    IncompatibleMtu { requested: u16, device: u16 },
    /// Virtqueues already live (or already allocated).
    QueueUnavailable,
    /// Bridge has no packet endpoint to talk to.
    MissingEndpoint,
    /// Device configuration could not be decoded.
    ConfigUnavailable(ConfigUnavailable),
    /// Address string did not parse as IPv4 (or netmask not contiguous).
    InvalidAddress,
}

impl From<ConfigUnavailable> for NetworkError {
    fn from(err: ConfigUnavailable) -> Self {
        Self::ConfigUnavailable(err)
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IdentityMismatch { expected, found } => {
                write!(f, "incompatible device ID ({:#x} != {:#x})", found, expected)
            }
            Self::IncompatibleMtu { requested, device } => {
                write!(f, "incompatible MTU ({} > {})", requested, device)
            }
            Self::QueueUnavailable => write!(f, "queues unavailable"),
            Self::MissingEndpoint => write!(f, "missing link endpoint"),
            Self::ConfigUnavailable(reason) => write!(f, "config unavailable: {}", reason),
            Self::InvalidAddress => write!(f, "invalid IPv4 address"),
        }
    }
}
