//! Shared wire types.
//!
//! Ethernet and VirtIO header layouts used by both the driver and the
//! link bridge.

pub mod ethernet;
pub mod virtio_hdr;

// Re-exports
pub use ethernet::{
    EthernetHeader, MacAddress, ETH_ALEN, ETH_FRAME_MAX, ETH_HLEN, ETH_MTU, ETH_P_ARP, ETH_P_IP,
    ETH_P_IPV6,
};
pub use virtio_hdr::{
    VirtioNetHdr, VIRTIO_NET_HDR_F_NEEDS_CSUM, VIRTIO_NET_HDR_GSO_NONE,
    VIRTIO_NET_HDR_LEGACY_SIZE, VIRTIO_NET_HDR_SIZE,
};

/// Raw frame as carried on a ring or handed across the link boundary.
pub type Frame = alloc::vec::Vec<u8>;
