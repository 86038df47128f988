//! VirtIO network header definitions.
//!
//! Every buffer exchanged over the rx/tx virtqueues starts with a
//! `virtio_net_hdr`. The driver never requests offloads, so the header is
//! always written as zeros and ignored on receive.
//!
//! # Reference
//! VirtIO Spec §5.1.6

use alloc::vec::Vec;

/// Header length without `num_buffers` (legacy devices, e.g. QEMU).
pub const VIRTIO_NET_HDR_LEGACY_SIZE: usize = 10;

/// Header length with `num_buffers`.
pub const VIRTIO_NET_HDR_SIZE: usize = 12;

// Header flags
pub const VIRTIO_NET_HDR_F_NEEDS_CSUM: u8 = 1 << 0;

// GSO types
pub const VIRTIO_NET_HDR_GSO_NONE: u8 = 0;

/// VirtIO network header (`virtio_net_hdr`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VirtioNetHdr {
    pub flags: u8,
    pub gso_type: u8,
    pub hdr_len: u16,
    pub gso_size: u16,
    pub csum_start: u16,
    pub csum_offset: u16,
    /// Not present on legacy devices.
    pub num_buffers: u16,
}

impl VirtioNetHdr {
    pub const SIZE: usize = VIRTIO_NET_HDR_SIZE;

    pub const fn zeroed() -> Self {
        Self {
            flags: 0,
            gso_type: VIRTIO_NET_HDR_GSO_NONE,
            hdr_len: 0,
            gso_size: 0,
            csum_start: 0,
            csum_offset: 0,
            num_buffers: 0,
        }
    }

    /// Little-endian wire encoding.
    pub fn to_bytes(&self) -> [u8; VIRTIO_NET_HDR_SIZE] {
        let mut out = [0u8; VIRTIO_NET_HDR_SIZE];
        out[0] = self.flags;
        out[1] = self.gso_type;
        out[2..4].copy_from_slice(&self.hdr_len.to_le_bytes());
        out[4..6].copy_from_slice(&self.gso_size.to_le_bytes());
        out[6..8].copy_from_slice(&self.csum_start.to_le_bytes());
        out[8..10].copy_from_slice(&self.csum_offset.to_le_bytes());
        out[10..12].copy_from_slice(&self.num_buffers.to_le_bytes());
        out
    }

    /// Encode into exactly `len` bytes.
    ///
    /// Shorter lengths truncate trailing fields (10 drops `num_buffers`),
    /// longer lengths are zero padded.
    pub fn encode(&self, len: usize) -> Vec<u8> {
        let bytes = self.to_bytes();
        let mut out = alloc::vec![0u8; len];
        let n = len.min(bytes.len());
        out[..n].copy_from_slice(&bytes[..n]);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroed_encodes_to_zeros() {
        let hdr = VirtioNetHdr::zeroed();
        assert_eq!(hdr, VirtioNetHdr::default());
        assert_eq!(hdr.encode(VIRTIO_NET_HDR_LEGACY_SIZE), alloc::vec![0u8; 10]);
        assert_eq!(hdr.encode(VIRTIO_NET_HDR_SIZE), alloc::vec![0u8; 12]);
    }

    #[test]
    fn test_field_layout() {
        let hdr = VirtioNetHdr {
            flags: VIRTIO_NET_HDR_F_NEEDS_CSUM,
            gso_type: 0,
            hdr_len: 0x0102,
            gso_size: 0,
            csum_start: 34,
            csum_offset: 16,
            num_buffers: 1,
        };
        let bytes = hdr.to_bytes();
        assert_eq!(bytes[0], 1);
        assert_eq!(&bytes[2..4], &[0x02, 0x01]);
        assert_eq!(&bytes[6..8], &[34, 0]);
        assert_eq!(&bytes[10..12], &[1, 0]);

        // Legacy length drops num_buffers
        assert_eq!(hdr.encode(10), &bytes[..10]);
    }
}
