//! VirtIO-net initialization sequence.
//!
//! # Initialization Steps
//! 1. Feature negotiation
//! 2. Verify device type
//! 3. MTU check (only when `VIRTIO_NET_F_MTU` was granted)
//! 4. Reject queues that are already live
//! 5. Fix header length and entry length
//! 6. Size and allocate receiveq1 / transmitq1
//!
//! Queues are handed to the device later, by `Net::start`.

use crate::error::{ConfigUnavailable, NetworkError, Result};
use crate::types::ETH_HLEN;

use super::config::{Config, Features, VIRTIO_NET_DEVICE_ID};
use super::driver::{Net, RingLayout};
use super::queue::{self, Direction, QueueEnd};
use super::transport::{Transport, RXQ, TXQ};

impl<T: Transport> Net<T> {
    /// Initialize the device.
    ///
    /// Runs under the setup lock and succeeds at most once.
    pub fn init(&self) -> Result<()> {
        let mut setup = self.setup.lock();

        if setup.initialized {
            return Err(NetworkError::QueueUnavailable);
        }

        let requested = self.options.features;
        let granted = Features::from_bits_truncate(self.transport.negotiate(requested.bits()))
            & requested;
        setup.features = granted;
        log::debug!(
            "virtio-net: features requested {:#x} granted {:#x}",
            requested.bits(),
            granted.bits()
        );

        let id = self.transport.device_id();
        if id != VIRTIO_NET_DEVICE_ID {
            return Err(NetworkError::IdentityMismatch {
                expected: VIRTIO_NET_DEVICE_ID,
                found: id,
            });
        }

        if granted.contains(Features::MTU) {
            // Device MTU excludes the Ethernet header
            let config = self.read_config()?;
            if self.options.mtu.saturating_sub(ETH_HLEN as u16) > config.mtu {
                return Err(NetworkError::IncompatibleMtu {
                    requested: self.options.mtu,
                    device: config.mtu,
                });
            }
        }

        if self.transport.queue_ready(RXQ) || self.transport.queue_ready(TXQ) {
            return Err(NetworkError::QueueUnavailable);
        }

        let header_len = self.options.header_len();
        let entry_len = self.options.entry_len();

        let rx_size = self.transport.max_queue_size(RXQ);
        let tx_size = self.transport.max_queue_size(TXQ);
        if rx_size == 0 || tx_size == 0 {
            return Err(NetworkError::QueueUnavailable);
        }

        // receiveq1: device fills, driver pops
        let (rx_device, rx_driver) =
            queue::ring(rx_size as usize, entry_len, Direction::DeviceWritable);
        self.transport.set_queue_size(RXQ, rx_size);

        // transmitq1: driver pushes, device drains
        let (tx_driver, tx_device) =
            queue::ring(tx_size as usize, entry_len, Direction::DriverWritable);
        self.transport.set_queue_size(TXQ, tx_size);

        self.rx.call_once(|| rx_driver);
        self.tx.call_once(|| tx_driver);
        self.layout.call_once(|| RingLayout {
            header_len,
            entry_len,
            rx_size,
            tx_size,
        });

        setup.device_ends = Some((QueueEnd::Producer(rx_device), QueueEnd::Consumer(tx_device)));
        setup.initialized = true;

        log::info!(
            "virtio-net: initialized, mtu {} header {} rx {}x{} tx {}x{}",
            self.options.mtu,
            header_len,
            rx_size,
            entry_len,
            tx_size,
            entry_len
        );

        Ok(())
    }

    /// Device configuration.
    ///
    /// Fails with an explicit reason instead of returning a zeroed record,
    /// so an all-zero MAC or MTU is never mistaken for a device value.
    pub fn config(&self) -> core::result::Result<Config, ConfigUnavailable> {
        let setup = self.setup.lock();
        if !setup.initialized {
            return Err(ConfigUnavailable::NotInitialized);
        }
        self.read_config()
    }

    /// Read and decode the configuration region. Caller holds the setup lock.
    fn read_config(&self) -> core::result::Result<Config, ConfigUnavailable> {
        let layout = self.options.config_layout;
        let raw = self.transport.read_config(layout.size());
        Config::decode(&raw, layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::virtio::config::{ConfigLayout, NetOptions};
    use crate::testing::MockTransport;
    use crate::types::MacAddress;

    fn net(transport: MockTransport, options: NetOptions) -> Net<MockTransport> {
        Net::new(transport, options)
    }

    #[test]
    fn test_init_ring_geometry() {
        let net = net(
            MockTransport::new().with_queue_size(64),
            NetOptions::new(1500).with_header_len(12),
        );
        net.init().unwrap();

        let layout = net.layout().unwrap();
        assert_eq!(layout.header_len, 12);
        assert_eq!(layout.entry_len, 1512);
        assert_eq!(layout.rx_size, 64);
        assert_eq!(layout.tx_size, 64);
        assert_eq!(net.transport().queue_size(RXQ), 64);
        assert_eq!(net.transport().queue_size(TXQ), 64);
    }

    #[test]
    fn test_init_default_header_len() {
        let net = net(MockTransport::new(), NetOptions::new(1500));
        net.init().unwrap();
        assert_eq!(net.layout().unwrap().header_len, 10);
        assert_eq!(net.layout().unwrap().entry_len, 1510);
    }

    #[test]
    fn test_init_identity_mismatch() {
        let net = net(MockTransport::new().with_device_id(0x02), NetOptions::new(1500));
        assert_eq!(
            net.init(),
            Err(NetworkError::IdentityMismatch { expected: 0x01, found: 0x02 })
        );
        assert!(net.layout().is_none());
    }

    #[test]
    fn test_init_mtu_gate() {
        // Ring MTU counts the 14-byte Ethernet header, the device MTU does not
        let too_big = net(MockTransport::new().with_mtu(1500), NetOptions::new(1515));
        assert_eq!(
            too_big.init(),
            Err(NetworkError::IncompatibleMtu { requested: 1515, device: 1500 })
        );
        assert!(too_big.layout().is_none());

        let exact = net(MockTransport::new().with_mtu(1500), NetOptions::new(1514));
        assert!(exact.init().is_ok());
        assert_eq!(exact.layout().unwrap().entry_len, 1524);
    }

    #[test]
    fn test_init_default_options_fit_standard_device() {
        let net = net(MockTransport::new(), NetOptions::default());
        net.init().unwrap();
        net.start(false);

        // Full-size Ethernet frame makes it onto transmitq1
        net.tx(&[0u8; 1514]);
        let sent = net.transport().drain_tx();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].len(), 10 + 1514);
    }

    #[test]
    fn test_init_small_device_mtu() {
        let too_big = net(MockTransport::new().with_mtu(576), NetOptions::default());
        assert_eq!(
            too_big.init(),
            Err(NetworkError::IncompatibleMtu { requested: 1514, device: 576 })
        );

        let fits = net(MockTransport::new().with_mtu(576), NetOptions::new(590));
        assert!(fits.init().is_ok());
    }

    #[test]
    fn test_init_mtu_unchecked_without_feature() {
        let transport = MockTransport::new()
            .with_mtu(1500)
            .with_features((Features::DRIVER - Features::MTU).bits());
        let net = net(transport, NetOptions::new(9000));
        assert!(net.init().is_ok());
        assert!(!net.features().contains(Features::MTU));
    }

    #[test]
    fn test_init_mtu_feature_needs_config() {
        let transport = MockTransport::new().with_config(alloc::vec![0u8; 12]);
        let net = net(transport, NetOptions::new(1500));
        assert_eq!(
            net.init(),
            Err(NetworkError::ConfigUnavailable(ConfigUnavailable::RegionSize {
                expected: 24,
                found: 12
            }))
        );
    }

    #[test]
    fn test_init_features_intersected() {
        let transport = MockTransport::new()
            .with_features((Features::MAC | Features::MTU).bits() | (1 << 40));
        let net = net(transport, NetOptions::new(1500));
        net.init().unwrap();
        assert_eq!(net.features(), Features::MAC | Features::MTU);
    }

    #[test]
    fn test_init_queue_already_ready() {
        let transport = MockTransport::new();
        transport.set_ready();
        let net = net(transport, NetOptions::new(1500));
        assert_eq!(net.init(), Err(NetworkError::QueueUnavailable));
        assert!(net.layout().is_none());
    }

    #[test]
    fn test_init_twice_rejected() {
        let net = net(MockTransport::new(), NetOptions::new(1500).with_header_len(12));
        net.init().unwrap();
        let before = net.layout();

        // Before start: rings allocated but not yet live
        assert_eq!(net.init(), Err(NetworkError::QueueUnavailable));

        // After start: queues marked ready
        net.start(false);
        assert_eq!(net.init(), Err(NetworkError::QueueUnavailable));

        assert_eq!(net.layout(), before);
        assert_eq!(net.transport().negotiations(), 1);
    }

    #[test]
    fn test_init_zero_queue_size() {
        let net = net(MockTransport::new().with_queue_size(0), NetOptions::new(1500));
        assert_eq!(net.init(), Err(NetworkError::QueueUnavailable));
    }

    #[test]
    fn test_config_before_init() {
        let net = net(MockTransport::new(), NetOptions::new(1500));
        assert_eq!(net.config(), Err(ConfigUnavailable::NotInitialized));
    }

    #[test]
    fn test_config_after_init() {
        let net = net(MockTransport::new(), NetOptions::new(1500));
        net.init().unwrap();

        let cfg = net.config().unwrap();
        assert_eq!(cfg.mac, MockTransport::MAC);
        assert_eq!(cfg.mtu, 1500);
        assert!(cfg.link.is_some());
        assert_ne!(cfg.mac, MacAddress::ZERO);
    }

    #[test]
    fn test_config_layout_mismatch() {
        let net = net(
            MockTransport::new(),
            NetOptions::new(1500)
                .with_config_layout(ConfigLayout::Basic)
                .with_features(Features::MAC),
        );
        net.init().unwrap();
        assert_eq!(
            net.config(),
            Err(ConfigUnavailable::RegionSize { expected: 12, found: 24 })
        );
    }
}
