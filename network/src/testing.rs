//! In-memory transport used by the unit tests.
//!
//! Plays the device side: fills receiveq1, drains transmitq1 and records
//! doorbells.

use alloc::vec;
use alloc::vec::Vec;

use spin::Mutex;

use crate::driver::virtio::config::{Features, DUPLEX_FULL, STATUS_UP};
use crate::driver::virtio::queue::{Consumer, Producer, QueueEnd};
use crate::driver::virtio::transport::{Transport, RXQ, TXQ};
use crate::types::MacAddress;

#[derive(Default)]
struct DeviceState {
    negotiations: usize,
    sizes: [u16; 2],
    ready: bool,
    rx: Option<Producer>,
    tx: Option<Consumer>,
    notifications: [usize; 2],
}

pub struct MockTransport {
    device_id: u32,
    features: u64,
    queue_size: u16,
    config: Vec<u8>,
    state: Mutex<DeviceState>,
}

impl MockTransport {
    pub const MAC: MacAddress = MacAddress([0x52, 0x54, 0x00, 0x12, 0x34, 0x56]);

    /// Network device, all driver features, 16-entry queues, MTU 1500,
    /// extended config record.
    pub fn new() -> Self {
        let mut config = vec![0u8; 24];
        config[0..6].copy_from_slice(Self::MAC.as_bytes());
        config[6..8].copy_from_slice(&STATUS_UP.to_le_bytes());
        config[8..10].copy_from_slice(&1u16.to_le_bytes());
        config[10..12].copy_from_slice(&1500u16.to_le_bytes());
        config[12..16].copy_from_slice(&1000u32.to_le_bytes());
        config[16] = DUPLEX_FULL;

        Self {
            device_id: 0x01,
            features: Features::DRIVER.bits(),
            queue_size: 16,
            config,
            state: Mutex::new(DeviceState::default()),
        }
    }

    pub fn with_device_id(mut self, id: u32) -> Self {
        self.device_id = id;
        self
    }

    pub fn with_features(mut self, features: u64) -> Self {
        self.features = features;
        self
    }

    pub fn with_queue_size(mut self, size: u16) -> Self {
        self.queue_size = size;
        self
    }

    pub fn with_mac(mut self, mac: MacAddress) -> Self {
        self.config[0..6].copy_from_slice(mac.as_bytes());
        self
    }

    pub fn with_mtu(mut self, mtu: u16) -> Self {
        self.config[10..12].copy_from_slice(&mtu.to_le_bytes());
        self
    }

    /// Replace the whole configuration region; `read_config` returns it
    /// as-is whatever size is asked for.
    pub fn with_config(mut self, config: Vec<u8>) -> Self {
        self.config = config;
        self
    }

    /// Device writes an entry into receiveq1.
    pub fn inject_rx(&self, entry: Vec<u8>) -> bool {
        match &self.state.lock().rx {
            Some(rx) => rx.push(entry).is_ok(),
            None => false,
        }
    }

    /// Device consumes everything pending on transmitq1.
    pub fn drain_tx(&self) -> Vec<Vec<u8>> {
        let state = self.state.lock();
        let mut out = Vec::new();
        if let Some(tx) = &state.tx {
            while let Some(entry) = tx.pop() {
                out.push(entry);
            }
        }
        out
    }

    pub fn notifications(&self, queue: u16) -> usize {
        self.state.lock().notifications[queue as usize]
    }

    pub fn negotiations(&self) -> usize {
        self.state.lock().negotiations
    }

    pub fn queue_size(&self, queue: u16) -> u16 {
        self.state.lock().sizes[queue as usize]
    }

    pub fn is_ready(&self) -> bool {
        self.state.lock().ready
    }

    pub fn has_queues(&self) -> bool {
        let state = self.state.lock();
        state.rx.is_some() && state.tx.is_some()
    }
}

impl Transport for MockTransport {
    fn negotiate(&self, requested: u64) -> u64 {
        self.state.lock().negotiations += 1;
        requested & self.features
    }

    fn device_id(&self) -> u32 {
        self.device_id
    }

    fn max_queue_size(&self, _queue: u16) -> u16 {
        self.queue_size
    }

    fn queue_ready(&self, _queue: u16) -> bool {
        self.state.lock().ready
    }

    fn set_queue_size(&self, queue: u16, size: u16) {
        self.state.lock().sizes[queue as usize] = size;
    }

    fn set_queue(&self, queue: u16, end: QueueEnd) {
        let mut state = self.state.lock();
        match (queue, end) {
            (RXQ, QueueEnd::Producer(p)) => state.rx = Some(p),
            (TXQ, QueueEnd::Consumer(c)) => state.tx = Some(c),
            _ => panic!("unexpected ring end for queue {}", queue),
        }
    }

    fn set_ready(&self) {
        self.state.lock().ready = true;
    }

    fn notify(&self, queue: u16) {
        self.state.lock().notifications[queue as usize] += 1;
    }

    fn read_config(&self, _size: usize) -> Vec<u8> {
        self.config.clone()
    }
}
