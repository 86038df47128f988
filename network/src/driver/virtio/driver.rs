//! VirtIO-net driver.
//!
//! # Resource policy
//!
//! Setup state (negotiated features, queue hand-over, readiness) sits
//! behind one coarse spin lock taken by `init`, `config` and `start`.
//! Steady-state frame movement never takes it: the driver's ring ends are
//! published through `Once` cells and accessed lock-free.
//!
//! - the receive loop ([`Net::start`]) is the only reader of receiveq1
//! - the transmit path ([`Net::tx`]) is the only writer of transmitq1

use alloc::sync::Arc;

use spin::{Mutex, Once};

use crate::driver::traits::{NetworkDriver, RxHandler};
use crate::types::Frame;

use super::config::{Features, NetOptions};
use super::queue::{Consumer, Producer, QueueEnd};
use super::transport::{Transport, RXQ, TXQ};
use super::{rx, tx};

/// Ring geometry fixed by `init`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingLayout {
    /// Legacy header length prefixed to every entry.
    pub header_len: usize,
    /// MTU + header length.
    pub entry_len: usize,
    /// receiveq1 entries.
    pub rx_size: u16,
    /// transmitq1 entries.
    pub tx_size: u16,
}

/// State guarded by the setup lock.
pub(super) struct Setup {
    pub(super) initialized: bool,
    pub(super) features: Features,
    /// Device ends of (receiveq1, transmitq1) until `start` hands them over.
    pub(super) device_ends: Option<(QueueEnd, QueueEnd)>,
}

/// VirtIO network device instance.
pub struct Net<T: Transport> {
    pub(super) transport: T,
    pub(super) options: NetOptions,
    pub(super) setup: Mutex<Setup>,
    pub(super) layout: Once<RingLayout>,
    /// Driver end of receiveq1.
    pub(super) rx: Once<Consumer>,
    /// Driver end of transmitq1.
    pub(super) tx: Once<Producer>,
    /// Incoming frame handler
    rx_handler: Mutex<Option<RxHandler>>,
    /// Suspension point of the receive loop.
    yield_now: fn(),
}

impl<T: Transport> Net<T> {
    /// Create an uninitialized device over `transport`.
    pub fn new(transport: T, options: NetOptions) -> Self {
        Self {
            transport,
            options,
            setup: Mutex::new(Setup {
                initialized: false,
                features: Features::empty(),
                device_ends: None,
            }),
            layout: Once::new(),
            rx: Once::new(),
            tx: Once::new(),
            rx_handler: Mutex::new(None),
            yield_now: core::hint::spin_loop,
        }
    }

    /// Replace the receive loop's yield hook (defaults to a spin hint).
    ///
    /// Schedulers with real tasks pass their own yield here.
    pub fn with_yield(mut self, yield_now: fn()) -> Self {
        self.yield_now = yield_now;
        self
    }

    pub fn options(&self) -> &NetOptions {
        &self.options
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Features granted during `init` (empty before).
    pub fn features(&self) -> Features {
        self.setup.lock().features
    }

    /// Ring geometry, once `init` succeeded.
    pub fn layout(&self) -> Option<RingLayout> {
        self.layout.get().copied()
    }

    /// Install the incoming frame handler.
    pub fn set_rx_handler<F>(&self, handler: F)
    where
        F: Fn(&[u8]) + Send + Sync + 'static,
    {
        *self.rx_handler.lock() = Some(Arc::new(handler));
    }

    /// Hand the rings to the device and optionally run the receive loop.
    ///
    /// Programs both queues, marks them ready and rings the receive
    /// doorbell. When `receive` is false, or no handler is installed, this
    /// returns right away. Otherwise it never returns: every iteration
    /// yields once, then polls receiveq1 and dispatches the frame.
    pub fn start(&self, receive: bool) {
        {
            let mut setup = self.setup.lock();
            if !setup.initialized {
                log::warn!("virtio-net: start before init");
                return;
            }

            if let Some((rx_end, tx_end)) = setup.device_ends.take() {
                self.transport.set_queue(RXQ, rx_end);
                self.transport.set_queue(TXQ, tx_end);
                self.transport.set_ready();
                log::info!("virtio-net: queues ready");
            }

            self.transport.notify(RXQ);
        }

        if !receive {
            return;
        }

        let handler = match self.rx_handler.lock().clone() {
            Some(handler) => handler,
            None => return,
        };

        loop {
            (self.yield_now)();
            self.dispatch(&handler);
        }
    }

    /// One receive-loop iteration without the yield.
    ///
    /// Returns whether a frame was handed to the handler. Crate-internal:
    /// outside callers drive receiveq1 through `start` only.
    pub(crate) fn poll(&self) -> bool {
        let handler = match self.rx_handler.lock().clone() {
            Some(handler) => handler,
            None => return false,
        };
        self.dispatch(&handler)
    }

    fn dispatch(&self, handler: &RxHandler) -> bool {
        match self.rx() {
            Some(frame) => {
                handler(&frame);
                true
            }
            None => false,
        }
    }

    /// Receive a single frame, legacy header stripped.
    ///
    /// Entries shorter than the header are dropped.
    pub fn rx(&self) -> Option<Frame> {
        let (queue, layout) = (self.rx.get()?, self.layout.get()?);
        rx::receive(queue, layout.header_len)
    }

    /// Transmit a single Ethernet frame; the legacy header is prepended.
    pub fn tx(&self, frame: &[u8]) {
        let (queue, layout) = match (self.tx.get(), self.layout.get()) {
            (Some(queue), Some(layout)) => (queue, layout),
            _ => {
                log::trace!("virtio-net: tx before init, dropping {} bytes", frame.len());
                return;
            }
        };

        if tx::transmit(queue, layout.header_len, frame) {
            self.transport.notify(TXQ);
        }
    }
}

impl<T: Transport> NetworkDriver for Net<T> {
    fn transmit(&self, frame: &[u8]) {
        self.tx(frame)
    }

    fn set_rx_handler(&self, handler: RxHandler) {
        *self.rx_handler.lock() = Some(handler);
    }
}
