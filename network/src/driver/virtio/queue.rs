//! Virtqueue rings.
//!
//! Each virtqueue is a bounded single-producer/single-consumer channel of
//! fixed-length entries. Creating a ring yields exactly one [`Producer`]
//! and one [`Consumer`]; neither is `Clone`, so each direction has one
//! writer and one reader by construction.
//!
//! ```text
//!   receiveq1:   device ──Producer──▶ [ring] ──Consumer──▶ driver
//!   transmitq1:  driver ──Producer──▶ [ring] ──Consumer──▶ device
//! ```
//!
//! The driver keeps its end; the other end is handed to the transport
//! through [`Transport::set_queue`](super::Transport::set_queue).

use alloc::sync::Arc;

use crossbeam_queue::ArrayQueue;

use crate::types::Frame;

/// Which side fills ring entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Device writes, driver reads (receive queues).
    DeviceWritable,
    /// Driver writes, device drains (transmit queues).
    DriverWritable,
}

/// Push failure. The rejected frame is handed back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushError {
    /// All entries are in flight.
    Full(Frame),
    /// Frame does not fit a ring entry.
    TooLong { len: usize, entry_len: usize },
}

struct Ring {
    entries: ArrayQueue<Frame>,
    entry_len: usize,
    direction: Direction,
}

/// Create a ring of `size` entries, each at most `entry_len` bytes.
///
/// `size` must be non-zero.
pub fn ring(size: usize, entry_len: usize, direction: Direction) -> (Producer, Consumer) {
    let ring = Arc::new(Ring {
        entries: ArrayQueue::new(size),
        entry_len,
        direction,
    });

    (Producer { ring: ring.clone() }, Consumer { ring })
}

/// Writing end of a ring.
pub struct Producer {
    ring: Arc<Ring>,
}

impl Producer {
    /// Make `frame` available to the reading end.
    pub fn push(&self, frame: Frame) -> Result<(), PushError> {
        if frame.len() > self.ring.entry_len {
            return Err(PushError::TooLong {
                len: frame.len(),
                entry_len: self.ring.entry_len,
            });
        }

        self.ring.entries.push(frame).map_err(PushError::Full)
    }

    pub fn entry_len(&self) -> usize {
        self.ring.entry_len
    }

    pub fn size(&self) -> usize {
        self.ring.entries.capacity()
    }

    pub fn direction(&self) -> Direction {
        self.ring.direction
    }

    pub fn is_full(&self) -> bool {
        self.ring.entries.is_full()
    }
}

/// Reading end of a ring.
pub struct Consumer {
    ring: Arc<Ring>,
}

impl Consumer {
    /// Take the oldest pending entry.
    pub fn pop(&self) -> Option<Frame> {
        self.ring.entries.pop()
    }

    pub fn entry_len(&self) -> usize {
        self.ring.entry_len
    }

    pub fn size(&self) -> usize {
        self.ring.entries.capacity()
    }

    pub fn direction(&self) -> Direction {
        self.ring.direction
    }

    /// Number of entries waiting to be popped.
    pub fn pending(&self) -> usize {
        self.ring.entries.len()
    }
}

/// Ring end handed over to the transport (the device side).
pub enum QueueEnd {
    /// Device fills entries (receive queues).
    Producer(Producer),
    /// Device drains entries (transmit queues).
    Consumer(Consumer),
}

impl QueueEnd {
    pub fn entry_len(&self) -> usize {
        match self {
            QueueEnd::Producer(p) => p.entry_len(),
            QueueEnd::Consumer(c) => c.entry_len(),
        }
    }

    pub fn size(&self) -> usize {
        match self {
            QueueEnd::Producer(p) => p.size(),
            QueueEnd::Consumer(c) => c.size(),
        }
    }
}
