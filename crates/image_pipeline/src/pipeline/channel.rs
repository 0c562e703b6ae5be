//! Bounded FIFO hand-off between pipeline stages.
//!
//! `BoundedChannel<T>` wraps a `crossbeam_channel` bounded channel and adds
//! an explicit, idempotent [`close`](BoundedChannel::close) operation. Close
//! is how stages learn that no more items will ever arrive: once the channel
//! is closed *and* its buffer is drained, every blocked or future
//! [`get`](BoundedChannel::get) returns `None`. This replaces per-consumer
//! sentinel values — any number of competing consumers observe termination
//! without the coordinator counting markers.
//!
//! Ordering is FIFO per producer. Each item is delivered to exactly one
//! caller of `get`, never broadcast.

use anyhow::{ensure, Result};
use crossbeam_channel::{bounded, Receiver, SendError, Sender};
use std::sync::Mutex;

/// A bounded multi-producer multi-consumer queue with close semantics.
///
/// Shared between stages via `Arc`. `put` blocks while the buffer is full
/// (backpressure), `get` blocks while it is empty and not yet drained.
pub struct BoundedChannel<T> {
    // Holding the sender in an Option lets close() drop it; once the last
    // clone is gone crossbeam reports disconnect to all receivers.
    tx: Mutex<Option<Sender<T>>>,
    rx: Receiver<T>,
}

impl<T> BoundedChannel<T> {
    /// Creates a channel holding at most `capacity` in-flight items.
    ///
    /// Any capacity >= 1 is correct; it only tunes how far upstream stages
    /// may run ahead of downstream ones.
    pub fn new(capacity: usize) -> Result<Self> {
        ensure!(
            capacity > 0,
            "Channel capacity must be > 0; a zero-capacity channel would \
             deadlock single-threaded put/get"
        );
        let (tx, rx) = bounded(capacity);
        Ok(Self {
            tx: Mutex::new(Some(tx)),
            rx,
        })
    }

    /// Enqueues one item, blocking while the channel is full.
    ///
    /// Returns the item back inside `SendError` if the channel has already
    /// been closed; producers treat that as a signal to stop.
    pub fn put(&self, item: T) -> Result<(), SendError<T>> {
        // Clone the sender out of the lock so a blocking send never holds
        // the mutex against close().
        let sender = self.tx.lock().unwrap().clone();
        match sender {
            Some(tx) => tx.send(item),
            None => Err(SendError(item)),
        }
    }

    /// Dequeues one item, blocking while the channel is empty.
    ///
    /// Returns `None` only once the channel is closed and every buffered
    /// item has been consumed. Safe to call from any number of threads;
    /// each item goes to exactly one caller.
    pub fn get(&self) -> Option<T> {
        self.rx.recv().ok()
    }

    /// Marks the channel as complete: no further items may be enqueued,
    /// items already buffered remain consumable. Idempotent.
    pub fn close(&self) {
        self.tx.lock().unwrap().take();
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.tx.lock().unwrap().is_none()
    }
}
