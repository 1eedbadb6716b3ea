use super::document::EventDocument;
use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};
use std::time::Duration;
use thiserror::Error;

/// Error returned when a non-blocking offer is rejected.
#[derive(Debug, Error)]
pub enum OfferError {
    #[error("intake queue is at capacity")]
    Full(EventDocument),
}

/// Bounded multi-producer/multi-consumer intake queue.
///
/// Producers offer without blocking; consumers dequeue with a bounded
/// timeout so they can re-check their run flag between waits.
pub struct EventQueue {
    capacity: usize,
    buffer: Mutex<VecDeque<EventDocument>>,
    cv: Condvar,
}

impl EventQueue {
    /// Creates a queue that rejects offers beyond `capacity` events.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            buffer: Mutex::new(VecDeque::with_capacity(capacity)),
            cv: Condvar::new(),
        }
    }

    /// Maximum number of queued events.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of events currently queued.
    pub fn len(&self) -> usize {
        self.buffer.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Offers an event without blocking. The event is handed back inside the
    /// error when the queue is full.
    pub fn try_push(&self, event: EventDocument) -> Result<(), OfferError> {
        let mut buffer = self.buffer.lock().unwrap();
        if buffer.len() >= self.capacity {
            return Err(OfferError::Full(event));
        }
        buffer.push_back(event);
        self.cv.notify_one();
        Ok(())
    }

    /// Dequeues one event, waiting up to `timeout` for one to arrive.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<EventDocument> {
        let mut buffer = self.buffer.lock().unwrap();
        loop {
            if let Some(event) = buffer.pop_front() {
                return Some(event);
            }
            let (next, wait) = self.cv.wait_timeout(buffer, timeout).unwrap();
            buffer = next;
            if wait.timed_out() {
                return buffer.pop_front();
            }
        }
    }
}
