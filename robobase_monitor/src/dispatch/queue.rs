//! Fixed-capacity interrupt event queue.
//!
//! Producers are ISRs; there is exactly one consumer (the scheduler entry
//! point that calls [`crate::monitor::CentralizedMonitor::run_pending`]).
//! Storage is a `heapless::Deque`, so posting never allocates.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Deque;
use robobase_common::consts::EVENT_QUEUE_CAPACITY;
use thiserror::Error;

use super::event::InterruptEvent;

/// Dispatch failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The queue is full; the event is handed back to the caller.
    #[error("event queue full ({capacity} entries), dropped {event:?}")]
    QueueFull {
        event: InterruptEvent,
        capacity: usize,
    },
}

/// FIFO of pending interrupt events.
pub struct EventQueue {
    inner: Mutex<RefCell<Deque<InterruptEvent, EVENT_QUEUE_CAPACITY>>>,
}

impl EventQueue {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Append `event`. Fails without blocking when full.
    pub fn post(&self, event: InterruptEvent) -> Result<(), DispatchError> {
        critical_section::with(|cs| {
            self.inner
                .borrow_ref_mut(cs)
                .push_back(event)
                .map_err(|event| DispatchError::QueueFull {
                    event,
                    capacity: EVENT_QUEUE_CAPACITY,
                })
        })
    }

    /// Oldest pending event.
    pub fn pop(&self) -> Option<InterruptEvent> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).pop_front())
    }

    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.inner.borrow_ref(cs).len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
