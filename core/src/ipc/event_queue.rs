//! # Light Event Queue
//!
//! Interrupt handlers must not do real work; they post a light event (an id
//! plus source and target, no payload) and return. The main loop drains the
//! queue and hands each event to the target module.
//!
//! The queue has a fixed capacity so posting never allocates. A full queue
//! rejects the event with [`FwkError::Busy`]. Posting and draining are
//! lock-free: an interrupt may post while the main loop is in the middle of
//! [`EventQueue::pop`].

use core::sync::atomic::{AtomicUsize, Ordering};

use heapless::mpmc::MpMcQueue;

use crate::{EventId, FwkError, FwkId, FwkResult};

/// Default number of pending events the queue can hold
pub const DEFAULT_EVENT_QUEUE_DEPTH: usize = 16;

/// Event with no payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightEvent {
    /// Event identifier
    pub id: EventId,
    /// Entity that posted the event
    pub source_id: FwkId,
    /// Entity that should process the event
    pub target_id: FwkId,
}

impl LightEvent {
    /// Create a light event
    pub const fn new(id: EventId, source_id: FwkId, target_id: FwkId) -> Self {
        Self {
            id,
            source_id,
            target_id,
        }
    }
}

/// Anything that accepts light events
pub trait EventSink: Send + Sync {
    /// Queue an event for later processing
    fn put_event(&self, event: LightEvent) -> FwkResult<()>;
}

/// Bounded FIFO of light events
///
/// `N` must be a power of two.
pub struct EventQueue<const N: usize = DEFAULT_EVENT_QUEUE_DEPTH> {
    events: MpMcQueue<LightEvent, N>,
    /// Counted before an event is enqueued and after it is dequeued, so it
    /// never drops below the number of events actually queued
    pending: AtomicUsize,
}

impl<const N: usize> EventQueue<N> {
    /// Create an empty queue
    pub const fn new() -> Self {
        Self {
            events: MpMcQueue::new(),
            pending: AtomicUsize::new(0),
        }
    }

    /// Take the oldest pending event
    pub fn pop(&self) -> Option<LightEvent> {
        let event = self.events.dequeue()?;
        self.pending.fetch_sub(1, Ordering::AcqRel);
        Some(event)
    }

    /// Number of pending events
    pub fn len(&self) -> usize {
        self.pending.load(Ordering::Acquire).min(N)
    }

    /// Whether no event is pending
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of pending events
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> EventSink for EventQueue<N> {
    fn put_event(&self, event: LightEvent) -> FwkResult<()> {
        self.pending.fetch_add(1, Ordering::AcqRel);
        self.events.enqueue(event).map_err(|event| {
            self.pending.fetch_sub(1, Ordering::AcqRel);
            log::warn!("EventQueue: full, dropping event {:?}", event.id);
            FwkError::Busy
        })
    }
}

impl<const N: usize> Default for EventQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> core::fmt::Debug for EventQueue<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventQueue")
            .field("pending", &self.len())
            .field("capacity", &N)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(idx: u32) -> LightEvent {
        LightEvent::new(EventId::new(1, idx), FwkId::element(1, 0), FwkId::element(1, 0))
    }

    #[test]
    fn test_fifo_order() {
        let queue: EventQueue<4> = EventQueue::new();
        queue.put_event(event(0)).unwrap();
        queue.put_event(event(1)).unwrap();

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop(), Some(event(0)));
        assert_eq!(queue.pop(), Some(event(1)));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_full_queue_is_busy() {
        let queue: EventQueue<2> = EventQueue::new();
        queue.put_event(event(0)).unwrap();
        queue.put_event(event(1)).unwrap();

        assert_eq!(queue.put_event(event(2)), Err(FwkError::Busy));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_put_while_draining() {
        use std::sync::Arc;
        use std::thread;

        const TOTAL: u32 = 2000;
        let queue: Arc<EventQueue<4>> = Arc::new(EventQueue::new());

        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for idx in 0..TOTAL {
                    while queue.put_event(event(idx)) == Err(FwkError::Busy) {
                        thread::yield_now();
                    }
                }
            })
        };

        let mut next = 0;
        while next < TOTAL {
            match queue.pop() {
                Some(popped) => {
                    assert_eq!(popped, event(next));
                    next += 1;
                },
                None => thread::yield_now(),
            }
        }

        producer.join().unwrap();
        assert!(queue.is_empty());
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_interleaved_put_and_pop() {
        let queue: EventQueue<2> = EventQueue::new();
        queue.put_event(event(0)).unwrap();
        queue.put_event(event(1)).unwrap();
        assert_eq!(queue.pop(), Some(event(0)));

        // The freed slot takes a new event behind the one still pending
        queue.put_event(event(2)).unwrap();
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop(), Some(event(1)));
        assert_eq!(queue.pop(), Some(event(2)));
        assert!(queue.is_empty());
    }
}
