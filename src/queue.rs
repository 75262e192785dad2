//! Handoff queue between platform callbacks and the polling consumer.

use crate::midi::MidiEvent;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

/// FIFO of decoded events shared by every ingress callback and the one
/// consumer.
///
/// All access goes through a single mutex held only for the duration of one
/// push, pop or clear. Growth is unbounded: producers are driven by the
/// platform and cannot be stalled.
#[derive(Debug, Default)]
pub struct MessageQueue {
    events: Mutex<VecDeque<MidiEvent>>,
}

impl MessageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    // A producer that panicked mid-push cannot leave a half-written event
    // behind, so a poisoned guard is still safe to use.
    fn lock(&self) -> MutexGuard<'_, VecDeque<MidiEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Appends one event. Never fails and never wakes anyone.
    pub fn push(&self, event: MidiEvent) {
        self.lock().push_back(event);
    }

    /// Removes the oldest event, or returns `None` when nothing is queued.
    pub fn try_pop(&self) -> Option<MidiEvent> {
        self.lock().pop_front()
    }

    /// Drops everything queued so far and returns how many events went.
    pub fn clear(&self) -> usize {
        let mut events = self.lock();
        let discarded = events.len();
        events.clear();
        discarded
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::EndpointId;

    fn event(n: u8) -> MidiEvent {
        MidiEvent::new(EndpointId(1), 0x90, n, 100)
    }

    #[test]
    fn test_fifo_order() {
        let queue = MessageQueue::new();
        for n in 0..5 {
            queue.push(event(n));
        }
        for n in 0..5 {
            assert_eq!(queue.try_pop(), Some(event(n)));
        }
        assert_eq!(queue.try_pop(), None);
    }

    #[test]
    fn test_pop_on_empty_leaves_queue_untouched() {
        let queue = MessageQueue::new();
        assert_eq!(queue.try_pop(), None);
        assert!(queue.is_empty());
        queue.push(event(1));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_clear_discards_only_earlier_events() {
        let queue = MessageQueue::new();
        queue.push(event(1));
        queue.push(event(2));
        assert_eq!(queue.clear(), 2);
        queue.push(event(3));
        assert_eq!(queue.try_pop(), Some(event(3)));
        assert_eq!(queue.try_pop(), None);
    }

    #[test]
    fn test_clear_on_empty() {
        let queue = MessageQueue::new();
        assert_eq!(queue.clear(), 0);
        assert!(queue.is_empty());
    }
}
