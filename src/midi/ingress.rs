use super::{EndpointId, MidiEvent};
use crate::queue::MessageQueue;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Receiving end of one input session, called from the platform's own
/// callback thread.
///
/// Cloning yields a handle to the same session: the armed flag is shared, so
/// a backend can keep one clone inside its callback and another next to the
/// session to arm it on start.
#[derive(Debug, Clone)]
pub struct Ingress {
    endpoint: EndpointId,
    queue: Arc<MessageQueue>,
    armed: Arc<AtomicBool>,
}

impl Ingress {
    pub fn new(endpoint: EndpointId, queue: Arc<MessageQueue>) -> Self {
        Self {
            endpoint,
            queue,
            armed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn endpoint(&self) -> EndpointId {
        self.endpoint
    }

    /// Lets messages through. Called once the session has been started.
    pub fn arm(&self) {
        self.armed.store(true, Ordering::Release);
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    /// Handles one short message packed as status | data1 << 8 | data2 << 16.
    ///
    /// The status byte is not checked; whatever arrives is queued as is.
    pub fn on_short_message(&self, param: u32) {
        if !self.is_armed() {
            return;
        }
        self.queue
            .push(MidiEvent::from_short_message(self.endpoint, param));
    }

    /// Handles a message delivered as raw bytes. Anything longer than three
    /// bytes is a long message and is dropped.
    pub fn on_bytes(&self, bytes: &[u8]) {
        if bytes.is_empty() || bytes.len() > 3 {
            return;
        }
        let param = bytes
            .iter()
            .enumerate()
            .fold(0u32, |word, (i, &b)| word | (u32::from(b) << (8 * i)));
        self.on_short_message(param);
    }
}
