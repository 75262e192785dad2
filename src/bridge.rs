//! Polling surface used by the host application.
//!
//! The host calls into [`MidiBridge`] from one thread at its own cadence.
//! Every call that can observe device state runs a refresh first, so a
//! consumer that only ever dequeues still follows devices coming and going.

use crate::midi::{EndpointId, MidiEvent, MidiPlatform, NO_DATA};
use crate::queue::MessageQueue;
use crate::session::{Refresh, SessionController};
use log::{error, info};
use std::sync::Arc;

pub struct MidiBridge<P: MidiPlatform> {
    controller: SessionController<P>,
}

impl<P: MidiPlatform> MidiBridge<P> {
    /// Creates the bridge. No session is opened until the first refresh.
    pub fn new(platform: P) -> Self {
        info!("MIDI bridge initialized");
        Self {
            controller: SessionController::new(platform, Arc::new(MessageQueue::new())),
        }
    }

    // The platform reported `n` devices, so slots 0..n must open. If they
    // don't, the registry and the platform disagree and there is nothing
    // sensible to fall back to.
    fn refresh(&mut self) -> Refresh {
        match self.controller.refresh() {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Failed to reopen MIDI inputs: {}", e);
                panic!("MIDI platform refused a device slot it reported: {}", e);
            }
        }
    }

    /// Refreshes, then returns how many inputs are open. Indices passed to
    /// [`MidiBridge::id_at`] are only meaningful right after this call.
    pub fn refresh_and_count(&mut self) -> usize {
        self.refresh();
        self.controller.registry().count()
    }

    /// Refreshes, then takes the oldest queued event.
    pub fn dequeue(&mut self) -> Option<MidiEvent> {
        self.refresh();
        self.controller.queue().try_pop()
    }

    pub fn id_at(&self, index: usize) -> EndpointId {
        self.controller.registry().id_at(index)
    }

    pub fn name_of(&self, id: EndpointId) -> Option<String> {
        self.controller.registry().name_of(id)
    }

    pub fn endpoints(&self) -> Vec<EndpointId> {
        self.controller.registry().ids()
    }

    /// Number of session rebuilds so far
    pub fn epoch(&self) -> u64 {
        self.controller.epoch()
    }

    /// Events waiting in the queue
    pub fn pending(&self) -> usize {
        self.controller.queue().len()
    }

    /// Closes every session and drops queued events. Further polling
    /// reopens sessions as if the bridge were new.
    pub fn shutdown(&mut self) {
        self.controller.shutdown();
    }

    /// Refreshes and returns the number of open inputs.
    pub fn count_endpoints(&mut self) -> i32 {
        i32::try_from(self.refresh_and_count()).unwrap_or(i32::MAX)
    }

    /// Raw id of the input at `index`, or 0 when there is none.
    pub fn endpoint_id_at_index(&self, index: i32) -> u32 {
        usize::try_from(index)
            .map(|i| self.id_at(i).0)
            .unwrap_or(EndpointId::INVALID.0)
    }

    pub fn endpoint_name(&self, id: u32) -> Option<String> {
        self.name_of(EndpointId(id))
    }

    /// Refreshes, then pops one event in wire form.
    ///
    /// Returns [`NO_DATA`] (zero) when the queue is empty. Zero is not a
    /// value any real event encodes to, since live endpoint ids are nonzero,
    /// but it is a sentinel rather than an error code.
    pub fn dequeue_incoming_data(&mut self) -> u64 {
        self.dequeue().map(MidiEvent::to_wire).unwrap_or(NO_DATA)
    }
}

impl<P: MidiPlatform> Drop for MidiBridge<P> {
    fn drop(&mut self) {
        self.controller.shutdown();
    }
}
