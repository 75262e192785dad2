//! Bookkeeping for the input sessions currently open on the platform.

use crate::midi::{EndpointId, Ingress, MidiPlatform, Result};
use crate::queue::MessageQueue;
use log::debug;
use std::sync::Arc;

struct Endpoint<S> {
    id: EndpointId,
    session: S,
}

/// Owns the platform backend and every session opened through it.
///
/// Sessions are kept in slot order, so index `i` is the session opened for
/// device slot `i` at the last refresh. Ids come from a counter and are never
/// handed out twice, which keeps an id from a closed session from resolving
/// to whatever replaced it.
pub struct EndpointRegistry<P: MidiPlatform> {
    platform: P,
    endpoints: Vec<Endpoint<P::Session>>,
    next_id: u32,
}

impl<P: MidiPlatform> EndpointRegistry<P> {
    pub fn new(platform: P) -> Self {
        Self {
            platform,
            endpoints: Vec::new(),
            next_id: 1,
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn count(&self) -> usize {
        self.endpoints.len()
    }

    /// Id of the session at `index`, or [`EndpointId::INVALID`] when the
    /// index is past the end.
    pub fn id_at(&self, index: usize) -> EndpointId {
        self.endpoints
            .get(index)
            .map(|e| e.id)
            .unwrap_or(EndpointId::INVALID)
    }

    pub fn ids(&self) -> Vec<EndpointId> {
        self.endpoints.iter().map(|e| e.id).collect()
    }

    /// Device name for a live session, if there is one and the platform can
    /// name it.
    pub fn name_of(&self, id: EndpointId) -> Option<String> {
        if !id.is_valid() {
            return None;
        }
        let endpoint = self.endpoints.iter().find(|e| e.id == id)?;
        match self.platform.name_of(&endpoint.session) {
            Ok(name) => Some(name),
            Err(e) => {
                debug!("No name for endpoint {}: {}", id, e);
                None
            }
        }
    }

    fn allocate_id(&mut self) -> EndpointId {
        let id = EndpointId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1).max(1);
        id
    }

    /// Opens and starts one session per slot in `0..count`, routing their
    /// messages into `queue`.
    ///
    /// On failure every session opened by this call is closed again and the
    /// registry is left empty.
    pub fn open_all(&mut self, count: usize, queue: &Arc<MessageQueue>) -> Result<()> {
        debug_assert!(self.endpoints.is_empty(), "open_all on a populated registry");

        for slot in 0..count {
            let id = self.allocate_id();
            let ingress = Ingress::new(id, Arc::clone(queue));

            let mut session = match self.platform.open(slot, ingress) {
                Ok(session) => session,
                Err(e) => {
                    self.close_all();
                    return Err(e);
                }
            };
            if let Err(e) = self.platform.start(&mut session) {
                self.platform.close(session);
                self.close_all();
                return Err(e);
            }

            debug!("Endpoint {} bound to slot {}", id, slot);
            self.endpoints.push(Endpoint { id, session });
        }
        Ok(())
    }

    /// Closes every session and empties the registry.
    pub fn close_all(&mut self) {
        for endpoint in self.endpoints.drain(..) {
            debug!("Closing endpoint {}", endpoint.id);
            self.platform.close(endpoint.session);
        }
    }
}
