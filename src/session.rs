//! Refresh logic: keep the open sessions in line with the devices present.

use crate::midi::{MidiPlatform, Result};
use crate::queue::MessageQueue;
use crate::registry::EndpointRegistry;
use log::info;
use std::sync::Arc;

/// What a refresh did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    /// Device count matched the open sessions; nothing was touched
    Unchanged,
    /// Every session was closed and reopened for the new device set
    Rebuilt {
        previous: usize,
        current: usize,
        discarded: usize,
    },
}

/// Reconciles the registry against the platform's device count.
///
/// Only the count is compared. Swapping one device for another between two
/// refreshes goes unnoticed and the old sessions stay open.
pub struct SessionController<P: MidiPlatform> {
    registry: EndpointRegistry<P>,
    queue: Arc<MessageQueue>,
    epoch: u64,
}

impl<P: MidiPlatform> SessionController<P> {
    pub fn new(platform: P, queue: Arc<MessageQueue>) -> Self {
        Self {
            registry: EndpointRegistry::new(platform),
            queue,
            epoch: 0,
        }
    }

    pub fn registry(&self) -> &EndpointRegistry<P> {
        &self.registry
    }

    pub fn queue(&self) -> &Arc<MessageQueue> {
        &self.queue
    }

    /// Number of rebuilds so far. Events never survive from one epoch to the
    /// next.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Rebuilds all sessions if the device count changed since the last
    /// refresh.
    ///
    /// A rebuild closes every session first, then drops everything queued so
    /// no event tagged with a retired id reaches the consumer, then opens one
    /// session per device slot.
    pub fn refresh(&mut self) -> Result<Refresh> {
        let live = self.registry.platform().device_count();
        let previous = self.registry.count();
        if live == previous {
            return Ok(Refresh::Unchanged);
        }

        self.registry.close_all();
        let discarded = self.queue.clear();
        self.epoch += 1;
        self.registry.open_all(live, &self.queue)?;

        info!(
            "MIDI inputs changed from {} to {}, dropped {} queued events (epoch {})",
            previous, live, discarded, self.epoch
        );
        Ok(Refresh::Rebuilt {
            previous,
            current: live,
            discarded,
        })
    }

    /// Closes every session and empties the queue.
    pub fn shutdown(&mut self) {
        self.registry.close_all();
        self.queue.clear();
    }
}
