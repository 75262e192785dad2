use crate::midi::{Ingress, MidiError, MidiPlatform, Result};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// In-memory MIDI platform for tests and the `test-mock` binary.
///
/// Clones share the same device set, so a test can hand one clone to the
/// bridge and keep another to plug devices in and out, inject messages and
/// inspect how many sessions were opened or closed.
#[derive(Clone, Default)]
pub struct MockPlatform {
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    devices: Vec<String>,
    live: Vec<LiveSession>,
    next_serial: u64,
    fail_open_slot: Option<usize>,
    fail_start: bool,
    fail_names: bool,
    opens: usize,
    starts: usize,
    closes: usize,
}

struct LiveSession {
    serial: u64,
    slot: usize,
    ingress: Ingress,
}

/// Session handed out by [`MockPlatform`]
#[derive(Debug)]
pub struct MockSession {
    serial: u64,
    slot: usize,
    name: String,
}

impl MockPlatform {
    pub fn new(devices: &[&str]) -> Self {
        let platform = Self::default();
        platform.state().devices = devices.iter().map(|d| d.to_string()).collect();
        platform
    }

    /// `count` devices named "Mock Device 1", "Mock Device 2", ...
    pub fn with_devices(count: usize) -> Self {
        let platform = Self::default();
        platform.state().devices = (1..=count).map(|n| format!("Mock Device {}", n)).collect();
        platform
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_device(&self, name: &str) {
        self.state().devices.push(name.to_string());
    }

    /// Unplugs the device at `slot`. Sessions already open on it stay open
    /// until the bridge notices.
    pub fn remove_device(&self, slot: usize) {
        let mut state = self.state();
        if slot < state.devices.len() {
            state.devices.remove(slot);
        }
    }

    /// Renames the device at `slot` without changing the device count.
    pub fn replace_device(&self, slot: usize, name: &str) {
        if let Some(device) = self.state().devices.get_mut(slot) {
            *device = name.to_string();
        }
    }

    pub fn fail_open_at(&self, slot: Option<usize>) {
        self.state().fail_open_slot = slot;
    }

    pub fn fail_start(&self, fail: bool) {
        self.state().fail_start = fail;
    }

    pub fn fail_names(&self, fail: bool) {
        self.state().fail_names = fail;
    }

    pub fn open_count(&self) -> usize {
        self.state().opens
    }

    pub fn start_count(&self) -> usize {
        self.state().starts
    }

    pub fn close_count(&self) -> usize {
        self.state().closes
    }

    pub fn live_sessions(&self) -> usize {
        self.state().live.len()
    }

    // Delivery happens with the state lock held, so once `close` has
    // returned no message can reach the queue through the closed session.
    fn deliver(&self, slot: usize, f: impl FnOnce(&Ingress)) -> bool {
        let state = self.state();
        match state.live.iter().find(|s| s.slot == slot) {
            Some(live) => {
                f(&live.ingress);
                true
            }
            None => false,
        }
    }

    /// Delivers raw bytes as if the device at `slot` had sent them. Returns
    /// false when no session is open on that slot.
    pub fn send(&self, slot: usize, bytes: &[u8]) -> bool {
        self.deliver(slot, |ingress| ingress.on_bytes(bytes))
    }

    /// Delivers a packed short-message word to the session on `slot`.
    pub fn send_short(&self, slot: usize, param: u32) -> bool {
        self.deliver(slot, |ingress| ingress.on_short_message(param))
    }
}

impl MidiPlatform for MockPlatform {
    type Session = MockSession;

    fn device_count(&self) -> usize {
        self.state().devices.len()
    }

    fn device_names(&self) -> Vec<String> {
        self.state().devices.clone()
    }

    fn open(&mut self, slot: usize, ingress: Ingress) -> Result<MockSession> {
        let mut state = self.state();
        if state.fail_open_slot == Some(slot) {
            return Err(MidiError::ConnectionError(format!(
                "mock device in slot {} refused to open",
                slot
            )));
        }
        let name = state
            .devices
            .get(slot)
            .cloned()
            .ok_or(MidiError::PortNotFound(slot))?;

        state.next_serial += 1;
        let serial = state.next_serial;
        state.opens += 1;
        state.live.push(LiveSession {
            serial,
            slot,
            ingress,
        });
        Ok(MockSession { serial, slot, name })
    }

    fn start(&mut self, session: &mut MockSession) -> Result<()> {
        let mut state = self.state();
        if state.fail_start {
            return Err(MidiError::StartError(format!(
                "mock device in slot {} refused to start",
                session.slot
            )));
        }
        state.starts += 1;
        if let Some(live) = state.live.iter().find(|s| s.serial == session.serial) {
            live.ingress.arm();
        }
        Ok(())
    }

    fn close(&mut self, session: MockSession) {
        let mut state = self.state();
        state.closes += 1;
        state.live.retain(|s| s.serial != session.serial);
    }

    fn name_of(&self, session: &MockSession) -> Result<String> {
        if self.state().fail_names {
            return Err(MidiError::NameError(format!(
                "mock device in slot {} has no caps",
                session.slot
            )));
        }
        Ok(session.name.clone())
    }
}
