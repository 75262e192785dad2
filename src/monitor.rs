//! Terminal monitor that drives a [`MidiBridge`] the way a host would.
//!
//! Each tick counts endpoints, then drains the queue one event at a time,
//! printing every event with a local timestamp. An indicatif spinner on
//! stderr shows endpoint count, topology epoch and events seen.

use crate::bridge::MidiBridge;
use crate::midi::{EndpointId, MidiEvent, MidiPlatform};
use chrono::{DateTime, Local};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{debug, info};
use std::collections::HashMap;
use std::io::{self, Write};
use std::thread;
use std::time::Duration;

pub fn create_status_spinner(target: ProgressDrawTarget) -> ProgressBar {
    let pb = ProgressBar::with_draw_target(None, target);
    let style = ProgressStyle::default_spinner()
        .template("{prefix:.bold.dim} {spinner} {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_prefix("MIDI");
    pb
}

/// One printable line for an event.
pub fn format_event(event: &MidiEvent, name: Option<&str>, at: DateTime<Local>) -> String {
    format!(
        "{} {:<24} {:02X} {:02X} {:02X}",
        at.format("%H:%M:%S%.3f"),
        name.unwrap_or("<unknown>"),
        event.status,
        event.data1,
        event.data2
    )
}

pub struct Monitor {
    spinner: ProgressBar,
    names: HashMap<EndpointId, String>,
    names_epoch: Option<u64>,
    events_seen: u64,
}

impl Monitor {
    pub fn new(target: ProgressDrawTarget) -> Self {
        Monitor {
            spinner: create_status_spinner(target),
            names: HashMap::new(),
            names_epoch: None,
            events_seen: 0,
        }
    }

    pub fn events_seen(&self) -> u64 {
        self.events_seen
    }

    /// Text currently shown next to the spinner
    pub fn status(&self) -> String {
        self.spinner.message()
    }

    // Names only change when sessions are rebuilt, so they are looked up
    // once per epoch rather than once per event.
    fn refresh_names<P: MidiPlatform, W: Write>(
        &mut self,
        bridge: &MidiBridge<P>,
        out: &mut W,
    ) -> io::Result<()> {
        if self.names_epoch == Some(bridge.epoch()) {
            return Ok(());
        }
        self.names = bridge
            .endpoints()
            .into_iter()
            .filter_map(|id| bridge.name_of(id).map(|name| (id, name)))
            .collect();
        self.names_epoch = Some(bridge.epoch());

        info!("Monitoring {} MIDI inputs", bridge.endpoints().len());
        let lines: Vec<String> = bridge
            .endpoints()
            .iter()
            .map(|id| {
                format!(
                    "input {}: {}",
                    id,
                    self.names.get(id).map(String::as_str).unwrap_or("<unknown>")
                )
            })
            .collect();
        self.spinner.suspend(|| {
            lines.iter().try_for_each(|line| writeln!(out, "{}", line))
        })
    }

    /// Runs one host tick. Returns the number of events drained.
    pub fn poll_once<P: MidiPlatform, W: Write>(
        &mut self,
        bridge: &mut MidiBridge<P>,
        out: &mut W,
    ) -> io::Result<usize> {
        bridge.count_endpoints();
        self.refresh_names(bridge, out)?;

        let mut drained = 0;
        loop {
            let Some(event) = MidiEvent::from_wire(bridge.dequeue_incoming_data()) else {
                break;
            };
            // A dequeue can itself trigger a rebuild.
            self.refresh_names(bridge, out)?;
            let name = self.names.get(&event.endpoint).map(String::as_str);
            let line = format_event(&event, name, Local::now());
            self.spinner.suspend(|| writeln!(out, "{}", line))?;
            drained += 1;
        }

        self.events_seen += drained as u64;
        // Taken after draining: a dequeue may have rebuilt the sessions.
        self.spinner.set_message(format!(
            "inputs: {}, epoch: {}, events: {}",
            bridge.endpoints().len(),
            bridge.epoch(),
            self.events_seen
        ));
        self.spinner.tick();
        Ok(drained)
    }

    /// Polls every `interval` until `ticks` ticks have run, or forever when
    /// `ticks` is `None`.
    pub fn run<P: MidiPlatform, W: Write>(
        &mut self,
        bridge: &mut MidiBridge<P>,
        interval: Duration,
        ticks: Option<u64>,
        out: &mut W,
    ) -> io::Result<()> {
        info!("Monitor polling every {:?}", interval);
        let mut tick = 0u64;
        while ticks.map_or(true, |limit| tick < limit) {
            let drained = self.poll_once(bridge, out)?;
            if drained > 0 {
                debug!("Tick {} drained {} events", tick, drained);
            }
            tick += 1;
            thread::sleep(interval);
        }
        self.spinner.finish_and_clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::MockPlatform;
    use chrono::TimeZone;

    #[test]
    fn test_format_event() {
        let at = Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let event = MidiEvent::new(EndpointId(1), 0x90, 0x3C, 0x7F);
        let line = format_event(&event, Some("Keys"), at);
        assert!(line.starts_with("03:04:05.000 Keys"));
        assert!(line.ends_with("90 3C 7F"));
    }

    #[test]
    fn test_format_event_without_name() {
        let at = Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let event = MidiEvent::new(EndpointId(1), 0xF8, 0, 0);
        assert!(format_event(&event, None, at).contains("<unknown>"));
    }

    #[test]
    fn test_poll_once_drains_and_names_events() {
        let mock = MockPlatform::new(&["Keys", "Pads"]);
        let mut bridge = MidiBridge::new(mock.clone());
        let mut monitor = Monitor::new(ProgressDrawTarget::hidden());
        let mut out = Vec::new();

        assert_eq!(monitor.poll_once(&mut bridge, &mut out).unwrap(), 0);
        mock.send(1, &[0x99, 36, 90]);
        mock.send(0, &[0x90, 60, 64]);
        assert_eq!(monitor.poll_once(&mut bridge, &mut out).unwrap(), 2);
        assert_eq!(monitor.events_seen(), 2);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].ends_with("Keys"));
        assert!(lines[1].ends_with("Pads"));
        assert!(lines[2].contains("Pads") && lines[2].ends_with("99 24 5A"));
        assert!(lines[3].contains("Keys") && lines[3].ends_with("90 3C 40"));
    }

    #[test]
    fn test_status_follows_topology_changes() {
        let mock = MockPlatform::with_devices(1);
        let mut bridge = MidiBridge::new(mock.clone());
        let mut monitor = Monitor::new(ProgressDrawTarget::hidden());
        let mut out = Vec::new();

        monitor.poll_once(&mut bridge, &mut out).unwrap();
        assert_eq!(monitor.status(), "inputs: 1, epoch: 1, events: 0");

        mock.send(0, &[0x90, 60, 100]);
        monitor.poll_once(&mut bridge, &mut out).unwrap();
        mock.add_device("Second");
        monitor.poll_once(&mut bridge, &mut out).unwrap();
        assert_eq!(monitor.status(), "inputs: 2, epoch: 2, events: 1");
    }

    #[test]
    fn test_run_stops_after_ticks() {
        let mock = MockPlatform::with_devices(1);
        let mut bridge = MidiBridge::new(mock);
        let mut monitor = Monitor::new(ProgressDrawTarget::hidden());
        let mut out = Vec::new();
        monitor
            .run(&mut bridge, Duration::from_millis(1), Some(3), &mut out)
            .unwrap();
        assert_eq!(monitor.events_seen(), 0);
    }
}
