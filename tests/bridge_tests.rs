use midibridge::midi::{EndpointId, MidiEvent, MockPlatform, NO_DATA};
use midibridge::MidiBridge;
use std::sync::atomic::{AtomicBool, Ordering};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn bridge_with(devices: usize) -> (MidiBridge<MockPlatform>, MockPlatform) {
    init_logging();
    let mock = MockPlatform::with_devices(devices);
    (MidiBridge::new(mock.clone()), mock)
}

#[test]
fn test_events_come_back_in_arrival_order() {
    let (mut bridge, mock) = bridge_with(2);
    assert_eq!(bridge.count_endpoints(), 2);
    let first = bridge.endpoint_id_at_index(0);
    let second = bridge.endpoint_id_at_index(1);
    assert_ne!(first, second);

    assert!(mock.send(0, &[0x90, 60, 100]));
    assert!(mock.send(1, &[0xB0, 7, 64]));
    assert!(mock.send(0, &[0x80, 60, 0]));

    let expected = [
        MidiEvent::new(EndpointId(first), 0x90, 60, 100),
        MidiEvent::new(EndpointId(second), 0xB0, 7, 64),
        MidiEvent::new(EndpointId(first), 0x80, 60, 0),
    ];
    for event in expected {
        assert_eq!(bridge.dequeue_incoming_data(), event.to_wire());
    }
    assert_eq!(bridge.dequeue_incoming_data(), NO_DATA);
}

#[test]
fn test_device_count_change_discards_stale_events() {
    let (mut bridge, mock) = bridge_with(2);
    assert_eq!(bridge.count_endpoints(), 2);
    mock.send(1, &[0x90, 64, 90]);
    assert_eq!(bridge.pending(), 1);

    mock.add_device("Mock Device 3");
    assert_eq!(bridge.dequeue_incoming_data(), NO_DATA);
    assert_eq!(bridge.pending(), 0);
    assert_eq!(bridge.count_endpoints(), 3);
    assert_eq!(bridge.epoch(), 2);
}

#[test]
fn test_dequeue_alone_follows_topology() {
    let (mut bridge, mock) = bridge_with(1);
    assert_eq!(bridge.dequeue(), None);
    assert_eq!(mock.live_sessions(), 1);

    mock.send(0, &[0xF8]);
    let event = bridge.dequeue().unwrap();
    assert_eq!(event.status, 0xF8);
    assert_eq!(event.endpoint, bridge.id_at(0));
}

#[test]
fn test_dequeue_on_empty_queue_changes_nothing() {
    let (mut bridge, mock) = bridge_with(1);
    bridge.count_endpoints();
    let opens = mock.open_count();

    assert_eq!(bridge.dequeue_incoming_data(), NO_DATA);
    assert_eq!(bridge.dequeue_incoming_data(), NO_DATA);
    assert_eq!(bridge.pending(), 0);
    assert_eq!(mock.open_count(), opens);

    mock.send(0, &[0x90, 1, 2]);
    assert_eq!(bridge.pending(), 1);
}

#[test]
fn test_refresh_twice_does_no_work_the_second_time() {
    let (mut bridge, mock) = bridge_with(3);
    assert_eq!(bridge.refresh_and_count(), 3);
    let (opens, closes) = (mock.open_count(), mock.close_count());

    assert_eq!(bridge.refresh_and_count(), 3);
    assert_eq!(mock.open_count(), opens);
    assert_eq!(mock.close_count(), closes);
}

#[test]
fn test_old_ids_stop_resolving_after_rebuild() {
    let (mut bridge, mock) = bridge_with(2);
    bridge.count_endpoints();
    let old: Vec<u32> = (0..2).map(|i| bridge.endpoint_id_at_index(i)).collect();
    for id in &old {
        assert!(bridge.endpoint_name(*id).is_some());
    }

    mock.remove_device(0);
    assert_eq!(bridge.count_endpoints(), 1);
    for id in &old {
        assert_eq!(bridge.endpoint_name(*id), None);
    }
    let current = bridge.endpoint_id_at_index(0);
    assert!(!old.contains(&current));
    assert_eq!(bridge.endpoint_name(current).as_deref(), Some("Mock Device 2"));
}

#[test]
fn test_messages_after_unplug_are_not_delivered() {
    let (mut bridge, mock) = bridge_with(2);
    bridge.count_endpoints();
    mock.remove_device(1);
    bridge.count_endpoints();

    assert!(!mock.send(1, &[0x90, 60, 100]));
    assert!(mock.send(0, &[0x90, 61, 100]));
    let event = MidiEvent::from_wire(bridge.dequeue_incoming_data()).unwrap();
    assert_eq!(event.data1, 61);
}

#[test]
fn test_long_messages_never_reach_the_queue() {
    let (mut bridge, mock) = bridge_with(1);
    bridge.count_endpoints();
    mock.send(0, &[0xF0, 0x43, 0x10, 0x4C, 0x00, 0xF7]);
    assert_eq!(bridge.dequeue_incoming_data(), NO_DATA);
}

#[test]
fn test_name_failure_is_absent() {
    let (mut bridge, mock) = bridge_with(1);
    bridge.count_endpoints();
    let id = bridge.endpoint_id_at_index(0);
    mock.fail_names(true);
    assert_eq!(bridge.endpoint_name(id), None);
    mock.fail_names(false);
    assert_eq!(bridge.endpoint_name(id).as_deref(), Some("Mock Device 1"));
}

#[test]
fn test_unknown_ids_have_no_name() {
    let (mut bridge, _mock) = bridge_with(1);
    bridge.count_endpoints();
    assert_eq!(bridge.endpoint_name(0), None);
    assert_eq!(bridge.endpoint_name(0xDEAD_BEEF), None);
}

#[test]
fn test_short_message_words_are_unpacked() {
    let (mut bridge, mock) = bridge_with(1);
    bridge.count_endpoints();
    mock.send_short(0, 0x0045_40E0);
    let event = bridge.dequeue().unwrap();
    assert_eq!((event.status, event.data1, event.data2), (0xE0, 0x40, 0x45));
}

#[test]
fn test_producers_racing_rebuilds_never_leak_retired_ids() {
    let (mut bridge, mock) = bridge_with(2);
    bridge.count_endpoints();
    let stop = AtomicBool::new(false);
    let mut delivered = 0usize;
    let mut stale = Vec::new();

    crossbeam::thread::scope(|s| {
        for slot in 0..3usize {
            let mock = mock.clone();
            let stop = &stop;
            s.spawn(move |_| {
                let mut n = 0u8;
                while !stop.load(Ordering::Relaxed) {
                    mock.send(slot, &[0x90, n & 0x7F, 100]);
                    n = n.wrapping_add(1);
                }
            });
        }

        // Every round changes the device count, so the first dequeue of
        // each round rebuilds all sessions while the senders keep going.
        for round in 0..40 {
            if round % 2 == 0 {
                mock.add_device("Hot Plug");
            } else {
                mock.remove_device(0);
            }
            for _ in 0..200 {
                if let Some(event) = bridge.dequeue() {
                    delivered += 1;
                    if !bridge.endpoints().contains(&event.endpoint) {
                        stale.push(event);
                    }
                }
            }
        }
        stop.store(true, Ordering::Relaxed);
    })
    .unwrap();

    assert!(stale.is_empty(), "events from closed sessions: {:?}", stale);
    assert_eq!(bridge.epoch(), 41);
    log::debug!("delivered {} events across rebuilds", delivered);
}
