pub mod bridge;
pub mod cli;
pub mod config;
pub mod logging;
pub mod midi;
pub mod monitor;
pub mod queue;
pub mod registry;
pub mod session;

pub use bridge::MidiBridge;
pub use cli::Args;
pub use crate::config::Settings;
pub use midi::{DefaultMidiPlatform, EndpointId, MidiEvent, MidiPlatform, NO_DATA};
pub use queue::MessageQueue;
pub use registry::EndpointRegistry;
pub use session::{Refresh, SessionController};

#[cfg(not(feature = "test-mock"))]
pub fn create_platform(settings: &Settings) -> midi::Result<DefaultMidiPlatform> {
    midi::MidirPlatform::new(&settings.client_name)
}

#[cfg(feature = "test-mock")]
pub fn create_platform(_settings: &Settings) -> midi::Result<DefaultMidiPlatform> {
    Ok(midi::MockPlatform::with_devices(2))
}

pub fn create_bridge(settings: &Settings) -> midi::Result<MidiBridge<DefaultMidiPlatform>> {
    Ok(MidiBridge::new(create_platform(settings)?))
}

/// Names of the MIDI inputs a platform reports, without opening any of them.
pub fn list_devices<P: MidiPlatform>(platform: &P) -> Vec<String> {
    platform.device_names()
}

/// Names of the MIDI inputs present right now, in slot order.
pub fn handle_device_list(settings: &Settings) -> midi::Result<Vec<String>> {
    Ok(list_devices(&create_platform(settings)?))
}
