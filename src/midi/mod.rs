//! MIDI input plumbing for the bridge
//!
//! This module provides:
//! - [`MidiEvent`] and its 64-bit wire form
//! - [`Ingress`], the per-session callback that feeds the message queue
//! - [`MidiPlatform`], the capability trait a MIDI input backend implements
//! - [`MidirPlatform`] for real devices via midir
//! - [`MockPlatform`] for tests
//!
mod event;
mod ingress;
pub mod midir_platform;
pub mod mock_platform;
mod platform;

pub use event::{EndpointId, MidiEvent, NO_DATA};
pub use ingress::Ingress;
pub use platform::{MidiError, MidiPlatform, Result};

pub use midir_platform::{MidirPlatform, MidirSession};
pub use mock_platform::{MockPlatform, MockSession};

// Set default platform type
#[cfg(not(feature = "test-mock"))]
pub type DefaultMidiPlatform = MidirPlatform;
#[cfg(feature = "test-mock")]
pub type DefaultMidiPlatform = MockPlatform;
