use super::Ingress;
use std::error::Error;
use std::fmt;

/// Errors reported by a MIDI platform backend
#[derive(Debug)]
pub enum MidiError {
    /// The platform client could not be created
    InitError(String),
    /// A device slot the platform reported is no longer there
    PortNotFound(usize),
    /// Opening a session on a device slot failed
    ConnectionError(String),
    /// A session was opened but could not be started
    StartError(String),
    /// The device name could not be queried
    NameError(String),
}

impl fmt::Display for MidiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MidiError::InitError(msg) => write!(f, "MIDI init error: {}", msg),
            MidiError::PortNotFound(slot) => write!(f, "MIDI input slot {} not found", slot),
            MidiError::ConnectionError(msg) => write!(f, "MIDI connection error: {}", msg),
            MidiError::StartError(msg) => write!(f, "MIDI start error: {}", msg),
            MidiError::NameError(msg) => write!(f, "MIDI name query error: {}", msg),
        }
    }
}

impl Error for MidiError {}

impl From<midir::InitError> for MidiError {
    fn from(err: midir::InitError) -> Self {
        MidiError::InitError(err.to_string())
    }
}

impl<T> From<midir::ConnectError<T>> for MidiError {
    fn from(err: midir::ConnectError<T>) -> Self {
        MidiError::ConnectionError(err.to_string())
    }
}

impl From<midir::PortInfoError> for MidiError {
    fn from(err: midir::PortInfoError) -> Self {
        MidiError::NameError(err.to_string())
    }
}

/// Result type for MIDI platform operations
pub type Result<T> = std::result::Result<T, MidiError>;

/// The slice of an operating-system MIDI input subsystem the bridge needs.
///
/// Slots are positional: `0..device_count()` are the inputs present at the
/// moment of the query. A session is whatever the backend needs to keep one
/// input connection alive; the bridge only ever moves it around and hands it
/// back to the backend.
pub trait MidiPlatform {
    type Session;

    /// Number of input devices currently present
    fn device_count(&self) -> usize;

    /// Names of the input devices currently present, in slot order. Nothing
    /// is opened to answer this.
    fn device_names(&self) -> Vec<String>;

    /// Opens the device at `slot`. Messages it receives go to `ingress`,
    /// which stays disarmed until [`MidiPlatform::start`] is called.
    fn open(&mut self, slot: usize, ingress: Ingress) -> Result<Self::Session>;

    /// Starts delivery for an opened session
    fn start(&mut self, session: &mut Self::Session) -> Result<()>;

    /// Closes a session. No callback for it may run after this returns.
    fn close(&mut self, session: Self::Session);

    /// Human-readable name of the device behind a session
    fn name_of(&self, session: &Self::Session) -> Result<String>;
}
