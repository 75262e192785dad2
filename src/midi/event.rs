use std::fmt;

/// Identifier handed out to the host for one open input session.
///
/// Zero is reserved as the invalid id; every live session has a nonzero id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EndpointId(pub u32);

impl EndpointId {
    pub const INVALID: EndpointId = EndpointId(0);

    pub fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// Value returned across the polling boundary when the queue is empty.
pub const NO_DATA: u64 = 0;

/// One short MIDI message as received from an input session.
///
/// The bytes are kept exactly as the hardware sent them. Channel and message
/// type are left for the consumer to interpret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiEvent {
    pub endpoint: EndpointId,
    pub status: u8,
    pub data1: u8,
    pub data2: u8,
}

impl MidiEvent {
    pub fn new(endpoint: EndpointId, status: u8, data1: u8, data2: u8) -> Self {
        Self {
            endpoint,
            status,
            data1,
            data2,
        }
    }

    /// Builds an event from a packed short-message word: status in byte 0,
    /// data1 in byte 1, data2 in byte 2. Anything above bit 23 is ignored.
    pub fn from_short_message(endpoint: EndpointId, param: u32) -> Self {
        Self {
            endpoint,
            status: (param & 0xFF) as u8,
            data1: ((param >> 8) & 0xFF) as u8,
            data2: ((param >> 16) & 0xFF) as u8,
        }
    }

    /// Packs the event into its 64-bit wire form.
    ///
    /// Layout: endpoint id in bits 63..32, status in 31..24, data1 in 23..16,
    /// data2 in 15..8. The low byte is always zero.
    pub fn to_wire(self) -> u64 {
        (u64::from(self.endpoint.0) << 32)
            | (u64::from(self.status) << 24)
            | (u64::from(self.data1) << 16)
            | (u64::from(self.data2) << 8)
    }

    /// Unpacks a wire value. Returns `None` for the [`NO_DATA`] sentinel.
    pub fn from_wire(value: u64) -> Option<Self> {
        if value == NO_DATA {
            return None;
        }
        Some(Self {
            endpoint: EndpointId((value >> 32) as u32),
            status: ((value >> 24) & 0xFF) as u8,
            data1: ((value >> 16) & 0xFF) as u8,
            data2: ((value >> 8) & 0xFF) as u8,
        })
    }
}

impl fmt::Display for MidiEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {:02X} {:02X} {:02X}",
            self.endpoint, self.status, self.data1, self.data2
        )
    }
}
