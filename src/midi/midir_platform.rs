use crate::midi::{Ingress, MidiError, MidiPlatform, Result};
use log::debug;
use midir::{Ignore, MidiInput, MidiInputConnection, MidiInputPort};

/// Hardware MIDI input through `midir`.
pub struct MidirPlatform {
    client_name: String,
    probe: MidiInput,
}

/// One live `midir` input connection.
pub struct MidirSession {
    connection: MidiInputConnection<Ingress>,
    port: MidiInputPort,
    ingress: Ingress,
}

impl MidirPlatform {
    pub fn new(client_name: &str) -> Result<Self> {
        let probe = MidiInput::new(&format!("{}-probe", client_name))?;
        Ok(MidirPlatform {
            client_name: client_name.to_string(),
            probe,
        })
    }
}

impl MidiPlatform for MidirPlatform {
    type Session = MidirSession;

    fn device_count(&self) -> usize {
        self.probe.port_count()
    }

    fn device_names(&self) -> Vec<String> {
        self.probe
            .ports()
            .iter()
            .filter_map(|p| self.probe.port_name(p).ok())
            .collect()
    }

    fn open(&mut self, slot: usize, ingress: Ingress) -> Result<MidirSession> {
        let port = self
            .probe
            .ports()
            .get(slot)
            .cloned()
            .ok_or(MidiError::PortNotFound(slot))?;

        let mut midi_in = MidiInput::new(&self.client_name)?;
        midi_in.ignore(Ignore::Sysex);

        let connection = midi_in.connect(
            &port,
            &format!("{}-in-{}", self.client_name, ingress.endpoint()),
            |_stamp, message, ingress: &mut Ingress| {
                ingress.on_bytes(message);
            },
            ingress.clone(),
        )?;

        debug!("Opened MIDI input slot {} as {}", slot, ingress.endpoint());
        Ok(MidirSession {
            connection,
            port,
            ingress,
        })
    }

    fn start(&mut self, session: &mut MidirSession) -> Result<()> {
        session.ingress.arm();
        Ok(())
    }

    fn close(&mut self, session: MidirSession) {
        let endpoint = session.ingress.endpoint();
        let (_midi_in, _ingress) = session.connection.close();
        debug!("Closed MIDI input {}", endpoint);
    }

    fn name_of(&self, session: &MidirSession) -> Result<String> {
        Ok(self.probe.port_name(&session.port)?)
    }
}
