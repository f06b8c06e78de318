//! MIDI input device handling
//!
//! Port enumeration, selection (index, name pattern, or interactive prompt)
//! and the midir connection that feeds decoded messages into the run loop.

use anyhow::{bail, Context, Result};
use midir::{MidiInput, MidiInputConnection, MidiInputPort};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::midi::{format_hex, MidiMessage};

const CLIENT_NAME: &str = "midi-commander";

/// Listener over one MIDI input port
pub struct MidiListener {
    /// MIDI input connection; dropping it releases the device
    conn: Option<MidiInputConnection<()>>,

    /// Event sender handed to the midir callback
    event_tx: mpsc::Sender<MidiMessage>,

    /// Event receiver, taken by the run loop
    event_rx: Option<mpsc::Receiver<MidiMessage>>,

    /// Name of the connected port
    connected_port: Option<String>,
}

impl MidiListener {
    pub fn new() -> Self {
        let (event_tx, event_rx) = mpsc::channel(1000);

        Self {
            conn: None,
            event_tx,
            event_rx: Some(event_rx),
            connected_port: None,
        }
    }

    /// List available MIDI input port names
    pub fn list_input_ports() -> Result<Vec<String>> {
        let midi_in = MidiInput::new(CLIENT_NAME).context("Failed to create MIDI input")?;

        let mut port_names = Vec::new();
        for port in midi_in.ports() {
            if let Ok(name) = midi_in.port_name(&port) {
                port_names.push(name);
            }
        }

        Ok(port_names)
    }

    /// Connect to a port by list index
    pub fn connect_by_index(&mut self, index: usize) -> Result<String> {
        let midi_in = MidiInput::new(CLIENT_NAME).context("Failed to create MIDI input")?;

        let Some(port) = midi_in.ports().into_iter().nth(index) else {
            bail!("No MIDI input port at index {}", index);
        };

        self.connect_port(midi_in, port)
    }

    /// Connect by selection string: a numeric index, or a case-insensitive
    /// name substring (matching by name survives port reordering).
    pub fn connect_matching(&mut self, selection: &str) -> Result<String> {
        if let Ok(index) = selection.parse::<usize>() {
            return self.connect_by_index(index);
        }

        let midi_in = MidiInput::new(CLIENT_NAME).context("Failed to create MIDI input")?;
        let needle = selection.to_lowercase();

        for port in midi_in.ports() {
            if let Ok(name) = midi_in.port_name(&port) {
                if name.to_lowercase().contains(&needle) {
                    debug!("Port '{}' matches pattern '{}'", name, selection);
                    return self.connect_port(midi_in, port);
                }
            }
        }

        bail!("No MIDI input port matching '{}'", selection)
    }

    fn connect_port(&mut self, midi_in: MidiInput, port: MidiInputPort) -> Result<String> {
        let port_name = midi_in
            .port_name(&port)
            .context("Failed to read port name")?;

        info!("Connecting to input port: {}", port_name);

        let event_tx = self.event_tx.clone();
        let conn = midi_in
            .connect(
                &port,
                CLIENT_NAME,
                move |_timestamp, data, _| {
                    if let Some(message) = MidiMessage::parse(data) {
                        // Never block or panic inside the midir callback
                        let _ = event_tx.try_send(message);
                    } else {
                        debug!("Unparseable MIDI bytes: {}", format_hex(data));
                    }
                },
                (),
            )
            .map_err(|e| anyhow::anyhow!(e.to_string()))
            .with_context(|| format!("Failed to connect to input port '{}'", port_name))?;

        self.conn = Some(conn);
        self.connected_port = Some(port_name.clone());
        Ok(port_name)
    }

    /// Take the event receiver (once)
    pub fn take_event_receiver(&mut self) -> Option<mpsc::Receiver<MidiMessage>> {
        self.event_rx.take()
    }

    pub fn connected_port(&self) -> Option<&str> {
        self.connected_port.as_deref()
    }

    /// Release the input device
    pub fn disconnect(&mut self) {
        if let Some(conn) = self.conn.take() {
            conn.close();
            info!("MIDI input disconnected");
        }
        self.connected_port = None;
    }
}

impl Drop for MidiListener {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Prompt once on stdin for a port index.
///
/// Invalid input is a hard error by design: the run ends instead of
/// re-prompting.
pub fn prompt_port_index(port_count: usize) -> Result<usize> {
    use std::io::Write;

    print!("Select port index: ");
    std::io::stdout().flush().ok();

    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;

    let trimmed = line.trim();
    let index: usize = trimmed
        .parse()
        .with_context(|| format!("Invalid selection: '{}'", trimmed))?;

    if index >= port_count {
        bail!("Invalid selection: index {} out of range (0-{})", index, port_count - 1);
    }

    Ok(index)
}
