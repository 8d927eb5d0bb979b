//! MIDI port discovery and connection
//!
//! Thin wrappers around `midir` for listing ports, picking them by name
//! heuristics, and opening the three connections a session needs: the
//! controller input, the chord output, and the optional feedback output.
//! The input callback only parses bytes and forwards messages over an mpsc
//! channel; all state stays on the receiving thread.

use crate::midi::{note_name, MidiMessage};
use midir::{Ignore, MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};
use std::error::Error;
use std::sync::mpsc::{channel, Receiver};
use tracing::{debug, info};

const CLIENT_NAME: &str = "chordlab";

/// Names of all available MIDI input ports
pub fn input_names() -> Result<Vec<String>, Box<dyn Error>> {
    let midi_in = MidiInput::new(CLIENT_NAME)?;
    midi_in
        .ports()
        .iter()
        .map(|port| midi_in.port_name(port).map_err(Into::into))
        .collect()
}

/// Names of all available MIDI output ports
pub fn output_names() -> Result<Vec<String>, Box<dyn Error>> {
    let midi_out = MidiOutput::new(CLIENT_NAME)?;
    midi_out
        .ports()
        .iter()
        .map(|port| midi_out.port_name(port).map_err(Into::into))
        .collect()
}

/// First name containing any needle, case-insensitively
pub fn pick_first(names: &[String], needles: &[&str]) -> Option<String> {
    names
        .iter()
        .find(|name| {
            let lower = name.to_lowercase();
            needles.iter().any(|needle| lower.contains(needle))
        })
        .cloned()
}

/// Result of port auto-discovery
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PortChoice {
    pub input: Option<String>,
    pub output: Option<String>,
    pub feedback: Option<String>,
}

/// Guess ports by common names.
///
/// Input and feedback look for the controller itself; the chord output
/// prefers a loopback destination (IAC, loopMIDI and friends), then
/// anything DAW-ish, then whatever is first. An empty output list leaves
/// the output unset so the caller can create a virtual port.
pub fn auto_pick(inputs: &[String], outputs: &[String]) -> PortChoice {
    let controller = ["minilab", "arturia"];
    PortChoice {
        input: pick_first(inputs, &controller).or_else(|| inputs.first().cloned()),
        feedback: pick_first(outputs, &controller),
        output: pick_first(outputs, &["iac", "chordout", "loopmidi", "loopbe", "bus"])
            .or_else(|| pick_first(outputs, &["daw"]))
            .or_else(|| outputs.first().cloned()),
    }
}

/// Open an input port by (partial) name.
///
/// The connection's callback parses each incoming buffer and forwards the
/// message over the returned channel. SysEx and timing traffic is filtered
/// at the driver level.
pub fn open_input(
    name: &str,
) -> Result<(MidiInputConnection<()>, Receiver<MidiMessage>), Box<dyn Error>> {
    let mut midi_in = MidiInput::new(CLIENT_NAME)?;
    midi_in.ignore(Ignore::Sysex | Ignore::Time);

    let port = find_port(&midi_in.ports(), |p| midi_in.port_name(p), name)?;
    let (sender, receiver) = channel();
    let connection = midi_in.connect(
        &port,
        "chordlab-in",
        move |_timestamp, bytes, _| {
            if let Some(msg) = MidiMessage::from_bytes(bytes) {
                let _ = sender.send(msg);
            }
        },
        (),
    )?;
    info!("Opened MIDI input '{}'", name);
    Ok((connection, receiver))
}

/// Open an output port by (partial) name
pub fn open_output(name: &str) -> Result<MidiOutputConnection, Box<dyn Error>> {
    let midi_out = MidiOutput::new(CLIENT_NAME)?;
    let port = find_port(&midi_out.ports(), |p| midi_out.port_name(p), name)?;
    let connection = midi_out.connect(&port, "chordlab-out")?;
    info!("Opened MIDI output '{}'", name);
    Ok(connection)
}

/// Create a virtual output port other applications can connect to.
///
/// Used when auto-discovery finds no loopback destination for the chords.
#[cfg(unix)]
pub fn create_virtual_output(name: &str) -> Result<MidiOutputConnection, Box<dyn Error>> {
    use midir::os::unix::VirtualOutput;
    let midi_out = MidiOutput::new(CLIENT_NAME)?;
    let connection = midi_out.create_virtual(name)?;
    info!("Created virtual MIDI output '{}'", name);
    Ok(connection)
}

#[cfg(not(unix))]
pub fn create_virtual_output(_name: &str) -> Result<MidiOutputConnection, Box<dyn Error>> {
    Err("Virtual MIDI ports are not supported on this platform; \
         install a loopback driver (e.g. loopMIDI) and pass --out"
        .into())
}

/// Open an input port and print every message it receives.
///
/// Nothing is filtered here, unlike `open_input` - a monitor should see
/// clock and SysEx traffic too. With `raw` set, messages print as hex
/// bytes instead of parsed form.
pub fn open_monitor(name: &str, raw: bool) -> Result<MidiInputConnection<()>, Box<dyn Error>> {
    let mut midi_in = MidiInput::new(CLIENT_NAME)?;
    midi_in.ignore(Ignore::None);

    let port = find_port(&midi_in.ports(), |p| midi_in.port_name(p), name)?;
    let connection = midi_in.connect(
        &port,
        "chordlab-monitor",
        move |timestamp, bytes, _| {
            if raw {
                let hex: Vec<String> = bytes.iter().map(|b| format!("{:02X}", b)).collect();
                println!("{:>12} {}", timestamp, hex.join(" "));
            } else {
                match MidiMessage::from_bytes(bytes) {
                    Some(MidiMessage::NoteOn {
                        channel,
                        note,
                        velocity,
                    }) => println!(
                        "{:>12} note_on  ch={} {} vel={}",
                        timestamp,
                        channel,
                        note_name(note),
                        velocity
                    ),
                    Some(MidiMessage::NoteOff { channel, note, .. }) => println!(
                        "{:>12} note_off ch={} {}",
                        timestamp,
                        channel,
                        note_name(note)
                    ),
                    Some(msg) => println!("{:>12} {:?}", timestamp, msg),
                    None => debug!("Unparseable message: {:?}", bytes),
                }
            }
        },
        (),
    )?;
    info!("Monitoring MIDI input '{}'", name);
    Ok(connection)
}

fn find_port<P: Clone, F>(ports: &[P], port_name: F, name: &str) -> Result<P, Box<dyn Error>>
where
    F: Fn(&P) -> Result<String, midir::PortInfoError>,
{
    let needle = name.to_lowercase();
    for port in ports {
        if port_name(port)?.to_lowercase().contains(&needle) {
            return Ok(port.clone());
        }
    }
    Err(format!("MIDI port '{}' not found", name).into())
}
