//! Event classification
//!
//! Maps parsed MIDI messages onto the controller's surface: pads, keys,
//! faders and the mode encoder. Classification is a pure function so the
//! engine never has to inspect raw messages; anything the map does not
//! recognize is either ignored (`None`) or passed through untouched.

use crate::chords::ChordQuality;
use crate::midi::MidiMessage;
use crate::voicing::Fader;

/// A classified controller event, ready for the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlEvent {
    PadPress(ChordQuality),
    KeyOn { root: u8, velocity: u8 },
    KeyOff { root: u8 },
    Fader { fader: Fader, value: u8 },
    ModeRotate { delta: i8 },
    ModePress,
    Passthrough(MidiMessage),
}

/// Controller surface assignments
///
/// Defaults match the MiniLab 3 factory map: pads on channel 8 ("channel 9"
/// on the hardware), pad notes 36-43 in chord-quality order, the four
/// faders on CCs 14/15/30/31 and the main encoder on CC 28 with its press
/// on CC 118.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerMap {
    pub pad_channel: u8,
    pub pad_notes: [u8; 8],
    pub fader_ccs: [u8; 4],
    pub mode_cc: u8,
    pub mode_press_cc: u8,
    /// Treat a note in `pad_notes` as a pad even off the pad channel.
    /// The hardware occasionally emits pads on the key channel.
    pub coerce_pad_notes: bool,
}

impl Default for ControllerMap {
    fn default() -> Self {
        ControllerMap {
            pad_channel: 8,
            pad_notes: [36, 37, 38, 39, 40, 41, 42, 43],
            fader_ccs: [14, 15, 30, 31],
            mode_cc: 28,
            mode_press_cc: 118,
            coerce_pad_notes: true,
        }
    }
}

impl ControllerMap {
    fn is_pad(&self, channel: u8, note: u8) -> bool {
        let on_pad_channel = channel == self.pad_channel;
        let is_pad_note = self.pad_notes.contains(&note);
        (on_pad_channel || (self.coerce_pad_notes && is_pad_note)) && is_pad_note
    }

    fn pad_quality(&self, note: u8) -> Option<ChordQuality> {
        self.pad_notes
            .iter()
            .position(|&n| n == note)
            .map(|index| ChordQuality::ALL[index])
    }
}

/// Classify a parsed message against the controller map.
///
/// Returns `None` for messages that should be ignored silently: pad
/// releases, unknown notes on the pad channel, the encoder detent and
/// unmapped CC numbers. Message types with no mapping at all come back as
/// `Passthrough` so the caller can forward them unchanged.
pub fn classify(msg: &MidiMessage, map: &ControllerMap) -> Option<ControlEvent> {
    match msg {
        MidiMessage::NoteOn {
            channel,
            note,
            velocity,
        } => {
            if map.is_pad(*channel, *note) {
                return map.pad_quality(*note).map(ControlEvent::PadPress);
            }
            if *channel == map.pad_channel {
                // Unknown note on the pad channel
                return None;
            }
            Some(ControlEvent::KeyOn {
                root: *note,
                velocity: *velocity,
            })
        }
        MidiMessage::NoteOff { channel, note, .. } => {
            if map.is_pad(*channel, *note) || *channel == map.pad_channel {
                // Pad releases carry no meaning
                return None;
            }
            Some(ControlEvent::KeyOff { root: *note })
        }
        MidiMessage::ControlChange {
            controller, value, ..
        } => {
            if let Some(index) = map.fader_ccs.iter().position(|&cc| cc == *controller) {
                return Some(ControlEvent::Fader {
                    fader: Fader::ALL[index],
                    value: *value,
                });
            }
            if *controller == map.mode_cc {
                return match value {
                    64 => None, // detent
                    v if *v > 64 => Some(ControlEvent::ModeRotate { delta: 1 }),
                    _ => Some(ControlEvent::ModeRotate { delta: -1 }),
                };
            }
            if *controller == map.mode_press_cc {
                return if *value > 0 {
                    Some(ControlEvent::ModePress)
                } else {
                    None
                };
            }
            None
        }
        other => Some(ControlEvent::Passthrough(other.clone())),
    }
}
