//! MIDI wire codec
//!
//! Parses raw bytes from the controller into typed messages and encodes
//! outgoing messages back to bytes. Channels are 0-based throughout.

/// A parsed MIDI message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MidiMessage {
    NoteOn {
        channel: u8,
        note: u8,
        velocity: u8,
    },
    NoteOff {
        channel: u8,
        note: u8,
        velocity: u8,
    },
    ControlChange {
        channel: u8,
        controller: u8,
        value: u8,
    },
    ProgramChange {
        channel: u8,
        program: u8,
    },
    PitchBend {
        channel: u8,
        value: i16,
    },
    Aftertouch {
        channel: u8,
        note: u8,
        pressure: u8,
    },
    ChannelPressure {
        channel: u8,
        pressure: u8,
    },
    SysEx {
        data: Vec<u8>,
    },
    Clock,
    Start,
    Stop,
    Continue,
}

impl MidiMessage {
    /// Parse raw MIDI bytes into a message.
    ///
    /// Note-on with velocity 0 is normalized to note-off at this layer, so
    /// downstream code never has to special-case it. Returns `None` for
    /// truncated or unrecognized data.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.is_empty() {
            return None;
        }

        let status = bytes[0];
        let channel = status & 0x0F;
        match status & 0xF0 {
            0x90 if bytes.len() >= 3 && (bytes[2] & 0x7F) > 0 => Some(MidiMessage::NoteOn {
                channel,
                note: bytes[1] & 0x7F,
                velocity: bytes[2] & 0x7F,
            }),
            0x90 if bytes.len() >= 3 => Some(MidiMessage::NoteOff {
                channel,
                note: bytes[1] & 0x7F,
                velocity: 0,
            }),
            0x80 if bytes.len() >= 3 => Some(MidiMessage::NoteOff {
                channel,
                note: bytes[1] & 0x7F,
                velocity: bytes[2] & 0x7F,
            }),
            0xA0 if bytes.len() >= 3 => Some(MidiMessage::Aftertouch {
                channel,
                note: bytes[1] & 0x7F,
                pressure: bytes[2] & 0x7F,
            }),
            0xB0 if bytes.len() >= 3 => Some(MidiMessage::ControlChange {
                channel,
                controller: bytes[1] & 0x7F,
                value: bytes[2] & 0x7F,
            }),
            0xC0 if bytes.len() >= 2 => Some(MidiMessage::ProgramChange {
                channel,
                program: bytes[1] & 0x7F,
            }),
            0xD0 if bytes.len() >= 2 => Some(MidiMessage::ChannelPressure {
                channel,
                pressure: bytes[1] & 0x7F,
            }),
            0xE0 if bytes.len() >= 3 => {
                let lsb = (bytes[1] & 0x7F) as i16;
                let msb = (bytes[2] & 0x7F) as i16;
                let value = ((msb << 7) | lsb) - 8192;
                Some(MidiMessage::PitchBend { channel, value })
            }
            0xF0 => match status {
                0xF0 if bytes.len() >= 2 && bytes[bytes.len() - 1] == 0xF7 => {
                    Some(MidiMessage::SysEx {
                        data: bytes[1..bytes.len() - 1].to_vec(),
                    })
                }
                0xF8 => Some(MidiMessage::Clock),
                0xFA => Some(MidiMessage::Start),
                0xFB => Some(MidiMessage::Continue),
                0xFC => Some(MidiMessage::Stop),
                _ => None,
            },
            _ => None,
        }
    }

    /// Convert to raw MIDI bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            MidiMessage::NoteOn {
                channel,
                note,
                velocity,
            } => {
                vec![0x90 | (channel & 0x0F), *note & 0x7F, *velocity & 0x7F]
            }
            MidiMessage::NoteOff {
                channel,
                note,
                velocity,
            } => {
                vec![0x80 | (channel & 0x0F), *note & 0x7F, *velocity & 0x7F]
            }
            MidiMessage::ControlChange {
                channel,
                controller,
                value,
            } => {
                vec![0xB0 | (channel & 0x0F), *controller & 0x7F, *value & 0x7F]
            }
            MidiMessage::ProgramChange { channel, program } => {
                vec![0xC0 | (channel & 0x0F), *program & 0x7F]
            }
            MidiMessage::PitchBend { channel, value } => {
                let value = (*value + 8192).max(0).min(16383) as u16;
                vec![
                    0xE0 | (channel & 0x0F),
                    (value & 0x7F) as u8,
                    ((value >> 7) & 0x7F) as u8,
                ]
            }
            MidiMessage::Aftertouch {
                channel,
                note,
                pressure,
            } => {
                vec![0xA0 | (channel & 0x0F), *note & 0x7F, *pressure & 0x7F]
            }
            MidiMessage::ChannelPressure { channel, pressure } => {
                vec![0xD0 | (channel & 0x0F), *pressure & 0x7F]
            }
            MidiMessage::SysEx { data } => {
                let mut bytes = vec![0xF0];
                bytes.extend_from_slice(data);
                bytes.push(0xF7);
                bytes
            }
            MidiMessage::Clock => vec![0xF8],
            MidiMessage::Start => vec![0xFA],
            MidiMessage::Stop => vec![0xFC],
            MidiMessage::Continue => vec![0xFB],
        }
    }
}

/// Convert MIDI note number to a display note name (60 -> "C4")
pub fn note_name(note: u8) -> String {
    let note_names = [
        "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
    ];
    let octave = (note / 12) as i32 - 1;
    let note_index = (note % 12) as usize;
    format!("{}{}", note_names[note_index], octave)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_name() {
        assert_eq!(note_name(60), "C4");
        assert_eq!(note_name(69), "A4");
        assert_eq!(note_name(61), "C#4");
        assert_eq!(note_name(0), "C-1");
        assert_eq!(note_name(127), "G9");
    }

    #[test]
    fn test_parse_note_on() {
        let bytes = [0x98, 36, 100]; // Note on, channel 8, pad 36, velocity 100
        let msg = MidiMessage::from_bytes(&bytes).unwrap();
        assert_eq!(
            msg,
            MidiMessage::NoteOn {
                channel: 8,
                note: 36,
                velocity: 100
            }
        );
    }

    #[test]
    fn test_parse_note_off() {
        let bytes = [0x80, 60, 64];
        let msg = MidiMessage::from_bytes(&bytes).unwrap();
        assert_eq!(
            msg,
            MidiMessage::NoteOff {
                channel: 0,
                note: 60,
                velocity: 64
            }
        );
    }

    #[test]
    fn test_parse_note_on_zero_velocity() {
        let bytes = [0x90, 60, 0]; // Note on with velocity 0 = note off
        let msg = MidiMessage::from_bytes(&bytes).unwrap();
        assert_eq!(
            msg,
            MidiMessage::NoteOff {
                channel: 0,
                note: 60,
                velocity: 0
            }
        );
    }

    #[test]
    fn test_parse_control_change() {
        let bytes = [0xB0, 14, 127];
        let msg = MidiMessage::from_bytes(&bytes).unwrap();
        assert_eq!(
            msg,
            MidiMessage::ControlChange {
                channel: 0,
                controller: 14,
                value: 127
            }
        );
    }

    #[test]
    fn test_parse_pitch_bend() {
        // Center position: lsb 0x00, msb 0x40 -> 0
        let msg = MidiMessage::from_bytes(&[0xE0, 0x00, 0x40]).unwrap();
        assert_eq!(msg, MidiMessage::PitchBend { channel: 0, value: 0 });

        // Full up -> 8191, full down -> -8192
        let up = MidiMessage::from_bytes(&[0xE0, 0x7F, 0x7F]).unwrap();
        assert_eq!(up, MidiMessage::PitchBend { channel: 0, value: 8191 });
        let down = MidiMessage::from_bytes(&[0xE0, 0x00, 0x00]).unwrap();
        assert_eq!(
            down,
            MidiMessage::PitchBend {
                channel: 0,
                value: -8192
            }
        );
    }

    #[test]
    fn test_parse_sysex() {
        let bytes = [0xF0, 0x00, 0x20, 0x6B, 0x7F, 0xF7];
        let msg = MidiMessage::from_bytes(&bytes).unwrap();
        assert_eq!(
            msg,
            MidiMessage::SysEx {
                data: vec![0x00, 0x20, 0x6B, 0x7F]
            }
        );
    }

    #[test]
    fn test_parse_truncated() {
        assert_eq!(MidiMessage::from_bytes(&[]), None);
        assert_eq!(MidiMessage::from_bytes(&[0x90]), None);
        assert_eq!(MidiMessage::from_bytes(&[0x90, 60]), None);
        assert_eq!(MidiMessage::from_bytes(&[0xB0, 14]), None);
    }

    #[test]
    fn test_roundtrip_channel_voice() {
        let messages = vec![
            MidiMessage::NoteOn {
                channel: 8,
                note: 40,
                velocity: 96,
            },
            MidiMessage::NoteOff {
                channel: 0,
                note: 60,
                velocity: 0,
            },
            MidiMessage::ControlChange {
                channel: 0,
                controller: 28,
                value: 65,
            },
            MidiMessage::ProgramChange {
                channel: 2,
                program: 12,
            },
            MidiMessage::PitchBend {
                channel: 1,
                value: -1024,
            },
            MidiMessage::Aftertouch {
                channel: 0,
                note: 48,
                pressure: 77,
            },
            MidiMessage::ChannelPressure {
                channel: 3,
                pressure: 55,
            },
        ];

        for msg in messages {
            let parsed = MidiMessage::from_bytes(&msg.to_bytes()).unwrap();
            assert_eq!(parsed, msg);
        }
    }

    #[test]
    fn test_roundtrip_realtime() {
        for msg in [
            MidiMessage::Clock,
            MidiMessage::Start,
            MidiMessage::Stop,
            MidiMessage::Continue,
        ] {
            let parsed = MidiMessage::from_bytes(&msg.to_bytes()).unwrap();
            assert_eq!(parsed, msg);
        }
    }
}
