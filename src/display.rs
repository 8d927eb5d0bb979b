//! MiniLab 3 feedback
//!
//! SysEx encoding for the controller's OLED and pad LEDs, plus the
//! `FeedbackSink` capability the runner talks to. The encoders are pure
//! functions so they can be tested without hardware; `MiniLabDisplay` wraps
//! a real output connection and `NullFeedback` discards everything, so
//! callers never branch on whether feedback is attached.

use midir::MidiOutputConnection;
use tracing::warn;

const MANUFACTURER_ID: [u8; 3] = [0x00, 0x20, 0x6B];
const DEVICE_ID: [u8; 3] = [0x7F, 0x42, 0x04];
const OLED_COMMAND: [u8; 3] = [0x02, 0x60, 0x01];
const PAD_COMMAND: [u8; 3] = [0x02, 0x02, 0x16];

const OLED_LINE_LEN: usize = 16;

/// Pad LED color, each channel in the controller's 0-127 range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Build a color, clamping each channel to 127
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb {
            r: r.min(127),
            g: g.min(127),
            b: b.min(127),
        }
    }

    /// Dimmed variant, each channel divided by `divisor`
    pub fn scaled(&self, divisor: u8) -> Rgb {
        let d = divisor.max(1);
        Rgb {
            r: self.r / d,
            g: self.g / d,
            b: self.b / d,
        }
    }
}

fn encode_line(text: &str) -> impl Iterator<Item = u8> + '_ {
    text.bytes()
        .take(OLED_LINE_LEN)
        .map(|b| b & 0x7F)
        .chain(std::iter::repeat(0x20))
        .take(OLED_LINE_LEN)
}

/// Encode both OLED lines as a complete SysEx frame.
///
/// Lines are truncated to 16 bytes, space-padded, and masked to 7 bits.
/// The frame is always 43 bytes: F0, 9 header bytes, two 16-byte lines, F7.
pub fn encode_oled(line1: &str, line2: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(43);
    bytes.push(0xF0);
    bytes.extend_from_slice(&MANUFACTURER_ID);
    bytes.extend_from_slice(&DEVICE_ID);
    bytes.extend_from_slice(&OLED_COMMAND);
    bytes.extend(encode_line(line1));
    bytes.extend(encode_line(line2));
    bytes.push(0xF7);
    bytes
}

/// Encode a single pad LED update as a complete SysEx frame
pub fn encode_pad_color(pad: u8, color: Rgb) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(15);
    bytes.push(0xF0);
    bytes.extend_from_slice(&MANUFACTURER_ID);
    bytes.extend_from_slice(&DEVICE_ID);
    bytes.extend_from_slice(&PAD_COMMAND);
    bytes.extend_from_slice(&[pad, color.r, color.g, color.b]);
    bytes.push(0xF7);
    bytes
}

/// Where engine feedback goes. Infallible by contract: implementations log
/// transport failures rather than surfacing them, because losing feedback
/// must not interrupt a performance.
pub trait FeedbackSink {
    fn display(&mut self, line1: &str, line2: &str);
    fn pad_color(&mut self, pad: u8, color: Rgb);
}

/// Real feedback over a MIDI output connection to the controller
pub struct MiniLabDisplay {
    connection: MidiOutputConnection,
}

impl MiniLabDisplay {
    pub fn new(connection: MidiOutputConnection) -> Self {
        MiniLabDisplay { connection }
    }
}

impl FeedbackSink for MiniLabDisplay {
    fn display(&mut self, line1: &str, line2: &str) {
        if let Err(e) = self.connection.send(&encode_oled(line1, line2)) {
            warn!("Failed to send OLED update: {}", e);
        }
    }

    fn pad_color(&mut self, pad: u8, color: Rgb) {
        if let Err(e) = self.connection.send(&encode_pad_color(pad, color)) {
            warn!("Failed to send pad color update: {}", e);
        }
    }
}

/// Silent sink for sessions without a feedback port
pub struct NullFeedback;

impl FeedbackSink for NullFeedback {
    fn display(&mut self, _line1: &str, _line2: &str) {}

    fn pad_color(&mut self, _pad: u8, _color: Rgb) {}
}
