//! Chord voicing pipeline
//!
//! Turns a root note, a chord quality and the four fader values into the
//! concrete set of MIDI notes to sound. Stages run in a fixed order (base,
//! spread, complexity, octave doubling, tension) and later stages see the
//! output of earlier ones.

use crate::chords::ChordQuality;

/// One of the four performance faders
///
/// Variant order matches the controller's CC order (complexity, spread,
/// octave, tension).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fader {
    Complexity,
    Spread,
    Octave,
    Tension,
}

impl Fader {
    pub const ALL: [Fader; 4] = [
        Fader::Complexity,
        Fader::Spread,
        Fader::Octave,
        Fader::Tension,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Fader::Complexity => "complexity",
            Fader::Spread => "spread",
            Fader::Octave => "octave",
            Fader::Tension => "tension",
        }
    }
}

/// Current values of the four faders, each 0-127
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaderBank {
    values: [u8; 4],
}

impl FaderBank {
    pub fn new() -> Self {
        FaderBank { values: [0; 4] }
    }

    /// Store a fader value, clamped to the 7-bit MIDI range
    pub fn set(&mut self, fader: Fader, value: u8) {
        self.values[fader as usize] = value.min(127);
    }

    pub fn get(&self, fader: Fader) -> u8 {
        self.values[fader as usize]
    }
}

impl Default for FaderBank {
    fn default() -> Self {
        FaderBank::new()
    }
}

/// Build the voiced note set for a root, quality and fader state.
///
/// Intervals flow through spread, complexity, octave doubling and tension in
/// that order, then land on the root. Out-of-range notes are clamped to
/// 0-127 (never octave-wrapped) and the result is deduplicated and sorted
/// ascending.
pub fn voice(root: u8, quality: ChordQuality, faders: &FaderBank) -> Vec<u8> {
    let mut intervals: Vec<i32> = quality.intervals().iter().map(|&i| i as i32).collect();

    apply_spread(&mut intervals, faders.get(Fader::Spread));
    apply_complexity(&mut intervals, quality, faders.get(Fader::Complexity));
    apply_octaves(&mut intervals, faders.get(Fader::Octave));
    apply_tension(&mut intervals, quality, faders.get(Fader::Tension));

    let mut notes: Vec<u8> = intervals
        .iter()
        .map(|&interval| (root as i32 + interval).clamp(0, 127) as u8)
        .collect();
    notes.sort_unstable();
    notes.dedup();
    notes
}

/// Widen the voicing: interval at position i gains i * spread_semitones,
/// up to 24 semitones per step at full spread.
fn apply_spread(intervals: &mut [i32], spread: u8) {
    if intervals.len() < 2 || spread == 0 {
        return;
    }
    let semis = ((spread as f64 / 127.0) * 24.0).round() as i32;
    for (i, interval) in intervals.iter_mut().enumerate() {
        *interval += i as i32 * semis;
    }
}

/// Stack extensions in cumulative tiers: seventh at 32, ninth at 64,
/// eleventh-ish color tone at 96.
fn apply_complexity(intervals: &mut Vec<i32>, quality: ChordQuality, complexity: u8) {
    if complexity >= 32 {
        intervals.push(quality.seventh_extension());
    }
    if complexity >= 64 {
        intervals.push(14);
    }
    if complexity >= 96 {
        intervals.push(17);
    }
}

/// Double the voicing into neighboring octaves. Each activated tier appends
/// a copy of the set as it entered this stage, so tiers never compound.
fn apply_octaves(intervals: &mut Vec<i32>, octave: u8) {
    if octave <= 16 {
        return;
    }
    let base = intervals.clone();
    intervals.extend(base.iter().map(|interval| interval - 24));
    if octave > 32 {
        intervals.extend(base.iter().map(|interval| interval - 12));
    }
    if octave > 64 {
        intervals.extend(base.iter().map(|interval| interval + 12));
    }
    if octave > 96 {
        intervals.extend(base.iter().map(|interval| interval + 24));
    }
}

/// Add the quality's alterations: the family-specific one at 32, the shared
/// upper color tone at 96.
fn apply_tension(intervals: &mut Vec<i32>, quality: ChordQuality, tension: u8) {
    if tension < 32 {
        return;
    }
    let [first, second] = quality.tension_alterations();
    intervals.push(first);
    if tension >= 96 {
        intervals.push(second);
    }
}
