//! Chord quality definitions
//!
//! The eight chord qualities assignable to the controller pads, with their
//! base interval stacks and the per-quality data the voicing pipeline needs.

use crate::display::Rgb;
use lazy_static::lazy_static;
use std::collections::HashMap;

/// Chord quality - interval recipe from a root note
///
/// Variant order matches the pad layout: pad 0 selects Major, pad 7 Augmented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChordQuality {
    Major,
    Minor,
    Major7,
    Minor7,
    Sus2,
    Sus4,
    Diminished,
    Augmented,
}

impl ChordQuality {
    /// All qualities in pad order
    pub const ALL: [ChordQuality; 8] = [
        ChordQuality::Major,
        ChordQuality::Minor,
        ChordQuality::Major7,
        ChordQuality::Minor7,
        ChordQuality::Sus2,
        ChordQuality::Sus4,
        ChordQuality::Diminished,
        ChordQuality::Augmented,
    ];

    /// Get the base intervals (semitones from root) for this quality
    pub fn intervals(&self) -> &'static [i8] {
        match self {
            ChordQuality::Major => &[0, 4, 7],
            ChordQuality::Minor => &[0, 3, 7],
            ChordQuality::Major7 => &[0, 4, 7, 11],
            ChordQuality::Minor7 => &[0, 3, 7, 10],
            ChordQuality::Sus2 => &[0, 2, 7],
            ChordQuality::Sus4 => &[0, 5, 7],
            ChordQuality::Diminished => &[0, 3, 6],
            ChordQuality::Augmented => &[0, 4, 8],
        }
    }

    /// Short name used in config files and on the command line
    pub fn short_name(&self) -> &'static str {
        match self {
            ChordQuality::Major => "maj",
            ChordQuality::Minor => "min",
            ChordQuality::Major7 => "maj7",
            ChordQuality::Minor7 => "min7",
            ChordQuality::Sus2 => "sus2",
            ChordQuality::Sus4 => "sus4",
            ChordQuality::Diminished => "dim",
            ChordQuality::Augmented => "aug",
        }
    }

    /// Display label for the OLED
    pub fn label(&self) -> &'static str {
        match self {
            ChordQuality::Major => "Major",
            ChordQuality::Minor => "Minor",
            ChordQuality::Major7 => "Major 7",
            ChordQuality::Minor7 => "Minor 7",
            ChordQuality::Sus2 => "Sus 2",
            ChordQuality::Sus4 => "Sus 4",
            ChordQuality::Diminished => "Dim",
            ChordQuality::Augmented => "Aug",
        }
    }

    /// Seventh added by the first complexity tier.
    ///
    /// Qualities with a minor third take the flat seventh (10), the rest the
    /// major seventh (11).
    pub fn seventh_extension(&self) -> i32 {
        match self {
            ChordQuality::Minor | ChordQuality::Minor7 | ChordQuality::Diminished => 10,
            _ => 11,
        }
    }

    /// Tension alterations `[first, second]` in semitones from root.
    ///
    /// The first is family-specific (#11 for the major family, b9 for the
    /// minor family, #5 otherwise); the second is the #9/13 color tone an
    /// octave up, shared by every family.
    pub fn tension_alterations(&self) -> [i32; 2] {
        match self {
            ChordQuality::Major | ChordQuality::Major7 | ChordQuality::Sus4 => [6, 20],
            ChordQuality::Minor | ChordQuality::Minor7 => [13, 20],
            ChordQuality::Sus2 | ChordQuality::Diminished | ChordQuality::Augmented => [8, 20],
        }
    }

    /// Pad LED color when this quality is selected
    pub fn color(&self) -> Rgb {
        match self {
            ChordQuality::Major => Rgb::new(0, 127, 0),
            ChordQuality::Minor => Rgb::new(0, 0, 127),
            ChordQuality::Major7 => Rgb::new(0, 96, 96),
            ChordQuality::Minor7 => Rgb::new(64, 0, 127),
            ChordQuality::Sus2 => Rgb::new(96, 96, 0),
            ChordQuality::Sus4 => Rgb::new(127, 64, 0),
            ChordQuality::Diminished => Rgb::new(127, 0, 0),
            ChordQuality::Augmented => Rgb::new(127, 0, 96),
        }
    }

    /// Pad LED color when another quality is selected
    pub fn dim_color(&self) -> Rgb {
        self.color().scaled(8)
    }

    /// Parse a quality name (short names plus common aliases)
    pub fn from_name(name: &str) -> Option<ChordQuality> {
        QUALITY_ALIASES
            .get(name)
            .or_else(|| QUALITY_ALIASES.get(name.to_lowercase().as_str()))
            .copied()
    }
}

lazy_static! {
    /// Quality name aliases. Exact-case entries first ("M" is major, "m" is
    /// minor); unknown input falls back to a lowercase lookup.
    static ref QUALITY_ALIASES: HashMap<&'static str, ChordQuality> = {
        let mut m = HashMap::new();
        m.insert("maj", ChordQuality::Major);
        m.insert("major", ChordQuality::Major);
        m.insert("M", ChordQuality::Major);
        m.insert("min", ChordQuality::Minor);
        m.insert("minor", ChordQuality::Minor);
        m.insert("m", ChordQuality::Minor);
        m.insert("maj7", ChordQuality::Major7);
        m.insert("major7", ChordQuality::Major7);
        m.insert("M7", ChordQuality::Major7);
        m.insert("min7", ChordQuality::Minor7);
        m.insert("minor7", ChordQuality::Minor7);
        m.insert("m7", ChordQuality::Minor7);
        m.insert("sus2", ChordQuality::Sus2);
        m.insert("sus4", ChordQuality::Sus4);
        m.insert("sus", ChordQuality::Sus4);
        m.insert("dim", ChordQuality::Diminished);
        m.insert("diminished", ChordQuality::Diminished);
        m.insert("o", ChordQuality::Diminished);
        m.insert("aug", ChordQuality::Augmented);
        m.insert("augmented", ChordQuality::Augmented);
        m.insert("+", ChordQuality::Augmented);
        m
    };
}
