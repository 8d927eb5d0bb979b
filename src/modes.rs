//! Performance mode catalog
//!
//! The ten performance modes selectable with the main encoder, each with its
//! own named submodes. Rotation wraps in both directions.

/// Performance mode, in encoder rotation order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceMode {
    Chord,
    Strum,
    Arp,
    Scale,
    Voicing,
    Rhythm,
    Fx,
    Morph,
    Performance,
    Sampler,
}

impl PerformanceMode {
    pub const ALL: [PerformanceMode; 10] = [
        PerformanceMode::Chord,
        PerformanceMode::Strum,
        PerformanceMode::Arp,
        PerformanceMode::Scale,
        PerformanceMode::Voicing,
        PerformanceMode::Rhythm,
        PerformanceMode::Fx,
        PerformanceMode::Morph,
        PerformanceMode::Performance,
        PerformanceMode::Sampler,
    ];

    /// Display label for the OLED
    pub fn label(&self) -> &'static str {
        match self {
            PerformanceMode::Chord => "Chord",
            PerformanceMode::Strum => "Strum",
            PerformanceMode::Arp => "Arp",
            PerformanceMode::Scale => "Scale",
            PerformanceMode::Voicing => "Voicing",
            PerformanceMode::Rhythm => "Rhythm",
            PerformanceMode::Fx => "FX",
            PerformanceMode::Morph => "Morph",
            PerformanceMode::Performance => "Performance",
            PerformanceMode::Sampler => "Sampler",
        }
    }

    /// Submode names for this mode, in rotation order
    pub fn submodes(&self) -> &'static [&'static str] {
        match self {
            PerformanceMode::Chord => &["Close", "Open", "Drop 2", "Drop 3", "Wide", "Cluster"],
            PerformanceMode::Strum => &["Up", "Down", "Alternate", "Random"],
            PerformanceMode::Arp => &["Up", "Down", "UpDown", "Random", "Played", "Chord"],
            PerformanceMode::Scale => &[
                "Ionian",
                "Dorian",
                "Phrygian",
                "Lydian",
                "Mixolydian",
                "Aeolian",
                "Locrian",
                "Chromatic",
            ],
            PerformanceMode::Voicing => &["Root", "1st Inv", "2nd Inv", "3rd Inv", "Rootless"],
            PerformanceMode::Rhythm => &["Straight", "Swing", "Shuffle", "Triplet", "Dotted"],
            PerformanceMode::Fx => &["Off", "Echo", "Stutter", "Humanize"],
            PerformanceMode::Morph => &["Linear", "Ease In", "Ease Out", "S Curve"],
            PerformanceMode::Performance => &["Momentary", "Latch", "Toggle", "Sustain"],
            PerformanceMode::Sampler => &["One Shot", "Loop", "Gate", "Reverse"],
        }
    }

    /// Step to the next or previous mode, wrapping at both ends
    pub fn rotated(&self, delta: i8) -> PerformanceMode {
        let len = Self::ALL.len() as i32;
        let index = Self::ALL.iter().position(|m| m == self).unwrap_or(0) as i32;
        let next = (index + delta as i32).rem_euclid(len);
        Self::ALL[next as usize]
    }
}

/// Step a submode index within the given mode, wrapping at both ends
pub fn rotate_submode(mode: PerformanceMode, index: usize, delta: i8) -> usize {
    let len = mode.submodes().len() as i32;
    (index as i32 + delta as i32).rem_euclid(len) as usize
}

/// Which row the main encoder edits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectFocus {
    ModeSelect,
    SubmodeSelect,
}

impl SelectFocus {
    pub fn toggled(&self) -> SelectFocus {
        match self {
            SelectFocus::ModeSelect => SelectFocus::SubmodeSelect,
            SelectFocus::SubmodeSelect => SelectFocus::ModeSelect,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_forward() {
        assert_eq!(PerformanceMode::Chord.rotated(1), PerformanceMode::Strum);
        assert_eq!(PerformanceMode::Strum.rotated(1), PerformanceMode::Arp);
    }

    #[test]
    fn test_rotation_wraps() {
        assert_eq!(PerformanceMode::Sampler.rotated(1), PerformanceMode::Chord);
        assert_eq!(PerformanceMode::Chord.rotated(-1), PerformanceMode::Sampler);
    }

    #[test]
    fn test_full_cycle_returns_home() {
        let mut mode = PerformanceMode::Chord;
        for _ in 0..PerformanceMode::ALL.len() {
            mode = mode.rotated(1);
        }
        assert_eq!(mode, PerformanceMode::Chord);
    }

    #[test]
    fn test_submode_counts() {
        assert_eq!(PerformanceMode::Chord.submodes().len(), 6);
        assert_eq!(PerformanceMode::Strum.submodes().len(), 4);
        assert_eq!(PerformanceMode::Arp.submodes().len(), 6);
        assert_eq!(PerformanceMode::Scale.submodes().len(), 8);
        assert_eq!(PerformanceMode::Voicing.submodes().len(), 5);
        assert_eq!(PerformanceMode::Rhythm.submodes().len(), 5);
        assert_eq!(PerformanceMode::Fx.submodes().len(), 4);
        assert_eq!(PerformanceMode::Morph.submodes().len(), 4);
        assert_eq!(PerformanceMode::Performance.submodes().len(), 4);
        assert_eq!(PerformanceMode::Sampler.submodes().len(), 4);
    }

    #[test]
    fn test_rotate_submode_wraps() {
        // Strum has 4 submodes
        assert_eq!(rotate_submode(PerformanceMode::Strum, 0, 1), 1);
        assert_eq!(rotate_submode(PerformanceMode::Strum, 3, 1), 0);
        assert_eq!(rotate_submode(PerformanceMode::Strum, 0, -1), 3);
    }

    #[test]
    fn test_focus_toggle() {
        assert_eq!(
            SelectFocus::ModeSelect.toggled(),
            SelectFocus::SubmodeSelect
        );
        assert_eq!(
            SelectFocus::SubmodeSelect.toggled(),
            SelectFocus::ModeSelect
        );
    }
}
