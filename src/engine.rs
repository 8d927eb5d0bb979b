//! Chord engine state machine
//!
//! Consumes classified controller events, owns the live `ControllerState`,
//! and returns ordered command lists for the caller to apply. The command
//! order matters: on a re-voice, every note-off precedes every note-on so
//! that stable notes are never doubled or retriggered.

use crate::chords::ChordQuality;
use crate::display::Rgb;
use crate::events::ControlEvent;
use crate::midi::{note_name, MidiMessage};
use crate::modes::{rotate_submode, PerformanceMode, SelectFocus};
use crate::voicing::{voice, FaderBank};
use std::collections::BTreeMap;

const OLED_LINE_LEN: usize = 16;

/// Engine construction parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Velocity for re-voiced note-ons (key presses use their own)
    pub velocity: u8,
    /// Output channel for every emitted note command
    pub channel: u8,
    /// When set, key releases are ignored and chords ring on
    pub latch: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            velocity: 96,
            channel: 0,
            latch: false,
        }
    }
}

/// The live controller aggregate. Mutated only by `ChordEngine::process`.
#[derive(Debug, Clone)]
pub struct ControllerState {
    pub current_chord: ChordQuality,
    pub mode: PerformanceMode,
    pub submode_index: usize,
    pub focus: SelectFocus,
    pub faders: FaderBank,
    /// Root note → notes currently sounding for that root. The single
    /// source of truth for what must be silenced.
    pub held_notes: BTreeMap<u8, Vec<u8>>,
    pub last_root: Option<u8>,
}

impl ControllerState {
    pub fn new() -> Self {
        ControllerState {
            current_chord: ChordQuality::Major,
            mode: PerformanceMode::Chord,
            submode_index: 0,
            focus: SelectFocus::ModeSelect,
            faders: FaderBank::new(),
            held_notes: BTreeMap::new(),
            last_root: None,
        }
    }
}

impl Default for ControllerState {
    fn default() -> Self {
        ControllerState::new()
    }
}

/// One output command. Consumers must apply these strictly in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    NoteOn { note: u8, velocity: u8, channel: u8 },
    NoteOff { note: u8, channel: u8 },
    Display { line1: String, line2: String },
    PadColor { pad: u8, color: Rgb },
    Passthrough(MidiMessage),
}

/// The chord engine: classified events in, ordered commands out
pub struct ChordEngine {
    config: EngineConfig,
    state: ControllerState,
}

impl ChordEngine {
    pub fn new(config: EngineConfig) -> Self {
        ChordEngine {
            config,
            state: ControllerState::new(),
        }
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Commands to bring the hardware in line with a fresh engine:
    /// pad colors for the default quality and the initial display.
    pub fn startup_commands(&self) -> Vec<EngineCommand> {
        let mut commands = Vec::new();
        self.push_pad_colors(&mut commands);
        commands.push(self.chord_display());
        commands
    }

    /// Advance the state machine by one event
    pub fn process(&mut self, event: ControlEvent) -> Vec<EngineCommand> {
        let mut commands = Vec::new();
        match event {
            ControlEvent::PadPress(quality) => {
                self.state.current_chord = quality;
                if let Some(root) = self.state.last_root {
                    if self.state.held_notes.contains_key(&root) {
                        self.revoice(root, &mut commands);
                    }
                }
                self.push_pad_colors(&mut commands);
                commands.push(self.chord_display());
            }
            ControlEvent::KeyOn { root, velocity } => {
                // Re-trigger: silence the old voicing for this root first
                if let Some(previous) = self.state.held_notes.remove(&root) {
                    for note in previous {
                        commands.push(self.note_off(note));
                    }
                }
                self.state.last_root = Some(root);
                let notes = voice(root, self.state.current_chord, &self.state.faders);
                for &note in &notes {
                    commands.push(self.note_on(note, velocity));
                }
                self.state.held_notes.insert(root, notes);
                commands.push(self.chord_display());
            }
            ControlEvent::KeyOff { root } => {
                if self.config.latch {
                    return commands;
                }
                if let Some(previous) = self.state.held_notes.remove(&root) {
                    for note in previous {
                        commands.push(self.note_off(note));
                    }
                    if self.state.last_root == Some(root) {
                        self.state.last_root = None;
                        commands.push(self.mode_display());
                    }
                }
            }
            ControlEvent::Fader { fader, value } => {
                self.state.faders.set(fader, value);
                if let Some(root) = self.state.last_root {
                    if self.state.held_notes.contains_key(&root) {
                        self.revoice(root, &mut commands);
                        commands.push(self.chord_display());
                    }
                }
            }
            ControlEvent::ModeRotate { delta } => {
                match self.state.focus {
                    SelectFocus::SubmodeSelect => {
                        self.state.submode_index =
                            rotate_submode(self.state.mode, self.state.submode_index, delta);
                    }
                    SelectFocus::ModeSelect => {
                        self.state.mode = self.state.mode.rotated(delta);
                        self.state.submode_index = 0;
                    }
                }
                commands.push(self.mode_display());
            }
            ControlEvent::ModePress => {
                self.state.focus = self.state.focus.toggled();
                commands.push(self.mode_display());
            }
            ControlEvent::Passthrough(msg) => {
                commands.push(EngineCommand::Passthrough(msg));
            }
        }
        commands
    }

    /// Recompute the voicing for a held root and patch the difference:
    /// note-off for removed notes, then note-on for added ones. Notes
    /// present in both sets are left sounding.
    fn revoice(&mut self, root: u8, commands: &mut Vec<EngineCommand>) {
        let previous = self.state.held_notes.get(&root).cloned().unwrap_or_default();
        let updated = voice(root, self.state.current_chord, &self.state.faders);
        for &note in previous.iter().filter(|n| !updated.contains(n)) {
            commands.push(self.note_off(note));
        }
        for &note in updated.iter().filter(|n| !previous.contains(n)) {
            commands.push(self.note_on(note, self.config.velocity));
        }
        self.state.held_notes.insert(root, updated);
    }

    fn note_on(&self, note: u8, velocity: u8) -> EngineCommand {
        EngineCommand::NoteOn {
            note,
            velocity,
            channel: self.config.channel,
        }
    }

    fn note_off(&self, note: u8) -> EngineCommand {
        EngineCommand::NoteOff {
            note,
            channel: self.config.channel,
        }
    }

    fn push_pad_colors(&self, commands: &mut Vec<EngineCommand>) {
        for (pad, quality) in ChordQuality::ALL.iter().enumerate() {
            let color = if *quality == self.state.current_chord {
                quality.color()
            } else {
                quality.dim_color()
            };
            commands.push(EngineCommand::PadColor {
                pad: pad as u8,
                color,
            });
        }
    }

    fn chord_display(&self) -> EngineCommand {
        let quality = self.state.current_chord;
        let held = self
            .state
            .last_root
            .and_then(|root| self.state.held_notes.get(&root).map(|notes| (root, notes)));
        let line1 = match held {
            Some((root, _)) => format!("{} {}", note_name(root), quality.label()),
            None => quality.label().to_string(),
        };
        let line2 = match held {
            Some((_, notes)) if !notes.is_empty() => format!("{} notes", notes.len()),
            _ => format!(
                "{}/{}",
                self.state.mode.label(),
                self.state.mode.submodes()[self.state.submode_index]
            ),
        };
        display(line1, line2)
    }

    fn mode_display(&self) -> EngineCommand {
        let (mode_marker, sub_marker) = match self.state.focus {
            SelectFocus::ModeSelect => ('>', ' '),
            SelectFocus::SubmodeSelect => (' ', '>'),
        };
        let line1 = format!("{}{}", mode_marker, self.state.mode.label());
        let line2 = format!(
            "{}{}",
            sub_marker,
            self.state.mode.submodes()[self.state.submode_index]
        );
        display(line1, line2)
    }
}

fn display(line1: String, line2: String) -> EngineCommand {
    EngineCommand::Display {
        line1: truncate(line1),
        line2: truncate(line2),
    }
}

fn truncate(mut line: String) -> String {
    line.truncate(OLED_LINE_LEN);
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voicing::Fader;

    fn engine() -> ChordEngine {
        ChordEngine::new(EngineConfig::default())
    }

    fn note_ons(commands: &[EngineCommand]) -> Vec<u8> {
        commands
            .iter()
            .filter_map(|c| match c {
                EngineCommand::NoteOn { note, .. } => Some(*note),
                _ => None,
            })
            .collect()
    }

    fn note_offs(commands: &[EngineCommand]) -> Vec<u8> {
        commands
            .iter()
            .filter_map(|c| match c {
                EngineCommand::NoteOff { note, .. } => Some(*note),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_key_on_emits_voicing() {
        let mut engine = engine();
        let commands = engine.process(ControlEvent::KeyOn {
            root: 60,
            velocity: 100,
        });
        assert_eq!(note_ons(&commands), vec![60, 64, 67]);
        assert_eq!(engine.state().held_notes[&60], vec![60, 64, 67]);
        assert_eq!(engine.state().last_root, Some(60));
    }

    #[test]
    fn test_key_on_uses_event_velocity() {
        let mut engine = engine();
        let commands = engine.process(ControlEvent::KeyOn {
            root: 60,
            velocity: 33,
        });
        for command in &commands {
            if let EngineCommand::NoteOn { velocity, .. } = command {
                assert_eq!(*velocity, 33);
            }
        }
    }

    #[test]
    fn test_retrigger_releases_old_voicing_first() {
        let mut engine = engine();
        engine.process(ControlEvent::KeyOn {
            root: 60,
            velocity: 100,
        });
        engine.process(ControlEvent::PadPress(ChordQuality::Minor));
        // Pressing the same key again: the minor voicing replaces whatever
        // is stored, offs before ons
        let commands = engine.process(ControlEvent::KeyOn {
            root: 60,
            velocity: 100,
        });
        let first_on = commands
            .iter()
            .position(|c| matches!(c, EngineCommand::NoteOn { .. }))
            .unwrap();
        let last_off = commands
            .iter()
            .rposition(|c| matches!(c, EngineCommand::NoteOff { .. }));
        if let Some(last_off) = last_off {
            assert!(last_off < first_on);
        }
        assert_eq!(engine.state().held_notes[&60], vec![60, 63, 67]);
    }

    #[test]
    fn test_pad_press_revoices_held_root() {
        let mut engine = engine();
        engine.process(ControlEvent::KeyOn {
            root: 60,
            velocity: 100,
        });
        let commands = engine.process(ControlEvent::PadPress(ChordQuality::Minor));
        // Major -> minor over a held C: only the third moves
        assert_eq!(note_offs(&commands), vec![64]);
        assert_eq!(note_ons(&commands), vec![63]);
        assert_eq!(engine.state().held_notes[&60], vec![60, 63, 67]);
    }

    #[test]
    fn test_pad_press_emits_pad_colors() {
        let mut engine = engine();
        let commands = engine.process(ControlEvent::PadPress(ChordQuality::Sus4));
        let pads: Vec<(u8, Rgb)> = commands
            .iter()
            .filter_map(|c| match c {
                EngineCommand::PadColor { pad, color } => Some((*pad, *color)),
                _ => None,
            })
            .collect();
        assert_eq!(pads.len(), 8);
        // Sus4 is pad 5; it alone gets the bright color
        for (pad, color) in pads {
            let quality = ChordQuality::ALL[pad as usize];
            if pad == 5 {
                assert_eq!(color, quality.color());
            } else {
                assert_eq!(color, quality.dim_color());
            }
        }
    }

    #[test]
    fn test_fader_change_diffs_not_resends() {
        let mut engine = engine();
        engine.process(ControlEvent::KeyOn {
            root: 60,
            velocity: 100,
        });
        let commands = engine.process(ControlEvent::Fader {
            fader: Fader::Complexity,
            value: 127,
        });
        // Complexity only adds, so nothing is released and the base triad
        // is not retriggered
        assert!(note_offs(&commands).is_empty());
        assert_eq!(note_ons(&commands), vec![71, 74, 77]);
        assert_eq!(
            engine.state().held_notes[&60],
            vec![60, 64, 67, 71, 74, 77]
        );
    }

    #[test]
    fn test_fader_change_without_held_root_is_silent() {
        let mut engine = engine();
        let commands = engine.process(ControlEvent::Fader {
            fader: Fader::Spread,
            value: 100,
        });
        assert!(commands.is_empty());
        assert_eq!(engine.state().faders.get(Fader::Spread), 100);
    }

    #[test]
    fn test_revoice_uses_config_velocity() {
        let mut engine = ChordEngine::new(EngineConfig {
            velocity: 77,
            ..EngineConfig::default()
        });
        engine.process(ControlEvent::KeyOn {
            root: 60,
            velocity: 100,
        });
        let commands = engine.process(ControlEvent::Fader {
            fader: Fader::Complexity,
            value: 40,
        });
        for command in &commands {
            if let EngineCommand::NoteOn { velocity, .. } = command {
                assert_eq!(*velocity, 77);
            }
        }
    }

    #[test]
    fn test_key_off_releases_everything() {
        let mut engine = engine();
        engine.process(ControlEvent::KeyOn {
            root: 60,
            velocity: 100,
        });
        let commands = engine.process(ControlEvent::KeyOff { root: 60 });
        assert_eq!(note_offs(&commands), vec![60, 64, 67]);
        assert!(!engine.state().held_notes.contains_key(&60));
        assert_eq!(engine.state().last_root, None);
    }

    #[test]
    fn test_key_off_unknown_root_is_silent() {
        let mut engine = engine();
        let commands = engine.process(ControlEvent::KeyOff { root: 61 });
        assert!(commands.is_empty());
    }

    #[test]
    fn test_latch_ignores_key_off() {
        let mut engine = ChordEngine::new(EngineConfig {
            latch: true,
            ..EngineConfig::default()
        });
        engine.process(ControlEvent::KeyOn {
            root: 60,
            velocity: 100,
        });
        let commands = engine.process(ControlEvent::KeyOff { root: 60 });
        assert!(commands.is_empty());
        assert_eq!(engine.state().held_notes[&60], vec![60, 64, 67]);
    }

    #[test]
    fn test_mode_rotation_resets_submode() {
        let mut engine = engine();
        // Focus the submode row and advance it
        engine.process(ControlEvent::ModePress);
        engine.process(ControlEvent::ModeRotate { delta: 1 });
        assert_eq!(engine.state().submode_index, 1);
        // Back to the mode row; rotating resets the submode index
        engine.process(ControlEvent::ModePress);
        engine.process(ControlEvent::ModeRotate { delta: 1 });
        assert_eq!(engine.state().mode, PerformanceMode::Strum);
        assert_eq!(engine.state().submode_index, 0);
    }

    #[test]
    fn test_mode_display_focus_markers() {
        let mut engine = engine();
        let commands = engine.process(ControlEvent::ModeRotate { delta: 1 });
        assert_eq!(
            commands,
            vec![EngineCommand::Display {
                line1: ">Strum".to_string(),
                line2: " Up".to_string(),
            }]
        );
        let commands = engine.process(ControlEvent::ModePress);
        assert_eq!(
            commands,
            vec![EngineCommand::Display {
                line1: " Strum".to_string(),
                line2: ">Up".to_string(),
            }]
        );
    }

    #[test]
    fn test_chord_display_lines() {
        let mut engine = engine();
        let commands = engine.process(ControlEvent::KeyOn {
            root: 60,
            velocity: 100,
        });
        assert!(commands.contains(&EngineCommand::Display {
            line1: "C4 Major".to_string(),
            line2: "3 notes".to_string(),
        }));
        // Releasing falls back to the mode display
        let commands = engine.process(ControlEvent::KeyOff { root: 60 });
        assert!(commands.contains(&EngineCommand::Display {
            line1: ">Chord".to_string(),
            line2: " Close".to_string(),
        }));
    }

    #[test]
    fn test_display_lines_fit_oled() {
        let mut engine = engine();
        engine.process(ControlEvent::ModeRotate { delta: -1 }); // Sampler
        let mut commands = engine.process(ControlEvent::ModeRotate { delta: -1 }); // Performance
        commands.extend(engine.process(ControlEvent::KeyOn {
            root: 60,
            velocity: 100,
        }));
        for command in commands {
            if let EngineCommand::Display { line1, line2 } = command {
                assert!(line1.len() <= 16);
                assert!(line2.len() <= 16);
            }
        }
    }

    #[test]
    fn test_passthrough_leaves_state_alone() {
        let mut engine = engine();
        let msg = MidiMessage::PitchBend {
            channel: 0,
            value: 100,
        };
        let commands = engine.process(ControlEvent::Passthrough(msg.clone()));
        assert_eq!(commands, vec![EngineCommand::Passthrough(msg)]);
        assert!(engine.state().held_notes.is_empty());
    }

    #[test]
    fn test_startup_commands() {
        let engine = engine();
        let commands = engine.startup_commands();
        let pads = commands
            .iter()
            .filter(|c| matches!(c, EngineCommand::PadColor { .. }))
            .count();
        assert_eq!(pads, 8);
        assert!(commands.contains(&EngineCommand::Display {
            line1: "Major".to_string(),
            line2: "Chord/Close".to_string(),
        }));
    }
}
