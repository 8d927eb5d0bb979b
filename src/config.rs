//! File and environment configuration
//!
//! An optional TOML file sets engine defaults, port names and the
//! controller mapping; `CHORDLAB_*` environment variables override the file
//! and CLI flags override both. Everything has a built-in default, so a
//! bare `chordlab run --auto` works with no file at all.

use crate::engine::EngineConfig;
use crate::events::ControllerMap;
use serde::Deserialize;
use std::error::Error;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Default/re-voice note-on velocity
    pub velocity: u8,
    /// Output MIDI channel, 0-15
    pub channel: u8,
    /// Ignore key releases
    pub latch: bool,
    pub ports: PortsConfig,
    pub mapping: MappingConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct PortsConfig {
    pub input: Option<String>,
    pub output: Option<String>,
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MappingConfig {
    pub pad_channel: u8,
    pub pad_notes: Vec<u8>,
    pub fader_ccs: Vec<u8>,
    pub mode_cc: u8,
    pub mode_press_cc: u8,
    pub coerce_pad_notes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            velocity: 96,
            channel: 0,
            latch: false,
            ports: PortsConfig::default(),
            mapping: MappingConfig::default(),
        }
    }
}

impl Default for MappingConfig {
    fn default() -> Self {
        let map = ControllerMap::default();
        MappingConfig {
            pad_channel: map.pad_channel,
            pad_notes: map.pad_notes.to_vec(),
            fader_ccs: map.fader_ccs.to_vec(),
            mode_cc: map.mode_cc,
            mode_press_cc: map.mode_press_cc,
            coerce_pad_notes: map.coerce_pad_notes,
        }
    }
}

impl Config {
    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Config, Box<dyn Error>> {
        let text = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), Box<dyn Error>> {
        if self.mapping.pad_notes.len() != 8 {
            return Err(format!(
                "mapping.pad_notes must list exactly 8 notes, got {}",
                self.mapping.pad_notes.len()
            )
            .into());
        }
        if self.mapping.fader_ccs.len() != 4 {
            return Err(format!(
                "mapping.fader_ccs must list exactly 4 CCs, got {}",
                self.mapping.fader_ccs.len()
            )
            .into());
        }
        Ok(())
    }

    /// Apply `CHORDLAB_*` environment overrides.
    ///
    /// Port names replace the configured ones; a malformed
    /// `CHORDLAB_PAD_NOTES` is logged and ignored, keeping the configured
    /// pads.
    pub fn apply_env(&mut self) {
        if let Ok(name) = std::env::var("CHORDLAB_IN") {
            self.ports.input = Some(name);
        }
        if let Ok(name) = std::env::var("CHORDLAB_OUT") {
            self.ports.output = Some(name);
        }
        if let Ok(name) = std::env::var("CHORDLAB_FB") {
            self.ports.feedback = Some(name);
        }
        if let Ok(list) = std::env::var("CHORDLAB_PAD_NOTES") {
            match parse_pad_notes(&list) {
                Some(notes) => self.mapping.pad_notes = notes,
                None => warn!(
                    "Ignoring CHORDLAB_PAD_NOTES={:?}: expected 8 comma-separated notes",
                    list
                ),
            }
        }
    }

    /// Engine construction parameters, with velocity and channel clamped
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            velocity: self.velocity.min(127),
            channel: self.channel.min(15),
            latch: self.latch,
        }
    }

    /// The controller surface mapping. Lengths are checked at load time.
    pub fn controller_map(&self) -> ControllerMap {
        let mut pad_notes = [0u8; 8];
        pad_notes.copy_from_slice(&self.mapping.pad_notes);
        let mut fader_ccs = [0u8; 4];
        fader_ccs.copy_from_slice(&self.mapping.fader_ccs);
        ControllerMap {
            pad_channel: self.mapping.pad_channel,
            pad_notes,
            fader_ccs,
            mode_cc: self.mapping.mode_cc,
            mode_press_cc: self.mapping.mode_press_cc,
            coerce_pad_notes: self.mapping.coerce_pad_notes,
        }
    }
}

fn parse_pad_notes(list: &str) -> Option<Vec<u8>> {
    let notes: Vec<u8> = list
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| part.trim().parse().ok())
        .collect::<Option<Vec<u8>>>()?;
    if notes.len() == 8 {
        Some(notes)
    } else {
        None
    }
}
