//! # ChordLab - MiniLab 3 chord performance engine
//!
//! ChordLab turns an Arturia MiniLab 3 into a chord instrument: the eight
//! pads select a chord quality, keyboard notes play generated voicings of
//! that quality, the four faders reshape the voicing in real time
//! (complexity, spread, octave doubling, tension), and the main encoder
//! browses performance modes on the OLED.
//!
//! The crate splits into a pure core and a thin I/O shell. The core is
//! [`engine::ChordEngine`]: classified [`events::ControlEvent`]s go in,
//! ordered [`engine::EngineCommand`]s come out, and nothing in it touches a
//! port. The shell ([`ports`], [`display`], `main.rs`) moves bytes.
//!
//! ```rust
//! use chordlab::engine::{ChordEngine, EngineCommand, EngineConfig};
//! use chordlab::events::ControlEvent;
//!
//! let mut engine = ChordEngine::new(EngineConfig::default());
//! let commands = engine.process(ControlEvent::KeyOn { root: 60, velocity: 100 });
//! // A plain C major triad: note-ons for 60, 64, 67 plus a display update
//! assert!(commands.contains(&EngineCommand::NoteOn { note: 64, velocity: 100, channel: 0 }));
//! ```

pub mod chords;
pub mod config;
pub mod display;
pub mod engine;
pub mod events;
pub mod midi;
pub mod modes;
pub mod ports;
pub mod voicing;
