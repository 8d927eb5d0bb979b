//! ChordLab CLI - run the chord engine against real MIDI ports

use chordlab::chords::ChordQuality;
use chordlab::config::Config;
use chordlab::display::{FeedbackSink, MiniLabDisplay, NullFeedback};
use chordlab::engine::{ChordEngine, EngineCommand};
use chordlab::events::classify;
use chordlab::midi::{note_name, MidiMessage};
use chordlab::ports;
use chordlab::voicing::{voice, Fader, FaderBank};
use clap::{Parser, Subcommand};
use midir::MidiOutputConnection;
use std::path::PathBuf;
use tracing::{info, warn};

const VIRTUAL_PORT_NAME: &str = "ChordLab Out";

#[derive(Parser)]
#[command(name = "chordlab")]
#[command(about = "MiniLab 3 chord performance engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the chord engine
    Run {
        /// MIDI input port name (the MiniLab 3 input)
        #[arg(long = "in")]
        in_port: Option<String>,

        /// Chord output port name (e.g. an IAC bus or loopMIDI port)
        #[arg(long = "out")]
        out_port: Option<String>,

        /// Feedback output for pad LEDs and the OLED (the MiniLab 3 output)
        #[arg(long = "fb")]
        fb_port: Option<String>,

        /// Auto-pick any port not given explicitly
        #[arg(long)]
        auto: bool,

        /// Note-on velocity for re-voiced chords (0-127)
        #[arg(long)]
        velocity: Option<u8>,

        /// MIDI channel for generated chords (0-15)
        #[arg(long)]
        channel: Option<u8>,

        /// Latch chords: ignore key releases
        #[arg(long)]
        latch: bool,

        /// TOML config file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List available MIDI inputs and outputs
    Ports,

    /// Print every message arriving on a MIDI input
    Monitor {
        /// Input port name; omit to list ports
        port: Option<String>,

        /// Print raw hex bytes instead of parsed messages
        #[arg(long)]
        raw: bool,
    },

    /// Compute a voicing offline, no MIDI required
    Preview {
        /// Root note (0-127)
        #[arg(long, default_value = "60")]
        root: u8,

        /// Chord quality (maj, min, maj7, min7, sus2, sus4, dim, aug)
        #[arg(long, default_value = "maj")]
        chord: String,

        /// Complexity fader (0-127)
        #[arg(long, default_value = "0")]
        complexity: u8,

        /// Spread fader (0-127)
        #[arg(long, default_value = "0")]
        spread: u8,

        /// Octave fader (0-127)
        #[arg(long, default_value = "0")]
        octave: u8,

        /// Tension fader (0-127)
        #[arg(long, default_value = "0")]
        tension: u8,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            in_port,
            out_port,
            fb_port,
            auto,
            velocity,
            channel,
            latch,
            config,
        } => run(
            in_port, out_port, fb_port, auto, velocity, channel, latch, config,
        ),
        Commands::Ports => {
            print_ports()?;
            Ok(())
        }
        Commands::Monitor { port, raw } => monitor(port, raw),
        Commands::Preview {
            root,
            chord,
            complexity,
            spread,
            octave,
            tension,
        } => preview(root, &chord, complexity, spread, octave, tension),
    }
}

#[allow(clippy::too_many_arguments)]
fn run(
    in_port: Option<String>,
    out_port: Option<String>,
    fb_port: Option<String>,
    auto: bool,
    velocity: Option<u8>,
    channel: Option<u8>,
    latch: bool,
    config_path: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match config_path {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };
    config.apply_env();

    // CLI flags take precedence over environment and file
    if let Some(v) = velocity {
        config.velocity = v;
    }
    if let Some(c) = channel {
        config.channel = c;
    }
    if latch {
        config.latch = true;
    }
    let mut in_name = in_port.or(config.ports.input.clone());
    let mut out_name = out_port.or(config.ports.output.clone());
    let mut fb_name = fb_port.or(config.ports.feedback.clone());

    if auto {
        let choice = ports::auto_pick(&ports::input_names()?, &ports::output_names()?);
        in_name = in_name.or(choice.input);
        out_name = out_name.or(choice.output);
        fb_name = fb_name.or(choice.feedback);
    }

    let in_name = match in_name {
        Some(name) => name,
        None => {
            print_ports()?;
            return Err("No MIDI input port. Pass --in or use --auto.".into());
        }
    };

    let mut output = match out_name {
        Some(name) => ports::open_output(&name)?,
        None if auto => ports::create_virtual_output(VIRTUAL_PORT_NAME)?,
        None => {
            print_ports()?;
            return Err("No MIDI output port. Pass --out or use --auto.".into());
        }
    };

    let mut feedback: Box<dyn FeedbackSink> = match fb_name {
        Some(name) => match ports::open_output(&name) {
            Ok(connection) => Box::new(MiniLabDisplay::new(connection)),
            Err(e) => {
                warn!(
                    "Failed to open feedback port '{}': {}. Running without feedback.",
                    name, e
                );
                Box::new(NullFeedback)
            }
        },
        None => {
            warn!("No MiniLab output found for LED/OLED feedback. Running without feedback.");
            Box::new(NullFeedback)
        }
    };

    let map = config.controller_map();
    let mut engine = ChordEngine::new(config.engine_config());
    let (_connection, receiver) = ports::open_input(&in_name)?;

    info!("Listening on '{}'. Ctrl+C to stop.", in_name);
    dispatch(
        engine.startup_commands(),
        &mut output,
        feedback.as_mut(),
    )?;

    // One event at a time until the input goes away
    while let Ok(msg) = receiver.recv() {
        if let Some(event) = classify(&msg, &map) {
            dispatch(engine.process(event), &mut output, feedback.as_mut())?;
        }
    }
    info!("Input stream ended.");
    Ok(())
}

/// Apply engine commands strictly in emission order: note and passthrough
/// traffic to the chord output, display traffic to the feedback sink.
/// An output transport error stops the session; feedback errors are
/// swallowed by the sink.
fn dispatch(
    commands: Vec<EngineCommand>,
    output: &mut MidiOutputConnection,
    feedback: &mut dyn FeedbackSink,
) -> Result<(), Box<dyn std::error::Error>> {
    for command in commands {
        match command {
            EngineCommand::NoteOn {
                note,
                velocity,
                channel,
            } => output.send(
                &MidiMessage::NoteOn {
                    channel,
                    note,
                    velocity,
                }
                .to_bytes(),
            )?,
            EngineCommand::NoteOff { note, channel } => output.send(
                &MidiMessage::NoteOff {
                    channel,
                    note,
                    velocity: 0,
                }
                .to_bytes(),
            )?,
            EngineCommand::Display { line1, line2 } => feedback.display(&line1, &line2),
            EngineCommand::PadColor { pad, color } => feedback.pad_color(pad, color),
            EngineCommand::Passthrough(msg) => output.send(&msg.to_bytes())?,
        }
    }
    Ok(())
}

fn print_ports() -> Result<(), Box<dyn std::error::Error>> {
    println!("Available MIDI inputs:");
    for name in ports::input_names()? {
        println!("  - {}", name);
    }
    println!("\nAvailable MIDI outputs:");
    for name in ports::output_names()? {
        println!("  - {}", name);
    }
    Ok(())
}

fn monitor(port: Option<String>, raw: bool) -> Result<(), Box<dyn std::error::Error>> {
    let name = match port {
        Some(name) => name,
        None => {
            print_ports()?;
            return Ok(());
        }
    };
    let _connection = ports::open_monitor(&name, raw)?;
    println!("Monitoring '{}'. Ctrl+C to stop.", name);
    loop {
        std::thread::sleep(std::time::Duration::from_secs(3600));
    }
}

fn preview(
    root: u8,
    chord: &str,
    complexity: u8,
    spread: u8,
    octave: u8,
    tension: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let quality = ChordQuality::from_name(chord).ok_or_else(|| {
        let names: Vec<&str> = ChordQuality::ALL.iter().map(|q| q.short_name()).collect();
        format!(
            "Unknown chord quality '{}'. Expected one of: {}",
            chord,
            names.join(", ")
        )
    })?;

    let mut faders = FaderBank::new();
    faders.set(Fader::Complexity, complexity);
    faders.set(Fader::Spread, spread);
    faders.set(Fader::Octave, octave);
    faders.set(Fader::Tension, tension);

    let root = root.min(127);
    let notes = voice(root, quality, &faders);
    println!("{} {} -> {} notes", note_name(root), quality.label(), notes.len());
    for note in notes {
        println!("  {:>3}  {}", note, note_name(note));
    }
    Ok(())
}
