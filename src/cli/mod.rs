//! CLI Module
//!
//! Command-line surface over the recorder and playback transformer.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::dsp::Transform;

/// Revoice - record a voice clip and play it back transformed
#[derive(Parser, Debug)]
#[command(name = "revoice")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record a voice clip from the default microphone
    Record {
        /// Output WAV path
        output: PathBuf,

        /// Stop automatically after this many seconds (otherwise press Enter)
        #[arg(short, long)]
        duration: Option<f64>,
    },

    /// Play a recording through one of the fixed transforms
    Play {
        /// Recording to play
        file: PathBuf,

        /// Transform to apply
        #[arg(short, long, value_enum)]
        transform: Transform,
    },

    /// Print format metadata for a recording
    Info {
        /// Recording to inspect
        file: PathBuf,
    },
}
