//! CLI Module
//!
//! Command-line interface for inspecting and diffing audio graph snapshots.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Audiograph - typed audio graph snapshots for a runtime audio engine
#[derive(Parser, Debug)]
#[command(name = "audiograph")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the supported node types
    #[command(name = "types")]
    Types,

    /// Print the default node for a type
    #[command(name = "template")]
    Template {
        /// Node type name, e.g. "Oscillator"
        node_type: String,
    },

    /// Print an oscillator wired to the destination
    #[command(name = "demo")]
    Demo,

    /// Decode a graph file and summarize it
    #[command(name = "inspect")]
    Inspect {
        /// Path to the graph JSON
        path: PathBuf,
    },

    /// Print the backend calls that move one snapshot to another
    #[command(name = "diff")]
    Diff {
        /// Previously applied snapshot
        prev: PathBuf,

        /// Snapshot to apply
        next: PathBuf,
    },
}
