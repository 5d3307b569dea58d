//! Command-line argument definitions.

use std::path::PathBuf;

use bplib::RecordKind;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bplib")]
#[command(about = "Blueprint pack loader and search", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the header of a blueprint pack
    Inspect {
        /// Pack file
        pack: PathBuf,

        /// Number of header entries to list
        #[arg(short, long, default_value = "10")]
        limit: usize,

        /// Decode each listed entry
        #[arg(short, long)]
        decode: bool,
    },

    /// Load a pack and run searches against it
    Search {
        /// Pack file
        pack: PathBuf,

        /// Pattern matched against internal and display names
        #[arg(long)]
        name: Option<String>,

        /// Pattern matched against the 32-digit identifier form
        #[arg(long)]
        id: Option<String>,

        /// Pattern matched against descriptions
        #[arg(long)]
        description: Option<String>,

        /// Restrict results to a kind (repeatable), e.g. `character-class`
        #[arg(short, long = "kind", value_name = "KIND")]
        kinds: Vec<RecordKind>,

        /// Maximum results printed per search
        #[arg(short, long, default_value = "50")]
        limit: usize,

        /// Print a JSON document instead of text
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        loader: LoaderArgs,
    },

    /// Build a pack from a JSON array of records
    Build {
        /// JSON input file
        input: PathBuf,

        /// Pack file to write
        output: PathBuf,
    },
}

/// Loader settings shared by commands that load a pack
#[derive(Debug, Default, clap::Args)]
pub struct LoaderArgs {
    /// TOML loader configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Worker thread count (overrides the config file)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Decode without pausing between records
    #[arg(long)]
    pub no_throttle: bool,

    /// Match patterns case-insensitively
    #[arg(short = 'i', long)]
    pub ignore_case: bool,
}
