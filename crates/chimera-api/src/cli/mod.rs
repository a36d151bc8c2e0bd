//! CLI command definitions for the `chimera` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod skill;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Validate skill contracts and invoke skills.
#[derive(Parser)]
#[command(name = "chimera", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Data directory holding config.toml (default: ~/.chimera).
    #[arg(long, global = true, env = "CHIMERA_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Directory of `<skill_id>/contract.json` documents.
    #[arg(long, global = true, env = "CHIMERA_SKILLS_DIR")]
    pub skills_dir: Option<PathBuf>,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List loaded skill contracts.
    #[command(alias = "ls")]
    List,

    /// Show the full contract document of a skill.
    Show {
        /// Skill id, e.g. skill_write_post_v1.
        skill_id: String,
    },

    /// Validate every contract in the skills directory.
    Check,

    /// Invoke a skill and print its output or error contract.
    Invoke {
        /// Skill id to invoke.
        skill_id: String,

        /// Input object as inline JSON.
        #[arg(long, conflicts_with = "input_file")]
        input: Option<String>,

        /// Read the input object from a JSON file.
        #[arg(long)]
        input_file: Option<PathBuf>,
    },

    /// Start the REST API server.
    Serve {
        /// Port to listen on.
        #[arg(long, default_value_t = 8080)]
        port: u16,

        /// Address to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
