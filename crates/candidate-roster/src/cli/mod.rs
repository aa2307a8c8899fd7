//! Command-line interface for candidate-roster.
//!
//! This module provides the CLI structure for the `roster` binary and the
//! text rendering it prints.

mod commands;
pub mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddCommand, ConfigCommand, DeleteCommand, ListCommand, OutputFormat, StatusCommand,
};

use crate::logging::Verbosity;

/// roster - Record and review interview candidates
///
/// Candidates are validated before they are stored, listed in the order
/// they were added, and deleted only after confirmation.
#[derive(Debug, Parser)]
#[command(name = "roster")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for store activity, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress everything except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List recorded candidates
    List(ListCommand),

    /// Record a new candidate
    Add(AddCommand),

    /// Delete a candidate record
    Delete(DeleteCommand),

    /// Show the job roles a candidate may be recorded against
    Roles,

    /// Show store status
    Status(StatusCommand),

    /// View or check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}
