//! CLI command definitions.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::validate::RawCandidate;

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Add command arguments.
///
/// Every field is optional on the command line so that missing values are
/// reported together with the other validation errors.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Job role (see `roster roles`)
    #[arg(short = 'r', long)]
    pub job_role: Option<String>,

    /// Full name, 3 to 25 characters
    #[arg(short = 'n', long)]
    pub full_name: Option<String>,

    /// Email address
    #[arg(short, long)]
    pub email: Option<String>,

    /// Address, 10 to 120 characters
    #[arg(short, long)]
    pub address: Option<String>,

    /// Qualification, 2 to 120 characters
    #[arg(short = 'Q', long)]
    pub qualification: Option<String>,

    /// Interview comments, 15 to 2000 characters
    #[arg(short = 'm', long)]
    pub comments: Option<String>,

    /// Print the result as JSON
    #[arg(short, long)]
    pub json: bool,
}

impl AddCommand {
    /// Collect the given values into an unvalidated submission.
    #[must_use]
    pub fn into_raw(self) -> RawCandidate {
        RawCandidate {
            job_role: self.job_role.unwrap_or_default(),
            full_name: self.full_name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            address: self.address.unwrap_or_default(),
            qualification: self.qualification.unwrap_or_default(),
            comments: self.comments.unwrap_or_default(),
        }
    }
}

/// Delete command arguments.
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Id of the record to delete (shown by `roster list`)
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One record per line
    Plain,
    /// Aligned table
    #[default]
    Table,
    /// JSON array
    Json,
}
