//! `roster` - CLI for candidate-roster
//!
//! Lists, adds and deletes interview candidate records.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use candidate_roster::cli::render::{render_added, render_field_errors, render_records};
use candidate_roster::cli::{AddCommand, Cli, Command, ConfigCommand, DeleteCommand, ListCommand};
use candidate_roster::prompt::{AutoConfirm, TerminalConfirmer, TerminalNotifier};
use candidate_roster::{
    init_logging, Config, DeleteOutcome, DocumentId, Roster, SqliteStore, SubmitOutcome,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone()).context("could not load configuration")?;

    match cli.command {
        Command::List(cmd) => handle_list(&config, cli.quiet, &cmd).await,
        Command::Add(cmd) => handle_add(&config, cli.quiet, cmd).await,
        Command::Delete(cmd) => handle_delete(&config, cli.quiet, &cmd).await,
        Command::Roles => {
            handle_roles(&config);
            Ok(ExitCode::SUCCESS)
        }
        Command::Status(cmd) => handle_status(&config, cmd.json),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn open_store(config: &Config) -> anyhow::Result<SqliteStore> {
    let path = config.database_path();
    SqliteStore::open(&path).with_context(|| format!("could not open store at {}", path.display()))
}

/// Open the store and build a roster over the configured collection.
fn open_roster(config: &Config, notifier: TerminalNotifier) -> anyhow::Result<Roster> {
    let store = open_store(config)?;
    Ok(Roster::new(Arc::new(store), config.validator())
        .with_collection(config.store.collection.clone())
        .with_notifier(notifier))
}

async fn handle_list(config: &Config, quiet: bool, cmd: &ListCommand) -> anyhow::Result<ExitCode> {
    let mut roster = open_roster(config, TerminalNotifier::new(quiet))?;
    if roster.initialize().await.is_err() {
        return Ok(ExitCode::FAILURE);
    }

    print!("{}", ensure_newline(render_records(roster.records(), cmd.format)?));
    Ok(ExitCode::SUCCESS)
}

async fn handle_add(config: &Config, quiet: bool, cmd: AddCommand) -> anyhow::Result<ExitCode> {
    let json = cmd.json;
    let mut draft = cmd.into_raw();
    // Success is reported by the summary below; failures still reach stderr.
    let mut roster = open_roster(config, TerminalNotifier::new(true))?;

    // A failed load is already reported; the submission can still go through.
    let _ = roster.initialize().await;

    match roster.submit(&mut draft).await {
        SubmitOutcome::Created(id) => {
            if let Some(record) = roster.find(&id) {
                if json || !quiet {
                    println!("{}", render_added(record, json)?);
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        SubmitOutcome::Invalid(errors) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&errors)?);
            } else {
                eprintln!("Candidate was not added:");
                eprint!("{}", render_field_errors(&errors));
            }
            Ok(ExitCode::FAILURE)
        }
        SubmitOutcome::Failed(_) => Ok(ExitCode::FAILURE),
    }
}

async fn handle_delete(
    config: &Config,
    quiet: bool,
    cmd: &DeleteCommand,
) -> anyhow::Result<ExitCode> {
    let roster = open_roster(config, TerminalNotifier::new(quiet))?;
    let mut roster = if cmd.yes {
        roster.with_confirmer(AutoConfirm)
    } else {
        roster.with_confirmer(TerminalConfirmer)
    };

    let _ = roster.initialize().await;

    let id = DocumentId::new(cmd.id.clone());
    if let Some(record) = roster.find(&id) {
        if !cmd.yes && !quiet {
            println!(
                "{} <{}> - {}",
                record.fields.full_name, record.fields.email, record.fields.job_role
            );
        }
    }

    match roster.delete(&id).await {
        DeleteOutcome::Deleted | DeleteOutcome::Declined => Ok(ExitCode::SUCCESS),
        DeleteOutcome::Failed(_) => Ok(ExitCode::FAILURE),
    }
}

fn handle_roles(config: &Config) {
    if config.form.job_roles.is_empty() {
        println!("Any job role is accepted.");
        return;
    }
    for role in &config.form.job_roles {
        println!("{role}");
    }
}

fn handle_status(config: &Config, json: bool) -> anyhow::Result<ExitCode> {
    let store = open_store(config)?;
    let stats = store.stats(&config.store.collection)?;

    if json {
        let status = serde_json::json!({
            "database_path": store.path(),
            "collection": stats.collection,
            "records": stats.documents,
            "db_size_bytes": stats.db_size_bytes,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("roster status");
        println!("-------------");
        println!("Database:      {}", store.path().display());
        println!("Collection:    {}", stats.collection);
        println!("Records:       {}", stats.documents);
        println!("Size (bytes):  {}", stats.db_size_bytes);
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<ExitCode> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Store]");
                println!("  Database path:  {}", config.database_path().display());
                println!("  Collection:     {}", config.store.collection);
                println!();
                println!("[Form]");
                println!("  Job roles:      {}", config.form.job_roles.len());
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => {
                    println!("Configuration error: {e}");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn ensure_newline(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}
