//! Operator-facing seams: confirmation prompts and notifications.
//!
//! The roster never talks to a terminal directly. It asks a [`Confirmer`]
//! before destructive actions and reports outcomes through a [`Notifier`],
//! so the same lifecycle logic drives the CLI and the tests.

use std::io::{self, BufRead, Write};

use tracing::warn;

/// Text shown before a record is deleted.
pub const DELETE_PROMPT: &str = "Are you sure you want to delete this record?";

/// Asks the operator to approve a destructive action.
pub trait Confirmer: Send + Sync {
    /// Return `true` if the operator approved the action.
    fn confirm(&self, prompt: &str) -> bool;
}

/// Approves every prompt. Backs the CLI's `--yes` flag.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConfirm;

impl Confirmer for AutoConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Asks on the terminal and reads a `y`/`n` answer from stdin.
///
/// Anything other than `y` or `yes` (including end of input) declines.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalConfirmer;

impl Confirmer for TerminalConfirmer {
    fn confirm(&self, prompt: &str) -> bool {
        let mut stderr = io::stderr().lock();
        if write!(stderr, "{prompt} [y/N] ").and_then(|()| stderr.flush()).is_err() {
            return false;
        }

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_affirmative(&answer),
            Err(err) => {
                warn!("Failed to read confirmation: {}", err);
                false
            }
        }
    }
}

/// Check whether a typed answer approves the prompt.
#[must_use]
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// An outcome worth telling the operator about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// An operation completed.
    Success(String),
    /// An operation failed.
    Failure(String),
}

impl Notice {
    /// The notice text.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Success(message) | Self::Failure(message) => message,
        }
    }

    /// Check whether this notice reports a failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }
}

/// Delivers notices to the operator.
pub trait Notifier: Send + Sync {
    /// Show a notice.
    fn notify(&self, notice: &Notice);
}

/// Prints successes to stdout and failures to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalNotifier {
    /// Suppress success notices.
    pub quiet: bool,
}

impl TerminalNotifier {
    /// Create a terminal notifier.
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    /// Write a notice to `out` (successes) or `err` (failures).
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_notice(
        &self,
        notice: &Notice,
        out: &mut impl Write,
        err: &mut impl Write,
    ) -> io::Result<()> {
        match notice {
            Notice::Success(message) if !self.quiet => writeln!(out, "{message}"),
            Notice::Success(_) => Ok(()),
            Notice::Failure(message) => writeln!(err, "error: {message}"),
        }
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&self, notice: &Notice) {
        let (mut out, mut err_out) = (io::stdout().lock(), io::stderr().lock());
        if let Err(err) = self.write_notice(notice, &mut out, &mut err_out) {
            warn!("Failed to show notice: {}", err);
        }
    }
}
