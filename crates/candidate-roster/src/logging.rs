//! Logging setup for candidate-roster.
//!
//! The `roster` binary prints records and notices on stdout, so diagnostics
//! go to stderr through a `tracing` subscriber filtered by [`Verbosity`].

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// How chatty diagnostics should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Warnings and errors.
    #[default]
    Normal,
    /// Store activity (info) and above.
    Verbose,
    /// Everything down to debug.
    Debug,
    /// Everything.
    Trace,
}

impl Verbosity {
    /// Derive verbosity from `-q` and the number of `-v` flags.
    ///
    /// `-q` wins over any number of `-v`.
    #[must_use]
    pub fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            2 => Self::Debug,
            _ => Self::Trace,
        }
    }

    /// The most detailed level that is still emitted.
    #[must_use]
    pub fn level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::WARN,
            Self::Verbose => Level::INFO,
            Self::Debug => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// The `EnvFilter` directive used when `RUST_LOG` is unset.
    #[must_use]
    pub fn directive(self) -> String {
        format!("candidate_roster={}", self.level())
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides `verbosity` when set. Calling this more than once is
/// harmless; later calls keep the first subscriber.
///
/// ```no_run
/// use candidate_roster::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::from_flags(false, 1));
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.directive()));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .try_init();
}
