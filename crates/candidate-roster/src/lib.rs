//! `candidate-roster` - Record and review interview candidates
//!
//! Candidate submissions are checked by a [`Validator`], stored in a
//! [`DocumentStore`], and mirrored locally by a [`Roster`] that keeps its
//! list in step with every store call it makes.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod prompt;
pub mod record;
pub mod roster;
pub mod store;
pub mod validate;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use record::{CandidateFields, CandidateRecord, DocumentId, Field};
pub use roster::{DeleteOutcome, Roster, SubmitOutcome};
pub use store::{DocumentStore, SqliteStore, StoreError};
pub use validate::{FieldErrors, RawCandidate, Validator};
