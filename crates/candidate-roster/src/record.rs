//! Core record types for candidate-roster.
//!
//! This module defines the data structures for a candidate's interview
//! information, both before persistence ([`CandidateFields`]) and after the
//! store has assigned an id ([`CandidateRecord`]).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier assigned by the document store at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Wrap a store-assigned identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A named field of a candidate submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    /// The role the candidate is interviewing for.
    JobRole,
    /// The candidate's full name.
    FullName,
    /// Contact email address.
    Email,
    /// Postal address.
    Address,
    /// Highest qualification.
    Qualification,
    /// Interviewer comments.
    Comments,
}

impl Field {
    /// Every field, in form order.
    pub const ALL: [Self; 6] = [
        Self::JobRole,
        Self::FullName,
        Self::Email,
        Self::Address,
        Self::Qualification,
        Self::Comments,
    ];

    /// The wire name of this field as it appears in stored documents.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::JobRole => "jobRole",
            Self::FullName => "fullName",
            Self::Email => "email",
            Self::Address => "address",
            Self::Qualification => "qualification",
            Self::Comments => "comments",
        }
    }

    /// Look up a field by its wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Validated candidate data, not yet persisted.
///
/// Only [`crate::validate::Validator`] constructs these from user input;
/// values read back from the store are trusted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateFields {
    /// The role the candidate is interviewing for.
    pub job_role: String,
    /// The candidate's full name.
    pub full_name: String,
    /// Contact email address.
    pub email: String,
    /// Postal address.
    pub address: String,
    /// Highest qualification.
    pub qualification: String,
    /// Interviewer comments.
    pub comments: String,
}

impl CandidateFields {
    /// Get the value of a single field.
    #[must_use]
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::JobRole => &self.job_role,
            Field::FullName => &self.full_name,
            Field::Email => &self.email,
            Field::Address => &self.address,
            Field::Qualification => &self.qualification,
            Field::Comments => &self.comments,
        }
    }
}

/// A persisted candidate record.
///
/// Always carries the id the store assigned to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    /// Store-assigned identifier.
    pub id: DocumentId,

    /// The candidate data.
    #[serde(flatten)]
    pub fields: CandidateFields,
}

impl CandidateRecord {
    /// Attach a store-assigned id to validated fields.
    #[must_use]
    pub fn new(id: DocumentId, fields: CandidateFields) -> Self {
        Self { id, fields }
    }
}
