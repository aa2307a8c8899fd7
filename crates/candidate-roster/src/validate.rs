//! Validation of raw candidate submissions.
//!
//! A [`RawCandidate`] is whatever the operator typed. [`Validator::validate`]
//! either turns it into [`CandidateFields`] or returns a [`FieldErrors`] map
//! holding one message for every field that failed. Each field is checked on
//! its own, so a bad email does not hide a short comment.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::record::{CandidateFields, Field};

/// Inclusive character-count bounds for a free-text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthBounds {
    /// Minimum number of characters.
    pub min: usize,
    /// Maximum number of characters.
    pub max: usize,
}

/// Bounds for `fullName`.
pub const FULL_NAME_BOUNDS: LengthBounds = LengthBounds { min: 3, max: 25 };
/// Bounds for `address`.
pub const ADDRESS_BOUNDS: LengthBounds = LengthBounds { min: 10, max: 120 };
/// Bounds for `qualification`.
pub const QUALIFICATION_BOUNDS: LengthBounds = LengthBounds { min: 2, max: 120 };
/// Bounds for `comments`.
pub const COMMENTS_BOUNDS: LengthBounds = LengthBounds { min: 15, max: 2000 };

const REQUIRED_MESSAGE: &str = "Required";
const INVALID_EMAIL_MESSAGE: &str = "Invalid email";

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Address syntax only; deliverability is not checked. The local part
        // has no leading, trailing or doubled dot and may not end in `'`.
        let local = r"(?:[A-Za-z0-9_'+\-]+\.)*[A-Za-z0-9_'+\-]*[A-Za-z0-9_+\-]";
        let domain = r"(?:[A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}";
        Regex::new(&format!("^{local}@{domain}$"))
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Unvalidated form input, one string per field.
///
/// Missing fields deserialize as empty strings so that they fail validation
/// the same way an untouched form input would.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawCandidate {
    /// Selected job role.
    pub job_role: String,
    /// Full name as typed.
    pub full_name: String,
    /// Email as typed.
    pub email: String,
    /// Address as typed.
    pub address: String,
    /// Qualification as typed.
    pub qualification: String,
    /// Comments as typed.
    pub comments: String,
}

impl RawCandidate {
    /// Get the raw value of a field.
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

    /// Set the raw value of a field.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::JobRole => &mut self.job_role,
            Field::FullName => &mut self.full_name,
            Field::Email => &mut self.email,
            Field::Address => &mut self.address,
            Field::Qualification => &mut self.qualification,
            Field::Comments => &mut self.comments,
        };
        *slot = value.into();
    }

    /// Reset every field to empty.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Check whether every field is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        Field::ALL.into_iter().all(|field| self.get(field).is_empty())
    }
}

/// Build a submission from `(field name, value)` pairs.
///
/// Unknown field names are ignored.
impl<K, V> FromIterator<(K, V)> for RawCandidate
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut raw = Self::default();
        for (name, value) in iter {
            if let Some(field) = Field::from_name(name.as_ref()) {
                raw.set(field, value);
            }
        }
        raw
    }
}

impl From<CandidateFields> for RawCandidate {
    fn from(fields: CandidateFields) -> Self {
        Self {
            job_role: fields.job_role,
            full_name: fields.full_name,
            email: fields.email,
            address: fields.address,
            qualification: fields.qualification,
            comments: fields.comments,
        }
    }
}

/// Field-level validation failures, keyed by field in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    /// Create an empty error set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for a field, replacing any earlier one.
    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// Get the message for a field, if it failed.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Check whether a field failed.
    #[must_use]
    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    /// Number of failed fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check whether no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The failed fields, in form order.
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }

    /// Iterate over `(field, message)` pairs in form order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// Checks raw submissions against the candidate schema.
///
/// The set of accepted job roles comes from configuration. An empty set
/// accepts any non-empty role.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    job_roles: Vec<String>,
}

impl Validator {
    /// Create a validator accepting the given job roles.
    #[must_use]
    pub fn new<I, S>(job_roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            job_roles: job_roles.into_iter().map(Into::into).collect(),
        }
    }

    /// The configured job roles.
    #[must_use]
    pub fn job_roles(&self) -> &[String] {
        &self.job_roles
    }

    /// Validate a submission.
    ///
    /// # Errors
    ///
    /// Returns every failing field with its message.
    pub fn validate(&self, raw: &RawCandidate) -> Result<CandidateFields, FieldErrors> {
        let mut errors = FieldErrors::new();

        for field in Field::ALL {
            if let Some(message) = self.check(field, raw.get(field)) {
                errors.insert(field, message);
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(CandidateFields {
            job_role: raw.job_role.clone(),
            full_name: raw.full_name.clone(),
            email: raw.email.clone(),
            address: raw.address.clone(),
            qualification: raw.qualification.clone(),
            comments: raw.comments.clone(),
        })
    }

    /// Check a single field, returning the first violated rule.
    fn check(&self, field: Field, value: &str) -> Option<String> {
        match field {
            Field::JobRole => self.check_job_role(value),
            Field::Email => check_email(value),
            Field::FullName => check_length(value, FULL_NAME_BOUNDS),
            Field::Address => check_length(value, ADDRESS_BOUNDS),
            Field::Qualification => check_length(value, QUALIFICATION_BOUNDS),
            Field::Comments => check_length(value, COMMENTS_BOUNDS),
        }
    }

    fn check_job_role(&self, value: &str) -> Option<String> {
        if value.is_empty() {
            return Some(REQUIRED_MESSAGE.to_string());
        }
        if !self.job_roles.is_empty() && !self.job_roles.iter().any(|role| role == value) {
            return Some(format!("Unknown job role '{value}'"));
        }
        None
    }
}

fn check_email(value: &str) -> Option<String> {
    if email_regex().is_match(value) {
        None
    } else {
        Some(INVALID_EMAIL_MESSAGE.to_string())
    }
}

/// Lengths are counted in UTF-16 code units, as a browser form counts them.
fn check_length(value: &str, bounds: LengthBounds) -> Option<String> {
    let length = value.encode_utf16().count();
    if length < bounds.min {
        return Some(format!(
            "String must contain at least {} character(s)",
            bounds.min
        ));
    }
    if length > bounds.max {
        return Some(format!(
            "String must contain at most {} character(s)",
            bounds.max
        ));
    }
    None
}
