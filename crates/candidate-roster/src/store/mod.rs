//! Document store abstraction for candidate-roster.
//!
//! The roster talks to its backing store through [`DocumentStore`], an
//! asynchronous collection API with exactly three operations: list every
//! document in a collection, create a document, and delete one by id.
//! [`SqliteStore`] is the bundled implementation.

pub mod migrations;
pub mod schema;
mod sqlite;

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::record::DocumentId;

pub use sqlite::{SqliteStore, StoreStats};

/// Name of the collection holding candidate records.
pub const CANDIDATES_COLLECTION: &str = "candidates";

/// The store call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    /// Listing every document in a collection.
    ListAll,
    /// Creating a document.
    Create,
    /// Deleting a document by id.
    Delete,
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ListAll => write!(f, "list"),
            Self::Create => write!(f, "create"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Errors surfaced by a [`DocumentStore`].
///
/// The roster treats every variant the same way: it reports the failure and
/// leaves its records untouched.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend rejected or failed the operation.
    #[error("{operation} on collection '{collection}' failed: {source}")]
    Backend {
        /// Which call failed.
        operation: StoreOperation,
        /// Collection the call targeted.
        collection: String,
        /// The underlying error.
        #[source]
        source: crate::Error,
    },

    /// The store could not be reached at all.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Wrap a backend error with the operation and collection it came from.
    #[must_use]
    pub fn backend(
        operation: StoreOperation,
        collection: impl Into<String>,
        source: crate::Error,
    ) -> Self {
        Self::Backend {
            operation,
            collection: collection.into(),
            source,
        }
    }

    /// Create an unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Check if the store could not be reached at all.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// A stored document: its id and its JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Store-assigned identifier.
    pub id: DocumentId,
    /// The document body.
    pub fields: Value,
}

impl Document {
    /// Create a document.
    #[must_use]
    pub fn new(id: DocumentId, fields: Value) -> Self {
        Self { id, fields }
    }
}

/// An asynchronous document collection store.
///
/// Implementations assign ids on [`create`](DocumentStore::create) and must
/// never hand out the same id twice within a collection.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// List every document in a collection, in the store's fetch order.
    ///
    /// An empty collection yields an empty vector.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    async fn list_all(&self, collection: &str) -> Result<Vec<Document>>;

    /// Create a document and return its assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be written.
    async fn create(&self, collection: &str, fields: Value) -> Result<DocumentId>;

    /// Delete a document by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not exist or cannot be removed.
    async fn delete_by_id(&self, collection: &str, id: &DocumentId) -> Result<()>;
}
