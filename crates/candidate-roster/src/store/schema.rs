//! `SQLite` schema definitions for the document store.

/// SQL statement to create the documents table.
///
/// `seq` gives the fetch order; `id` is the store-assigned document id.
pub const CREATE_DOCUMENTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS documents (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    collection TEXT NOT NULL,
    body TEXT NOT NULL,
    created_at TEXT NOT NULL
)
";

/// SQL statement to create an index on collection for listing.
pub const CREATE_COLLECTION_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection, seq)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";
