//! # srctrl - Sourcetrail-compatible index database writer
//!
//! Records files, symbols, references and their source locations into a
//! SQLite database laid out the way Sourcetrail reads it.
//!
//! srctrl provides:
//! - Name hierarchies with JSON and database serialization
//! - Symbol, reference and location kinds with their stored integer codes
//! - SQLite-backed storage with id deduplication
//! - An [`IndexWriter`] API with last-error bookkeeping
//! - The example driver that records a small Python class

pub mod name;
pub mod symbol;
pub mod edge;
pub mod location;
pub mod storage;
pub mod writer;
pub mod driver;
pub mod output;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use name::{NameElement, NameHierarchy};
pub use symbol::{DefinitionKind, NodeKind, SymbolKind};
pub use edge::{EdgeKind, ReferenceKind};
pub use location::{LocationKind, SourceRange};
pub use storage::SqliteStore;
pub use writer::{IndexWriter, SqliteWriter};

/// Database layout version written to the `meta` table and required on open.
pub const SUPPORTED_DATABASE_VERSION: i32 = 25;

/// Result type alias for srctrl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for srctrl operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid name hierarchy: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unable to {0}, because no database is currently open.")]
    NotOpen(&'static str),

    #[error("Unable to {action}, because {what} id is invalid.")]
    InvalidId { action: &'static str, what: &'static str },

    #[error("Unable to add nodes for an empty name hierarchy.")]
    EmptyName,

    #[error("Unable to setup database tables because database is not compatible.")]
    Incompatible,

    #[error("Unable to determine version of an empty database.")]
    EmptyDatabase,

    #[error("Unknown {kind}: {value}")]
    InvalidKind { kind: &'static str, value: String },
}
