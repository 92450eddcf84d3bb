//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - node(id, type, serialized_name) and edge(id, type, source_node_id, target_node_id)
//! - symbol(id, definition_kind) and file(id, path, language, ...)
//! - source_location(id, file_node_id, span, type) linked through occurrence
//! - local_symbol, error, element_component, meta

pub mod schema;
pub mod sqlite;

pub use sqlite::{
    DbStats, NewFile, SqliteStore, StoredEdge, StoredElementComponent, StoredError, StoredFile,
    StoredLocalSymbol, StoredNode, StoredOccurrence, StoredSourceLocation, StoredSymbol,
};
