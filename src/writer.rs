//! Index writer - the recording API clients call
//!
//! [`IndexWriter`] is the surface an indexer needs: open a database, record
//! files, symbols and references with their locations, commit, close.
//! [`SqliteWriter`] implements it on top of [`SqliteStore`].
//!
//! Every fallible call returns a `Result`. The writer additionally keeps the
//! message of the most recent failure, so callers that record many items and
//! check once at the end (after a commit, say) still see what went wrong.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Local};

use crate::edge::{EdgeKind, ReferenceKind};
use crate::location::{LocationKind, SourceRange};
use crate::name::NameHierarchy;
use crate::storage::{DbStats, NewFile, SqliteStore};
use crate::symbol::{DefinitionKind, NodeKind, SymbolKind};
use crate::{Error, Result, SUPPORTED_DATABASE_VERSION};

/// Serialized name of the node unresolved references point at
const UNSOLVED_SYMBOL_NAME: &str = "unsolved symbol";

/// `element_component.type` marking a reference as ambiguous
const COMPONENT_IS_AMBIGUOUS: i32 = 1 << 0;

const PROJECT_FILE_EXTENSION: &str = "srctrlprj";

const PROJECT_FILE_CONTENT: &str = r#"<?xml version="1.0" encoding="utf-8" ?>
<config>
    <version>0</version>
</config>
"#;

const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Recording API for an index database.
pub trait IndexWriter {
    /// Storage version this writer produces and accepts
    fn supported_database_version(&self) -> i32;

    /// Message of the most recent failed call, if any
    fn last_error(&self) -> Option<&str>;

    fn clear_last_error(&mut self);

    /// Open (or create) the database file, closing any database already open
    fn open(&mut self, path: &Path) -> Result<()>;

    /// Close the open database. Uncommitted changes are rolled back.
    fn close(&mut self) -> Result<()>;

    /// Remove all recorded data from the open database
    fn clear(&mut self) -> Result<()>;

    fn begin_transaction(&mut self) -> Result<()>;

    fn commit_transaction(&mut self) -> Result<()>;

    fn rollback_transaction(&mut self) -> Result<()>;

    /// Record a source file; the returned id is used in every `SourceRange`
    fn record_file(&mut self, path: &str) -> Result<i64>;

    /// Tag a recorded file with a language identifier used for highlighting
    fn record_file_language(&mut self, file_id: i64, language: &str) -> Result<()>;

    /// Record a symbol and all of its parents, returning the symbol's id
    fn record_symbol(&mut self, name: &NameHierarchy) -> Result<i64>;

    fn record_symbol_definition_kind(&mut self, symbol_id: i64, kind: DefinitionKind) -> Result<()>;

    fn record_symbol_kind(&mut self, symbol_id: i64, kind: SymbolKind) -> Result<()>;

    /// Location of the symbol's name token
    fn record_symbol_location(&mut self, symbol_id: i64, location: SourceRange) -> Result<()>;

    /// Full extent of the symbol's definition
    fn record_symbol_scope_location(&mut self, symbol_id: i64, location: SourceRange) -> Result<()>;

    fn record_symbol_signature_location(&mut self, symbol_id: i64, location: SourceRange) -> Result<()>;

    /// Record a reference from a context symbol to a referenced symbol
    fn record_reference(
        &mut self,
        context_symbol_id: i64,
        referenced_symbol_id: i64,
        kind: ReferenceKind,
    ) -> Result<i64>;

    fn record_reference_location(&mut self, reference_id: i64, location: SourceRange) -> Result<()>;
}

/// [`IndexWriter`] storing into a Sourcetrail-compatible SQLite database.
#[derive(Default)]
pub struct SqliteWriter {
    store: Option<SqliteStore>,
    database_path: Option<PathBuf>,
    last_error: Option<String>,
}

impl SqliteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Library version, including the database version it writes
    pub fn version_string(&self) -> String {
        format!("v{}.db{}", env!("CARGO_PKG_VERSION"), SUPPORTED_DATABASE_VERSION)
    }

    pub fn is_open(&self) -> bool {
        self.store.is_some()
    }

    /// Direct access to the open store, for inspection
    pub fn storage(&self) -> Option<&SqliteStore> {
        self.store.as_ref()
    }

    /// True if the open database holds no tables yet
    pub fn is_empty(&mut self) -> Result<bool> {
        let result = self.store("check if database is empty").and_then(|s| s.is_empty());
        self.track(result)
    }

    pub fn is_compatible(&mut self) -> Result<bool> {
        let result = self.store("check if database is compatible").and_then(|s| s.is_compatible());
        self.track(result)
    }

    pub fn loaded_database_version(&mut self) -> Result<i32> {
        let result = self.store("fetch database version").and_then(|s| s.loaded_database_version());
        self.track(result)
    }

    pub fn optimize_database_memory(&mut self) -> Result<()> {
        let result = self.store("optimize database memory").and_then(|s| s.optimize_database_memory());
        self.track(result)
    }

    pub fn stats(&mut self) -> Result<DbStats> {
        let result = self.store("collect statistics").and_then(|s| s.stats());
        self.track(result)
    }

    /// Mark a recorded reference as possibly not existing
    pub fn record_reference_is_ambiguous(&mut self, reference_id: i64) -> Result<()> {
        const ACTION: &str = "record reference is ambiguous";
        let result = self.store(ACTION).and_then(|store| {
            require_edge(store, reference_id, ACTION)?;
            store.add_element_component(reference_id, COMPONENT_IS_AMBIGUOUS, "")?;
            Ok(())
        });
        self.track(result)
    }

    /// Record a reference whose target could not be resolved.
    ///
    /// All such references point at one shared "unsolved symbol" node.
    pub fn record_reference_to_unsolved_symbol(
        &mut self,
        context_symbol_id: i64,
        kind: ReferenceKind,
        location: SourceRange,
    ) -> Result<i64> {
        let result = self.store("record reference to unsolved symbol").and_then(|store| {
            let unsolved = NameHierarchy::from_names("", [UNSOLVED_SYMBOL_NAME]);
            let target_id = add_node_hierarchy(store, &unsolved)?;
            let reference_id = add_edge(store, context_symbol_id, target_id, kind.to_edge_kind())?;
            add_source_location(store, reference_id, location, LocationKind::Unsolved)?;
            Ok(reference_id)
        });
        self.track(result)
    }

    /// Location where a symbol's name is used as a qualifier
    pub fn record_qualifier_location(&mut self, referenced_symbol_id: i64, location: SourceRange) -> Result<()> {
        const ACTION: &str = "record qualifier location";
        let result = self.store(ACTION).and_then(|store| {
            require_element(store, referenced_symbol_id, ACTION, "symbol")?;
            add_source_location(store, referenced_symbol_id, location, LocationKind::Qualifier)
        });
        self.track(result)
    }

    /// Record a function-local symbol such as a variable or parameter
    pub fn record_local_symbol(&mut self, name: &str) -> Result<i64> {
        let result = self.store("record local symbol").and_then(|store| store.add_local_symbol(name));
        self.track(result)
    }

    pub fn record_local_symbol_location(&mut self, local_symbol_id: i64, location: SourceRange) -> Result<()> {
        const ACTION: &str = "record local symbol location";
        let result = self.store(ACTION).and_then(|store| {
            require_element(store, local_symbol_id, ACTION, "local symbol")?;
            add_source_location(store, local_symbol_id, location, LocationKind::LocalSymbol)
        });
        self.track(result)
    }

    /// A range that must not be split when displaying code, e.g. a multi-line string
    pub fn record_atomic_source_range(&mut self, location: SourceRange) -> Result<()> {
        const ACTION: &str = "record atomic source range";
        let result = self.store(ACTION).and_then(|store| {
            require_file(store, location.file_id, ACTION)?;
            store.add_source_location(
                location.file_id,
                location.start_line,
                location.start_column,
                location.end_line,
                location.end_column,
                LocationKind::AtomicRange,
            )?;
            Ok(())
        });
        self.track(result)
    }

    /// Record an indexing problem. `fatal` means indexing stopped at this location.
    pub fn record_error(&mut self, message: &str, fatal: bool, location: SourceRange) -> Result<()> {
        let result = self.store("record error").and_then(|store| {
            let error_id = store.add_error(message, fatal)?;
            add_source_location(store, error_id, location, LocationKind::IndexerError)
        });
        self.track(result)
    }

    fn store(&self, action: &'static str) -> Result<&SqliteStore> {
        self.store.as_ref().ok_or(Error::NotOpen(action))
    }

    /// Remember the message of a failed call
    fn track<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            tracing::debug!("{}", e);
            self.last_error = Some(e.to_string());
        }
        result
    }

    fn project_file_path(database_path: &Path) -> PathBuf {
        database_path.with_extension(PROJECT_FILE_EXTENSION)
    }

    fn open_database(&mut self, path: &Path) -> Result<()> {
        if self.store.is_some() {
            self.close_database()?;
        }

        let store = SqliteStore::open(path)?;
        store.setup_tables()?;

        let project_file = Self::project_file_path(path);
        if !project_file.exists() {
            fs::write(&project_file, PROJECT_FILE_CONTENT)?;
        }

        tracing::debug!("Opened database {}", path.display());
        self.store = Some(store);
        self.database_path = Some(path.to_path_buf());
        Ok(())
    }

    fn close_database(&mut self) -> Result<()> {
        let store = self.store.take().ok_or(Error::NotOpen("close database"))?;
        self.database_path = None;

        let rolled_back = if store.in_transaction() {
            tracing::warn!("Closing database with an open transaction; rolling back");
            store.rollback_transaction()
        } else {
            Ok(())
        };
        let closed = store.close();
        rolled_back.and(closed)
    }

    fn clear_database(&mut self) -> Result<()> {
        let store = self.store("clear database")?;
        store.clear_tables()?;
        if let Some(path) = &self.database_path {
            fs::write(Self::project_file_path(path), PROJECT_FILE_CONTENT)?;
        }
        Ok(())
    }
}

impl IndexWriter for SqliteWriter {
    fn supported_database_version(&self) -> i32 {
        SUPPORTED_DATABASE_VERSION
    }

    fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn clear_last_error(&mut self) {
        self.last_error = None;
    }

    fn open(&mut self, path: &Path) -> Result<()> {
        let result = self.open_database(path);
        self.track(result)
    }

    fn close(&mut self) -> Result<()> {
        let result = self.close_database();
        self.track(result)
    }

    fn clear(&mut self) -> Result<()> {
        let result = self.clear_database();
        self.track(result)
    }

    fn begin_transaction(&mut self) -> Result<()> {
        let result = self.store("begin transaction").and_then(|s| s.begin_transaction());
        self.track(result)
    }

    fn commit_transaction(&mut self) -> Result<()> {
        let result = self.store("commit transaction").and_then(|s| s.commit_transaction());
        self.track(result)
    }

    fn rollback_transaction(&mut self) -> Result<()> {
        let result = self.store("rollback transaction").and_then(|s| s.rollback_transaction());
        self.track(result)
    }

    fn record_file(&mut self, path: &str) -> Result<i64> {
        let result = self.store("record file").and_then(|store| add_file(store, path));
        self.track(result)
    }

    fn record_file_language(&mut self, file_id: i64, language: &str) -> Result<()> {
        let result = self.store("record file language").and_then(|store| {
            if store.set_file_language(file_id, language)? {
                Ok(())
            } else {
                Err(Error::InvalidId { action: "record file language", what: "file" })
            }
        });
        self.track(result)
    }

    fn record_symbol(&mut self, name: &NameHierarchy) -> Result<i64> {
        let result = self.store("record symbol").and_then(|store| {
            let id = add_node_hierarchy(store, name)?;
            tracing::debug!("Recorded symbol {} as {}", name, id);
            Ok(id)
        });
        self.track(result)
    }

    fn record_symbol_definition_kind(&mut self, symbol_id: i64, kind: DefinitionKind) -> Result<()> {
        const ACTION: &str = "record symbol definition kind";
        let result = self.store(ACTION).and_then(|store| {
            require_element(store, symbol_id, ACTION, "symbol")?;
            store.add_symbol(symbol_id, kind)
        });
        self.track(result)
    }

    fn record_symbol_kind(&mut self, symbol_id: i64, kind: SymbolKind) -> Result<()> {
        const ACTION: &str = "record symbol kind";
        let result = self.store(ACTION).and_then(|store| {
            require_element(store, symbol_id, ACTION, "symbol")?;
            store.set_node_type(symbol_id, kind.to_node_kind())
        });
        self.track(result)
    }

    fn record_symbol_location(&mut self, symbol_id: i64, location: SourceRange) -> Result<()> {
        const ACTION: &str = "record symbol location";
        let result = self.store(ACTION).and_then(|store| {
            require_element(store, symbol_id, ACTION, "symbol")?;
            add_source_location(store, symbol_id, location, LocationKind::Token)
        });
        self.track(result)
    }

    fn record_symbol_scope_location(&mut self, symbol_id: i64, location: SourceRange) -> Result<()> {
        const ACTION: &str = "record symbol scope location";
        let result = self.store(ACTION).and_then(|store| {
            require_element(store, symbol_id, ACTION, "symbol")?;
            add_source_location(store, symbol_id, location, LocationKind::Scope)
        });
        self.track(result)
    }

    fn record_symbol_signature_location(&mut self, symbol_id: i64, location: SourceRange) -> Result<()> {
        const ACTION: &str = "record symbol signature location";
        let result = self.store(ACTION).and_then(|store| {
            require_element(store, symbol_id, ACTION, "symbol")?;
            add_source_location(store, symbol_id, location, LocationKind::Signature)
        });
        self.track(result)
    }

    fn record_reference(
        &mut self,
        context_symbol_id: i64,
        referenced_symbol_id: i64,
        kind: ReferenceKind,
    ) -> Result<i64> {
        let result = self.store("record reference").and_then(|store| {
            let id = add_edge(store, context_symbol_id, referenced_symbol_id, kind.to_edge_kind())?;
            tracing::debug!(
                "Recorded {} reference {} -> {} as {}",
                kind, context_symbol_id, referenced_symbol_id, id
            );
            Ok(id)
        });
        self.track(result)
    }

    fn record_reference_location(&mut self, reference_id: i64, location: SourceRange) -> Result<()> {
        const ACTION: &str = "record reference location";
        let result = self.store(ACTION).and_then(|store| {
            require_edge(store, reference_id, ACTION)?;
            add_source_location(store, reference_id, location, LocationKind::Token)
        });
        self.track(result)
    }
}

/// Store one node per prefix of `name`, linking each parent to its child
/// with a member edge. Returns the id of the innermost node.
fn add_node_hierarchy(store: &SqliteStore, name: &NameHierarchy) -> Result<i64> {
    if name.is_empty() {
        return Err(Error::EmptyName);
    }

    let mut parent_id = None;
    for prefix in name.prefixes() {
        let node_id = store.add_node(&prefix.serialize_for_database())?;
        if let Some(parent) = parent_id {
            add_edge(store, parent, node_id, EdgeKind::Member)?;
        }
        parent_id = Some(node_id);
    }
    parent_id.ok_or(Error::EmptyName)
}

fn add_edge(store: &SqliteStore, source_id: i64, target_id: i64, kind: EdgeKind) -> Result<i64> {
    if source_id <= 0 {
        return Err(Error::InvalidId { action: "add edge", what: "source" });
    }
    if target_id <= 0 {
        return Err(Error::InvalidId { action: "add edge", what: "target" });
    }
    store.add_edge(source_id, target_id, kind)
}

fn add_file(store: &SqliteStore, path: &str) -> Result<i64> {
    let name = NameHierarchy::from_names("/", [path]);
    let node_id = add_node_hierarchy(store, &name)?;
    store.set_node_type(node_id, NodeKind::File)?;

    let (modification_time, content) = read_file_metadata(Path::new(path));
    let line_count = content.as_deref().map_or(0, |c| c.matches('\n').count());
    store.add_file(&NewFile {
        node_id,
        path,
        modification_time: &modification_time,
        line_count,
        content: content.as_deref(),
    })?;

    tracing::debug!("Recorded file {} as {}", path, node_id);
    Ok(node_id)
}

/// Modification time and content of a file on disk. Files that cannot be
/// read are still recorded, with the epoch as their time and no content.
fn read_file_metadata(path: &Path) -> (String, Option<String>) {
    let modified = fs::metadata(path)
        .ok()
        .filter(|m| m.is_file())
        .and_then(|m| m.modified().ok());

    let Some(modified) = modified else {
        return (format_local_time(UNIX_EPOCH), None);
    };

    let content = fs::read(path)
        .ok()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned());
    (format_local_time(modified), content)
}

fn format_local_time(time: SystemTime) -> String {
    DateTime::<Local>::from(time).format(DATE_TIME_FORMAT).to_string()
}

/// Store a location and link it to the element occurring there
fn add_source_location(
    store: &SqliteStore,
    element_id: i64,
    location: SourceRange,
    kind: LocationKind,
) -> Result<()> {
    require_file(store, location.file_id, "record source location")?;
    let location_id = store.add_source_location(
        location.file_id,
        location.start_line,
        location.start_column,
        location.end_line,
        location.end_column,
        kind,
    )?;
    store.add_occurrence(element_id, location_id)
}

fn require_element(store: &SqliteStore, id: i64, action: &'static str, what: &'static str) -> Result<()> {
    if id > 0 && store.element_exists(id)? {
        Ok(())
    } else {
        Err(Error::InvalidId { action, what })
    }
}

fn require_edge(store: &SqliteStore, id: i64, action: &'static str) -> Result<()> {
    if id > 0 && store.edge_exists(id)? {
        Ok(())
    } else {
        Err(Error::InvalidId { action, what: "reference" })
    }
}

fn require_file(store: &SqliteStore, id: i64, action: &'static str) -> Result<()> {
    if id > 0 && store.file_exists(id)? {
        Ok(())
    } else {
        Err(Error::InvalidId { action, what: "file" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_writer() -> (TempDir, SqliteWriter) {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = SqliteWriter::new();
        writer.open(&dir.path().join("testing.srctrldb")).unwrap();
        writer.clear().unwrap();
        (dir, writer)
    }

    fn store(writer: &SqliteWriter) -> &SqliteStore {
        writer.storage().unwrap()
    }

    fn range(file_id: i64) -> SourceRange {
        SourceRange::new(file_id, 1, 2, 3, 4)
    }

    #[test]
    fn test_calls_without_open_database_fail() {
        let mut writer = SqliteWriter::new();
        assert!(writer.last_error().is_none());

        let err = writer.begin_transaction().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unable to begin transaction, because no database is currently open."
        );
        assert_eq!(writer.last_error(), Some(err.to_string().as_str()));

        assert!(writer.record_file("a.py").is_err());
        assert!(writer.close().is_err());
        assert_eq!(
            writer.last_error(),
            Some("Unable to close database, because no database is currently open.")
        );

        writer.clear_last_error();
        assert!(writer.last_error().is_none());
    }

    #[test]
    fn test_open_creates_project_file() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("project.srctrldb");
        let mut writer = SqliteWriter::new();

        writer.open(&db_path).unwrap();
        assert!(writer.is_open());
        assert!(!writer.is_empty().unwrap());
        assert!(writer.is_compatible().unwrap());
        assert_eq!(writer.loaded_database_version().unwrap(), SUPPORTED_DATABASE_VERSION);

        let project = fs::read_to_string(dir.path().join("project.srctrlprj")).unwrap();
        assert!(project.contains("<version>0</version>"));

        writer.close().unwrap();
        assert!(!writer.is_open());
        assert!(writer.last_error().is_none());
    }

    #[test]
    fn test_open_refuses_incompatible_database() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("old.srctrldb");

        let mut writer = SqliteWriter::new();
        writer.open(&db_path).unwrap();
        writer.close().unwrap();

        let conn = rusqlite::Connection::open(&db_path).unwrap();
        conn.execute("UPDATE meta SET value = '3' WHERE key = 'storage_version'", [])
            .unwrap();
        drop(conn);

        assert!(matches!(writer.open(&db_path), Err(Error::Incompatible)));
        assert!(!writer.is_open());
        assert_eq!(
            writer.last_error(),
            Some("Unable to setup database tables because database is not compatible.")
        );
    }

    #[test]
    fn test_record_symbol_stores_hierarchy() {
        let (_dir, mut writer) = open_writer();

        let name = NameHierarchy::from_names("::", ["foo", "bar"]);
        let id = writer.record_symbol(&name).unwrap();
        assert_eq!(writer.record_symbol(&name).unwrap(), id);

        let nodes = store(&writer).all_nodes().unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[1].id, id);
        assert_eq!(nodes[1].serialized_name, name.serialize_for_database());
        assert_eq!(nodes[1].kind, NodeKind::Unknown);

        let edges = store(&writer).all_edges().unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].kind, EdgeKind::Member);
        assert_eq!(edges[0].source_node_id, nodes[0].id);
        assert_eq!(edges[0].target_node_id, id);
    }

    #[test]
    fn test_record_empty_symbol_fails() {
        let (_dir, mut writer) = open_writer();
        assert!(matches!(
            writer.record_symbol(&NameHierarchy::new(".")),
            Err(Error::EmptyName)
        ));
        assert!(writer.last_error().is_some());
    }

    #[test]
    fn test_record_symbol_kinds() {
        let (_dir, mut writer) = open_writer();
        let id = writer.record_symbol(&NameHierarchy::from_names(".", ["MyType"])).unwrap();

        writer.record_symbol_definition_kind(id, DefinitionKind::Explicit).unwrap();
        writer.record_symbol_kind(id, SymbolKind::Class).unwrap();

        let symbols = store(&writer).all_symbols().unwrap();
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].definition_kind, DefinitionKind::Explicit);
        assert_eq!(store(&writer).all_nodes().unwrap()[0].kind, NodeKind::Class);

        assert!(writer.record_symbol_kind(id + 50, SymbolKind::Class).is_err());
        assert_eq!(
            writer.last_error(),
            Some("Unable to record symbol kind, because symbol id is invalid.")
        );
    }

    #[test]
    fn test_record_symbol_locations() {
        let (_dir, mut writer) = open_writer();
        let file_id = writer.record_file("path/to/non_existing_file.cpp").unwrap();
        let id = writer.record_symbol(&NameHierarchy::from_names(".", ["f"])).unwrap();

        writer.record_symbol_location(id, range(file_id)).unwrap();
        writer.record_symbol_scope_location(id, range(file_id)).unwrap();
        writer.record_symbol_signature_location(id, range(file_id)).unwrap();

        let locations = store(&writer).all_source_locations().unwrap();
        let kinds: Vec<LocationKind> = locations.iter().map(|l| l.kind).collect();
        assert_eq!(kinds, vec![LocationKind::Token, LocationKind::Scope, LocationKind::Signature]);
        assert!(locations.iter().all(|l| l.file_node_id == file_id));
        assert_eq!((locations[0].start_line, locations[0].end_column), (1, 4));

        let occurrences = store(&writer).all_occurrences().unwrap();
        assert_eq!(occurrences.len(), 3);
        assert!(occurrences.iter().all(|o| o.element_id == id));
    }

    #[test]
    fn test_location_requires_recorded_file() {
        let (_dir, mut writer) = open_writer();
        let id = writer.record_symbol(&NameHierarchy::from_names(".", ["f"])).unwrap();
        assert!(writer.record_symbol_location(id, range(id)).is_err());
        assert_eq!(
            writer.last_error(),
            Some("Unable to record source location, because file id is invalid.")
        );
    }

    #[test]
    fn test_record_reference_and_location() {
        let (_dir, mut writer) = open_writer();
        let file_id = writer.record_file("a.py").unwrap();
        let context = writer.record_symbol(&NameHierarchy::from_names(".", ["A", "m"])).unwrap();
        let target = writer.record_symbol(&NameHierarchy::from_names(".", ["A", "f"])).unwrap();

        let reference = writer.record_reference(context, target, ReferenceKind::Usage).unwrap();
        assert_eq!(writer.record_reference(context, target, ReferenceKind::Usage).unwrap(), reference);
        writer.record_reference_location(reference, range(file_id)).unwrap();

        let edges = store(&writer).all_edges().unwrap();
        let usage = edges.iter().find(|e| e.id == reference).unwrap();
        assert_eq!(usage.kind, EdgeKind::Usage);
        assert_eq!((usage.source_node_id, usage.target_node_id), (context, target));

        let occurrences = store(&writer).all_occurrences().unwrap();
        assert_eq!(occurrences.len(), 1);
        assert_eq!(occurrences[0].element_id, reference);

        assert!(writer.record_reference(0, target, ReferenceKind::Call).is_err());
        assert_eq!(
            writer.last_error(),
            Some("Unable to add edge, because source id is invalid.")
        );
        assert!(writer.record_reference_location(context, range(file_id)).is_err());
    }

    #[test]
    fn test_record_reference_extras() {
        let (_dir, mut writer) = open_writer();
        let file_id = writer.record_file("a.cpp").unwrap();
        let context = writer.record_symbol(&NameHierarchy::from_names("::", ["main"])).unwrap();
        let target = writer.record_symbol(&NameHierarchy::from_names("::", ["foo"])).unwrap();

        let reference = writer.record_reference(context, target, ReferenceKind::Call).unwrap();
        writer.record_reference_is_ambiguous(reference).unwrap();
        let components = store(&writer).all_element_components().unwrap();
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].element_id, reference);
        assert_eq!(components[0].kind, COMPONENT_IS_AMBIGUOUS);

        let unsolved = writer
            .record_reference_to_unsolved_symbol(context, ReferenceKind::Call, range(file_id))
            .unwrap();
        let unsolved_edge = store(&writer)
            .all_edges()
            .unwrap()
            .into_iter()
            .find(|e| e.id == unsolved)
            .unwrap();
        let nodes = store(&writer).all_nodes().unwrap();
        let unsolved_node = nodes.iter().find(|n| n.id == unsolved_edge.target_node_id).unwrap();
        assert_eq!(unsolved_node.serialized_name, "\tmunsolved symbol\ts\tp");

        writer.record_qualifier_location(target, SourceRange::new(file_id, 5, 1, 5, 3)).unwrap();

        let kinds: Vec<LocationKind> = store(&writer)
            .all_source_locations()
            .unwrap()
            .iter()
            .map(|l| l.kind)
            .collect();
        assert_eq!(kinds, vec![LocationKind::Unsolved, LocationKind::Qualifier]);
    }

    #[test]
    fn test_record_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("a.py");
        fs::write(&source, "class MyType:\n    pass\n").unwrap();
        let source = source.to_string_lossy().replace('\\', "/");

        let mut writer = SqliteWriter::new();
        writer.open(&dir.path().join("db.srctrldb")).unwrap();

        let id = writer.record_file(&source).unwrap();
        assert_eq!(writer.record_file(&source).unwrap(), id);
        writer.record_file_language(id, "python").unwrap();

        let files = store(&writer).all_files().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, source);
        assert_eq!(files[0].language, "python");
        assert_eq!(files[0].line_count, 2);
        assert_ne!(files[0].modification_time, format_local_time(UNIX_EPOCH));
        assert_eq!(
            store(&writer).file_content(id).unwrap().as_deref(),
            Some("class MyType:\n    pass\n")
        );
        assert_eq!(store(&writer).all_nodes().unwrap()[0].kind, NodeKind::File);

        assert!(writer.record_file_language(id + 10, "python").is_err());
    }

    #[test]
    fn test_line_count_ignores_missing_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("b.py");
        fs::write(&source, "a = 1\nb = 2").unwrap();
        let source = source.to_string_lossy().replace('\\', "/");

        let mut writer = SqliteWriter::new();
        writer.open(&dir.path().join("db.srctrldb")).unwrap();
        writer.record_file(&source).unwrap();

        let files = store(&writer).all_files().unwrap();
        assert_eq!(files[0].line_count, 1);
    }

    #[test]
    fn test_record_missing_file() {
        let (_dir, mut writer) = open_writer();
        let id = writer.record_file("path/to/non_existing_file.cpp").unwrap();
        let files = store(&writer).all_files().unwrap();
        assert_eq!(files[0].id, id);
        assert_eq!(files[0].language, "");
        assert_eq!(files[0].line_count, 0);
        assert_eq!(files[0].modification_time, format_local_time(UNIX_EPOCH));
        assert!(store(&writer).file_content(id).unwrap().is_none());
    }

    #[test]
    fn test_record_local_symbol() {
        let (_dir, mut writer) = open_writer();
        let file_id = writer.record_file("a.cpp").unwrap();
        let id = writer.record_local_symbol("foo").unwrap();
        assert_eq!(writer.record_local_symbol("foo").unwrap(), id);

        writer.record_local_symbol_location(id, range(file_id)).unwrap();
        let locations = store(&writer).all_source_locations().unwrap();
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].kind, LocationKind::LocalSymbol);
        assert_eq!(store(&writer).all_occurrences().unwrap()[0].element_id, id);
    }

    #[test]
    fn test_record_atomic_range_and_error() {
        let (_dir, mut writer) = open_writer();
        let file_id = writer.record_file("a.cpp").unwrap();

        writer.record_atomic_source_range(range(file_id)).unwrap();
        assert!(store(&writer).all_occurrences().unwrap().is_empty());

        writer
            .record_error("This is a very serious test error message.", false, range(file_id))
            .unwrap();
        writer
            .record_error("This is a very serious test error message.", false, range(file_id))
            .unwrap();

        let errors = store(&writer).all_errors().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(!errors[0].fatal);

        let kinds: Vec<LocationKind> = store(&writer)
            .all_source_locations()
            .unwrap()
            .iter()
            .map(|l| l.kind)
            .collect();
        assert_eq!(kinds, vec![LocationKind::AtomicRange, LocationKind::IndexerError]);
    }

    #[test]
    fn test_close_rolls_back_open_transaction() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("tx.srctrldb");
        let mut writer = SqliteWriter::new();

        writer.open(&db_path).unwrap();
        writer.begin_transaction().unwrap();
        writer.record_file("a.py").unwrap();
        writer.close().unwrap();

        writer.open(&db_path).unwrap();
        assert_eq!(writer.stats().unwrap().files, 0);

        writer.begin_transaction().unwrap();
        writer.record_file("a.py").unwrap();
        writer.commit_transaction().unwrap();
        writer.close().unwrap();

        writer.open(&db_path).unwrap();
        assert_eq!(writer.stats().unwrap().files, 1);
        writer.clear().unwrap();
        assert_eq!(writer.stats().unwrap(), DbStats::default());
        writer.optimize_database_memory().unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn test_version_string_mentions_database_version() {
        let writer = SqliteWriter::new();
        assert!(writer.version_string().ends_with(&format!(".db{}", SUPPORTED_DATABASE_VERSION)));
        assert_eq!(writer.supported_database_version(), SUPPORTED_DATABASE_VERSION);
    }
}
