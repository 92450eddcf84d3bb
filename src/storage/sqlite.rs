//! SQLite storage implementation

use std::path::Path;
use rusqlite::{Connection, params, OptionalExtension};
use crate::{Result, Error, SUPPORTED_DATABASE_VERSION};
use crate::edge::EdgeKind;
use crate::location::LocationKind;
use crate::symbol::{DefinitionKind, NodeKind};
use super::schema;

const STORAGE_VERSION_KEY: &str = "storage_version";

/// SQLite-backed storage for recorded index data.
///
/// Every `add_*` method is idempotent for equal input: it looks for an
/// existing row first and returns its id.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist). Tables are not set up.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database with tables set up (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.setup_tables()?;
        Ok(store)
    }

    /// Release the connection, surfacing any error SQLite reports on close
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| Error::Storage(e))
    }

    // ========== Schema Operations ==========

    /// Create missing tables and stamp the storage version.
    ///
    /// Fails without touching anything when the file holds data written
    /// with a different storage version.
    pub fn setup_tables(&self) -> Result<()> {
        self.conn.execute_batch("PRAGMA foreign_keys=ON;")?;

        if !self.is_compatible()? {
            return Err(Error::Incompatible);
        }

        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }

        self.insert_or_update_meta_value(STORAGE_VERSION_KEY, &SUPPORTED_DATABASE_VERSION.to_string())
    }

    /// Drop every table and set the schema up again
    pub fn clear_tables(&self) -> Result<()> {
        self.conn.execute_batch("PRAGMA foreign_keys=OFF;")?;
        for table in schema::TABLE_NAMES {
            self.conn.execute(&format!("DROP TABLE IF EXISTS main.{}", table), [])?;
        }
        self.setup_tables()
    }

    /// True when no tables have been set up yet
    pub fn is_empty(&self) -> Result<bool> {
        let name: Option<String> = self
            .conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'meta'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(name.is_none())
    }

    pub fn is_compatible(&self) -> Result<bool> {
        if self.is_empty()? {
            return Ok(true);
        }
        Ok(self.loaded_database_version()? == SUPPORTED_DATABASE_VERSION)
    }

    /// Storage version recorded in the `meta` table, 0 if absent
    pub fn loaded_database_version(&self) -> Result<i32> {
        if self.is_empty()? {
            return Err(Error::EmptyDatabase);
        }

        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM meta WHERE key = ?1",
                [STORAGE_VERSION_KEY],
                |row| row.get(0),
            )
            .optional()?;

        Ok(value.and_then(|v| v.trim().parse().ok()).unwrap_or(0))
    }

    fn insert_or_update_meta_value(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO meta (id, key, value) VALUES ((SELECT id FROM meta WHERE key = ?1), ?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    // ========== Transactions ==========

    /// Begin a transaction for bulk operations
    pub fn begin_transaction(&self) -> Result<()> {
        self.conn.execute("BEGIN TRANSACTION", [])?;
        Ok(())
    }

    /// Commit a transaction
    pub fn commit_transaction(&self) -> Result<()> {
        self.conn.execute("COMMIT TRANSACTION", [])?;
        Ok(())
    }

    /// Rollback a transaction
    pub fn rollback_transaction(&self) -> Result<()> {
        self.conn.execute("ROLLBACK TRANSACTION", [])?;
        Ok(())
    }

    pub fn in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }

    /// Rebuild the database file to release unused pages
    pub fn optimize_database_memory(&self) -> Result<()> {
        self.conn.execute_batch("VACUUM;")?;
        Ok(())
    }

    // ========== Element Operations ==========

    fn add_element(&self) -> Result<i64> {
        self.conn.execute("INSERT INTO element (id) VALUES (NULL)", [])?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Find or create the node with this serialized name
    pub fn add_node(&self, serialized_name: &str) -> Result<i64> {
        let existing: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM node WHERE serialized_name = ?1 LIMIT 1",
                [serialized_name],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(id) = existing {
            return Ok(id);
        }

        let id = self.add_element()?;
        self.conn.execute(
            "INSERT INTO node (id, type, serialized_name) VALUES (?1, ?2, ?3)",
            params![id, NodeKind::Unknown.to_i32(), serialized_name],
        )?;
        Ok(id)
    }

    pub fn set_node_type(&self, node_id: i64, kind: NodeKind) -> Result<()> {
        self.conn.execute(
            "UPDATE node SET type = ?1 WHERE id = ?2",
            params![kind.to_i32(), node_id],
        )?;
        Ok(())
    }

    /// Mark a node as a symbol. The first definition kind recorded wins.
    pub fn add_symbol(&self, node_id: i64, definition_kind: DefinitionKind) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO symbol (id, definition_kind) VALUES (?1, ?2)",
            params![node_id, definition_kind.to_i32()],
        )?;
        Ok(())
    }

    /// Store file metadata for an existing file node.
    ///
    /// `content` is only stored the first time the file row is created.
    pub fn add_file(&self, file: &NewFile<'_>) -> Result<()> {
        let inserted = self.conn.execute(
            r#"
            INSERT OR IGNORE INTO file (id, path, language, modification_time, indexed, complete, line_count)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                file.node_id,
                file.path,
                "",
                file.modification_time,
                true,
                true,
                file.line_count,
            ],
        )?;

        if inserted > 0 {
            if let Some(content) = file.content.filter(|c| !c.is_empty()) {
                self.conn.execute(
                    "INSERT INTO filecontent (id, content) VALUES (?1, ?2)",
                    params![file.node_id, content],
                )?;
            }
        }
        Ok(())
    }

    /// Returns false when no file with that id exists
    pub fn set_file_language(&self, file_id: i64, language: &str) -> Result<bool> {
        let updated = self.conn.execute(
            "UPDATE file SET language = ?1 WHERE id = ?2",
            params![language, file_id],
        )?;
        Ok(updated > 0)
    }

    pub fn file_exists(&self, file_id: i64) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM file WHERE id = ?1",
            [file_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Find or create an edge between two nodes
    pub fn add_edge(&self, source_node_id: i64, target_node_id: i64, kind: EdgeKind) -> Result<i64> {
        let existing: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM edge WHERE source_node_id = ?1 AND target_node_id = ?2 AND type = ?3 LIMIT 1",
                params![source_node_id, target_node_id, kind.to_i32()],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(id) = existing {
            return Ok(id);
        }

        let id = self.add_element()?;
        self.conn.execute(
            "INSERT INTO edge (id, type, source_node_id, target_node_id) VALUES (?1, ?2, ?3, ?4)",
            params![id, kind.to_i32(), source_node_id, target_node_id],
        )?;
        Ok(id)
    }

    pub fn add_local_symbol(&self, name: &str) -> Result<i64> {
        let existing: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM local_symbol WHERE name = ?1 LIMIT 1",
                [name],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(id) = existing {
            return Ok(id);
        }

        let id = self.add_element()?;
        self.conn.execute(
            "INSERT INTO local_symbol (id, name) VALUES (?1, ?2)",
            params![id, name],
        )?;
        Ok(id)
    }

    /// Find or create a source location with this exact span and kind
    pub fn add_source_location(
        &self,
        file_id: i64,
        start_line: u32,
        start_column: u32,
        end_line: u32,
        end_column: u32,
        kind: LocationKind,
    ) -> Result<i64> {
        let existing: Option<i64> = self
            .conn
            .query_row(
                r#"
                SELECT id FROM source_location
                WHERE file_node_id = ?1 AND start_line = ?2 AND start_column = ?3
                  AND end_line = ?4 AND end_column = ?5 AND type = ?6
                LIMIT 1
                "#,
                params![file_id, start_line, start_column, end_line, end_column, kind.to_i32()],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(id) = existing {
            return Ok(id);
        }

        self.conn.execute(
            r#"
            INSERT INTO source_location (id, file_node_id, start_line, start_column, end_line, end_column, type)
            VALUES (NULL, ?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![file_id, start_line, start_column, end_line, end_column, kind.to_i32()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn add_occurrence(&self, element_id: i64, source_location_id: i64) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO occurrence (element_id, source_location_id) VALUES (?1, ?2)",
            params![element_id, source_location_id],
        )?;
        Ok(())
    }

    pub fn add_element_component(&self, element_id: i64, kind: i32, data: &str) -> Result<i64> {
        let existing: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM element_component WHERE element_id = ?1 AND type = ?2 AND data = ?3 LIMIT 1",
                params![element_id, kind, data],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(id) = existing {
            return Ok(id);
        }

        self.conn.execute(
            "INSERT INTO element_component (id, element_id, type, data) VALUES (NULL, ?1, ?2, ?3)",
            params![element_id, kind, data],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn add_error(&self, message: &str, fatal: bool) -> Result<i64> {
        let existing: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM error WHERE message = ?1 AND fatal = ?2 LIMIT 1",
                params![message, fatal],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(id) = existing {
            return Ok(id);
        }

        let id = self.add_element()?;
        self.conn.execute(
            "INSERT INTO error (id, message, fatal, indexed, translation_unit) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, message, fatal, true, ""],
        )?;
        Ok(id)
    }

    /// True if any node, edge, local symbol or error has this id
    pub fn element_exists(&self, element_id: i64) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM element WHERE id = ?1",
            [element_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn edge_exists(&self, edge_id: i64) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM edge WHERE id = ?1",
            [edge_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    // ========== Read-back Operations ==========

    pub fn all_nodes(&self) -> Result<Vec<StoredNode>> {
        let mut stmt = self.conn.prepare("SELECT id, type, serialized_name FROM node ORDER BY id")?;
        let nodes = stmt
            .query_map([], |row| {
                Ok(StoredNode {
                    id: row.get(0)?,
                    kind: NodeKind::from_i32(row.get(1)?),
                    serialized_name: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(nodes)
    }

    pub fn all_edges(&self) -> Result<Vec<StoredEdge>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, type, source_node_id, target_node_id FROM edge ORDER BY id")?;
        let edges = stmt
            .query_map([], |row| {
                Ok(StoredEdge {
                    id: row.get(0)?,
                    kind: EdgeKind::from_i32(row.get(1)?),
                    source_node_id: row.get(2)?,
                    target_node_id: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(edges)
    }

    pub fn all_symbols(&self) -> Result<Vec<StoredSymbol>> {
        let mut stmt = self.conn.prepare("SELECT id, definition_kind FROM symbol ORDER BY id")?;
        let symbols = stmt
            .query_map([], |row| {
                Ok(StoredSymbol {
                    id: row.get(0)?,
                    definition_kind: DefinitionKind::from_i32(row.get(1)?),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(symbols)
    }

    pub fn all_files(&self) -> Result<Vec<StoredFile>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, path, language, modification_time, indexed, complete, line_count FROM file ORDER BY id",
        )?;
        let files = stmt
            .query_map([], |row| {
                Ok(StoredFile {
                    id: row.get(0)?,
                    path: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    language: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    modification_time: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                    indexed: row.get(4)?,
                    complete: row.get(5)?,
                    line_count: row.get(6)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(files)
    }

    pub fn file_content(&self, file_id: i64) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT content FROM filecontent WHERE id = ?1",
                [file_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn all_local_symbols(&self) -> Result<Vec<StoredLocalSymbol>> {
        let mut stmt = self.conn.prepare("SELECT id, name FROM local_symbol ORDER BY id")?;
        let symbols = stmt
            .query_map([], |row| {
                Ok(StoredLocalSymbol {
                    id: row.get(0)?,
                    name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(symbols)
    }

    pub fn all_source_locations(&self) -> Result<Vec<StoredSourceLocation>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, file_node_id, start_line, start_column, end_line, end_column, type FROM source_location ORDER BY id",
        )?;
        let locations = stmt
            .query_map([], |row| self.row_to_source_location(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(locations)
    }

    /// Helper to convert a row to a StoredSourceLocation
    fn row_to_source_location(&self, row: &rusqlite::Row) -> rusqlite::Result<StoredSourceLocation> {
        let kind_code: i32 = row.get(6)?;
        let kind = LocationKind::from_i32(kind_code).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Integer, Box::new(e))
        })?;

        Ok(StoredSourceLocation {
            id: row.get(0)?,
            file_node_id: row.get(1)?,
            start_line: row.get(2)?,
            start_column: row.get(3)?,
            end_line: row.get(4)?,
            end_column: row.get(5)?,
            kind,
        })
    }

    pub fn all_occurrences(&self) -> Result<Vec<StoredOccurrence>> {
        let mut stmt = self.conn.prepare(
            "SELECT element_id, source_location_id FROM occurrence ORDER BY element_id, source_location_id",
        )?;
        let occurrences = stmt
            .query_map([], |row| {
                Ok(StoredOccurrence {
                    element_id: row.get(0)?,
                    source_location_id: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(occurrences)
    }

    pub fn all_element_components(&self) -> Result<Vec<StoredElementComponent>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, element_id, type, data FROM element_component ORDER BY id")?;
        let components = stmt
            .query_map([], |row| {
                Ok(StoredElementComponent {
                    id: row.get(0)?,
                    element_id: row.get(1)?,
                    kind: row.get(2)?,
                    data: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(components)
    }

    pub fn all_errors(&self) -> Result<Vec<StoredError>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, message, fatal, indexed, translation_unit FROM error ORDER BY id")?;
        let errors = stmt
            .query_map([], |row| {
                Ok(StoredError {
                    id: row.get(0)?,
                    message: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    fatal: row.get(2)?,
                    indexed: row.get(3)?,
                    translation_unit: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(errors)
    }

    fn count(&self, table: &str) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        Ok(DbStats {
            nodes: self.count("node")?,
            edges: self.count("edge")?,
            symbols: self.count("symbol")?,
            files: self.count("file")?,
            source_locations: self.count("source_location")?,
            local_symbols: self.count("local_symbol")?,
            errors: self.count("error")?,
        })
    }
}

/// File row to store for an already recorded file node
#[derive(Debug, Clone)]
pub struct NewFile<'a> {
    pub node_id: i64,
    pub path: &'a str,
    pub modification_time: &'a str,
    pub line_count: usize,
    pub content: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredNode {
    pub id: i64,
    pub kind: NodeKind,
    pub serialized_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEdge {
    pub id: i64,
    pub kind: EdgeKind,
    pub source_node_id: i64,
    pub target_node_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSymbol {
    pub id: i64,
    pub definition_kind: DefinitionKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub id: i64,
    pub path: String,
    pub language: String,
    pub modification_time: String,
    pub indexed: bool,
    pub complete: bool,
    pub line_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredLocalSymbol {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSourceLocation {
    pub id: i64,
    pub file_node_id: i64,
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
    pub kind: LocationKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredOccurrence {
    pub element_id: i64,
    pub source_location_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredElementComponent {
    pub id: i64,
    pub element_id: i64,
    pub kind: i32,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredError {
    pub id: i64,
    pub message: String,
    pub fatal: bool,
    pub indexed: bool,
    pub translation_unit: String,
}

/// Database statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DbStats {
    pub nodes: usize,
    pub edges: usize,
    pub symbols: usize,
    pub files: usize,
    pub source_locations: usize,
    pub local_symbols: usize,
    pub errors: usize,
}

impl DbStats {
    /// Label/value pairs in display order
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Nodes", self.nodes.to_string()),
            ("Edges", self.edges.to_string()),
            ("Symbols", self.symbols.to_string()),
            ("Files", self.files.to_string()),
            ("Source locations", self.source_locations.to_string()),
            ("Local symbols", self.local_symbols.to_string()),
            ("Errors", self.errors.to_string()),
        ]
    }
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        for (label, value) in self.rows() {
            writeln!(f, "  {}: {}", label, value)?;
        }
        Ok(())
    }
}
