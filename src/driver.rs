//! Example driver - records a small Python class through an [`IndexWriter`]
//!
//! Takes `--database-file-path=`, `--source-file-path=` and an optional
//! `--database-version=`, then records one file, three symbols and one
//! reference:
//!
//! ```python
//! class MyType:
//!
//!     my_member = 0
//!
//!     def my_method(self):
//!         return self.my_member
//! ```

use std::path::PathBuf;

use crate::config::{ensure_db_dir, SrctrlConfig};
use crate::edge::ReferenceKind;
use crate::location::SourceRange;
use crate::name::NameHierarchy;
use crate::symbol::{DefinitionKind, SymbolKind};
use crate::ui;
use crate::IndexWriter;

pub const DEFAULT_LANGUAGE: &str = "python";

const DATABASE_FILE_PATH: &str = "database-file-path";
const SOURCE_FILE_PATH: &str = "source-file-path";
const DATABASE_VERSION: &str = "database-version";

/// Errors that end a driver run with a non-zero exit status
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("Invalid parameter:{0}")]
    InvalidParameter(String),

    #[error("Missing parameter:{0}")]
    MissingParameter(&'static str),

    #[error("ERROR: Only supports database version: {supported}. Requested version: {requested}")]
    VersionMismatch { supported: i32, requested: i32 },

    #[error("ERROR: {0}")]
    Writer(String),

    #[error("ERROR: {0}")]
    InvalidName(String),
}

/// Parameters as given on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    pub database_file_path: Option<String>,
    pub source_file_path: Option<String>,
    pub database_version: Option<i32>,
    /// Raw value of a `--database-version` that was not a number
    pub invalid_version: Option<String>,
}

/// Fully resolved inputs of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub database_file_path: PathBuf,
    pub source_file_path: String,
    /// 0 means no version was requested
    pub database_version: i32,
    pub language: String,
}

/// Parse `--key=value` arguments (program name excluded).
///
/// Stops at the first malformed or unknown argument; an empty value counts
/// as malformed. A version that is not
/// a number is remembered in `invalid_version` and treated as 0.
pub fn parse_args<I, S>(args: I) -> Result<Params, DriverError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut params = Params::default();

    for arg in args {
        let arg = arg.as_ref();
        let Some((key, value)) = arg.split_once('=').filter(|(_, value)| !value.is_empty()) else {
            return Err(DriverError::InvalidParameter(arg.to_string()));
        };
        let Some(key) = key.strip_prefix("--") else {
            return Err(DriverError::InvalidParameter(key.to_string()));
        };

        match key {
            DATABASE_FILE_PATH => params.database_file_path = Some(value.to_string()),
            SOURCE_FILE_PATH => params.source_file_path = Some(value.replace('\\', "/")),
            DATABASE_VERSION => match value.trim().parse::<i32>() {
                Ok(version) => {
                    params.database_version = Some(version);
                    params.invalid_version = None;
                }
                Err(_) => {
                    params.database_version = Some(0);
                    params.invalid_version = Some(value.to_string());
                }
            },
            other => return Err(DriverError::InvalidParameter(other.to_string())),
        }
    }

    Ok(params)
}

impl Params {
    /// Fill gaps from the config file and require both paths
    pub fn resolve(self, config: Option<&SrctrlConfig>) -> Result<Invocation, DriverError> {
        let defaults = config.cloned().unwrap_or_default();

        let database_file_path = self
            .database_file_path
            .or(defaults.database_file_path)
            .ok_or(DriverError::MissingParameter(DATABASE_FILE_PATH))?;
        let source_file_path = self
            .source_file_path
            .or_else(|| defaults.source_file_path.map(|p| p.replace('\\', "/")))
            .ok_or(DriverError::MissingParameter(SOURCE_FILE_PATH))?;

        Ok(Invocation {
            database_file_path: PathBuf::from(database_file_path),
            source_file_path,
            database_version: self.database_version.or(defaults.database_version).unwrap_or(0),
            language: defaults.language.unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        })
    }
}

/// A symbol of the sample class with its locations (line, column pairs)
struct SampleSymbol {
    name_json: &'static str,
    kind: SymbolKind,
    location: Span,
    scope: Option<Span>,
}

const MY_TYPE: SampleSymbol = SampleSymbol {
    name_json: r#"{ "name_delimiter": ".", "name_elements": [
        { "prefix": "", "name": "MyType", "postfix": "" } ] }"#,
    kind: SymbolKind::Class,
    location: (2, 7, 2, 12),
    scope: Some((2, 1, 7, 1)),
};

const MY_MEMBER: SampleSymbol = SampleSymbol {
    name_json: r#"{ "name_delimiter": ".", "name_elements": [
        { "prefix": "", "name": "MyType", "postfix": "" },
        { "prefix": "", "name": "my_member", "postfix": "" } ] }"#,
    kind: SymbolKind::Field,
    location: (4, 2, 4, 10),
    scope: None,
};

const MY_METHOD: SampleSymbol = SampleSymbol {
    name_json: r#"{ "name_delimiter": ".", "name_elements": [
        { "prefix": "", "name": "MyType", "postfix": "" },
        { "prefix": "", "name": "my_method", "postfix": "" } ] }"#,
    kind: SymbolKind::Method,
    location: (6, 6, 6, 14),
    scope: Some((6, 1, 7, 1)),
};

const MEMBER_USAGE_LOCATION: Span = (7, 10, 7, 18);

type Span = (u32, u32, u32, u32);

fn range(file_id: i64, (start_line, start_column, end_line, end_column): Span) -> SourceRange {
    SourceRange::new(file_id, start_line, start_column, end_line, end_column)
}

/// Run a writer call, reporting the writer's last error on failure
fn attempt<W, T, F>(writer: &mut W, op: F) -> Result<T, DriverError>
where
    W: IndexWriter,
    F: FnOnce(&mut W) -> crate::Result<T>,
{
    op(&mut *writer).map_err(|e| {
        let message = writer.last_error().map(str::to_string);
        DriverError::Writer(message.unwrap_or_else(|| e.to_string()))
    })
}

/// Record the sample into the database described by `invocation`.
///
/// Once the database is open it is closed on every path. When both the run
/// and the close fail, the run's error is returned.
pub fn run<W: IndexWriter>(writer: &mut W, invocation: &Invocation) -> Result<(), DriverError> {
    let supported = writer.supported_database_version();
    ui::header("srctrl example driver");
    ui::status("Supported database version", &supported.to_string());

    let requested = invocation.database_version;
    if requested > 0 && requested != supported {
        return Err(DriverError::VersionMismatch { supported, requested });
    }

    if let Err(e) = ensure_db_dir(&invocation.database_file_path) {
        tracing::warn!("Unable to create database directory: {}", e);
    }

    writer.clear_last_error();
    attempt(writer, |w| w.open(&invocation.database_file_path))?;
    tracing::info!("Opened {}", invocation.database_file_path.display());

    let recorded = record_sample(writer, invocation);
    let closed = attempt(writer, |w| w.close());

    match (recorded, closed) {
        (Ok(()), Ok(())) => {
            ui::success("done");
            Ok(())
        }
        (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
        (Err(e), Err(close_error)) => {
            tracing::warn!("Failed to close database after error: {}", close_error);
            Err(e)
        }
    }
}

fn record_sample<W>(writer: &mut W, invocation: &Invocation) -> Result<(), DriverError>
where
    W: IndexWriter,
{
    ui::phase("Clearing loaded database now...");
    attempt(writer, |w| w.clear())?;

    ui::phase("start indexing");
    attempt(writer, |w| w.begin_transaction())?;

    let file_id = attempt(writer, |w| w.record_file(&invocation.source_file_path))?;
    attempt(writer, |w| w.record_file_language(file_id, &invocation.language))?;

    let _my_type_id = record_sample_symbol(writer, file_id, &MY_TYPE)?;
    let member_id = record_sample_symbol(writer, file_id, &MY_MEMBER)?;
    let method_id = record_sample_symbol(writer, file_id, &MY_METHOD)?;

    let reference_id =
        attempt(writer, |w| w.record_reference(method_id, member_id, ReferenceKind::Usage))?;
    attempt(writer, |w| {
        w.record_reference_location(reference_id, range(file_id, MEMBER_USAGE_LOCATION))
    })?;

    attempt(writer, |w| w.commit_transaction())?;
    if let Some(message) = writer.last_error() {
        return Err(DriverError::Writer(message.to_string()));
    }
    Ok(())
}

fn record_sample_symbol<W: IndexWriter>(
    writer: &mut W,
    file_id: i64,
    symbol: &SampleSymbol,
) -> Result<i64, DriverError> {
    let name = NameHierarchy::from_json(symbol.name_json)
        .map_err(|e| DriverError::InvalidName(e.to_string()))?;
    tracing::debug!("Recording {}", name);

    let id = attempt(writer, |w| w.record_symbol(&name))?;
    attempt(writer, |w| w.record_symbol_definition_kind(id, DefinitionKind::Explicit))?;
    attempt(writer, |w| w.record_symbol_kind(id, symbol.kind))?;
    attempt(writer, |w| w.record_symbol_location(id, range(file_id, symbol.location)))?;
    if let Some(scope) = symbol.scope {
        attempt(writer, |w| w.record_symbol_scope_location(id, range(file_id, scope)))?;
    }
    Ok(id)
}

/// Process exit status for a run outcome
pub fn exit_code(result: &Result<(), DriverError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(_) => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStore;
    use crate::{EdgeKind, Error, NodeKind, SqliteWriter, SUPPORTED_DATABASE_VERSION};
    use std::path::Path;

    /// Writer that logs every call and can be told to fail one of them
    #[derive(Default)]
    struct RecordingWriter {
        calls: Vec<&'static str>,
        fail_on: Option<&'static str>,
        fail_close: bool,
        next_id: i64,
        last_error: Option<String>,
    }

    impl RecordingWriter {
        fn failing_on(call: &'static str) -> Self {
            Self { fail_on: Some(call), ..Self::default() }
        }

        fn call(&mut self, name: &'static str) -> crate::Result<()> {
            self.calls.push(name);
            let fails = self.fail_on == Some(name) || (name == "close" && self.fail_close);
            if fails {
                let error = Error::Io(std::io::Error::other(format!("{} failed", name)));
                self.last_error = Some(error.to_string());
                return Err(error);
            }
            Ok(())
        }

        fn id(&mut self, name: &'static str) -> crate::Result<i64> {
            self.call(name)?;
            self.next_id += 1;
            Ok(self.next_id)
        }
    }

    impl IndexWriter for RecordingWriter {
        fn supported_database_version(&self) -> i32 {
            SUPPORTED_DATABASE_VERSION
        }
        fn last_error(&self) -> Option<&str> {
            self.last_error.as_deref()
        }
        fn clear_last_error(&mut self) {
            self.last_error = None;
        }
        fn open(&mut self, _path: &Path) -> crate::Result<()> {
            self.call("open")
        }
        fn close(&mut self) -> crate::Result<()> {
            self.call("close")
        }
        fn clear(&mut self) -> crate::Result<()> {
            self.call("clear")
        }
        fn begin_transaction(&mut self) -> crate::Result<()> {
            self.call("begin_transaction")
        }
        fn commit_transaction(&mut self) -> crate::Result<()> {
            self.call("commit_transaction")
        }
        fn rollback_transaction(&mut self) -> crate::Result<()> {
            self.call("rollback_transaction")
        }
        fn record_file(&mut self, _path: &str) -> crate::Result<i64> {
            self.id("record_file")
        }
        fn record_file_language(&mut self, _file_id: i64, _language: &str) -> crate::Result<()> {
            self.call("record_file_language")
        }
        fn record_symbol(&mut self, _name: &NameHierarchy) -> crate::Result<i64> {
            self.id("record_symbol")
        }
        fn record_symbol_definition_kind(&mut self, _id: i64, _kind: DefinitionKind) -> crate::Result<()> {
            self.call("record_symbol_definition_kind")
        }
        fn record_symbol_kind(&mut self, _id: i64, _kind: SymbolKind) -> crate::Result<()> {
            self.call("record_symbol_kind")
        }
        fn record_symbol_location(&mut self, _id: i64, _location: SourceRange) -> crate::Result<()> {
            self.call("record_symbol_location")
        }
        fn record_symbol_scope_location(&mut self, _id: i64, _location: SourceRange) -> crate::Result<()> {
            self.call("record_symbol_scope_location")
        }
        fn record_symbol_signature_location(&mut self, _id: i64, _location: SourceRange) -> crate::Result<()> {
            self.call("record_symbol_signature_location")
        }
        fn record_reference(&mut self, _context: i64, _referenced: i64, _kind: ReferenceKind) -> crate::Result<i64> {
            self.id("record_reference")
        }
        fn record_reference_location(&mut self, _id: i64, _location: SourceRange) -> crate::Result<()> {
            self.call("record_reference_location")
        }
    }

    fn invocation(version: i32) -> Invocation {
        Invocation {
            database_file_path: PathBuf::from("sample.srctrldb"),
            source_file_path: "sample.py".to_string(),
            database_version: version,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    #[test]
    fn test_parse_args() {
        let params = parse_args([
            "--database-file-path=out/db.srctrldb",
            "--source-file-path=C:\\src\\sample.py",
            "--database-version=25",
        ])
        .unwrap();
        assert_eq!(params.database_file_path.as_deref(), Some("out/db.srctrldb"));
        assert_eq!(params.source_file_path.as_deref(), Some("C:/src/sample.py"));
        assert_eq!(params.database_version, Some(25));
        assert!(params.invalid_version.is_none());
    }

    #[test]
    fn test_parse_args_rejects_unknown_key() {
        let err = parse_args(["--database-file-path=a", "--foo=bar"]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid parameter:foo");
    }

    #[test]
    fn test_parse_args_rejects_missing_separator() {
        let err = parse_args(["--database-file-path"]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid parameter:--database-file-path");

        let err = parse_args(["database-file-path=a"]).unwrap_err();
        assert!(matches!(err, DriverError::InvalidParameter(_)));
    }

    #[test]
    fn test_parse_args_rejects_empty_value() {
        let err = parse_args(["--database-file-path=", "--source-file-path=a.py"]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid parameter:--database-file-path=");

        let err = parse_args(["--database-version="]).unwrap_err();
        assert!(matches!(err, DriverError::InvalidParameter(arg) if arg == "--database-version="));
    }

    #[test]
    fn test_parse_args_tolerates_bad_version() {
        let params = parse_args(["--database-version=abc"]).unwrap();
        assert_eq!(params.database_version, Some(0));
        assert_eq!(params.invalid_version.as_deref(), Some("abc"));
    }

    #[test]
    fn test_resolve_requires_paths() {
        let params = parse_args(["--source-file-path=a.py"]).unwrap();
        let err = params.resolve(None).unwrap_err();
        assert_eq!(err.to_string(), "Missing parameter:database-file-path");

        let params = parse_args(["--database-file-path=a.srctrldb"]).unwrap();
        let err = params.resolve(None).unwrap_err();
        assert_eq!(err.to_string(), "Missing parameter:source-file-path");
    }

    #[test]
    fn test_resolve_uses_config_defaults() {
        let config = SrctrlConfig {
            database_file_path: Some("from_config.srctrldb".to_string()),
            source_file_path: Some("config.py".to_string()),
            database_version: Some(7),
            language: Some("cpp".to_string()),
        };

        let params = parse_args(["--source-file-path=cli.py"]).unwrap();
        let invocation = params.resolve(Some(&config)).unwrap();
        assert_eq!(invocation.database_file_path, PathBuf::from("from_config.srctrldb"));
        assert_eq!(invocation.source_file_path, "cli.py");
        assert_eq!(invocation.database_version, 7);
        assert_eq!(invocation.language, "cpp");

        let invocation = Params::default().resolve(Some(&SrctrlConfig {
            language: None,
            ..config
        }))
        .unwrap();
        assert_eq!(invocation.language, DEFAULT_LANGUAGE);
    }

    #[test]
    fn test_version_mismatch_does_not_open() {
        let mut writer = RecordingWriter::default();
        let result = run(&mut writer, &invocation(999999));
        let err = result.as_ref().unwrap_err();
        assert_eq!(
            err.to_string(),
            format!(
                "ERROR: Only supports database version: {}. Requested version: 999999",
                SUPPORTED_DATABASE_VERSION
            )
        );
        assert!(writer.calls.is_empty());
        assert_eq!(exit_code(&result), 1);
    }

    #[test]
    fn test_version_mismatch_leaves_filesystem_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let target_dir = dir.path().join("new").join("dir");
        let invocation = Invocation {
            database_file_path: target_dir.join("x.srctrldb"),
            ..invocation(999999)
        };

        let mut writer = SqliteWriter::new();
        assert!(matches!(
            run(&mut writer, &invocation),
            Err(DriverError::VersionMismatch { requested: 999999, .. })
        ));
        assert!(!dir.path().join("new").exists());
    }

    #[test]
    fn test_run_creates_database_directory() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("out").join("nested").join("x.srctrldb");
        let invocation = Invocation {
            database_file_path: db_path.clone(),
            ..invocation(0)
        };

        let mut writer = SqliteWriter::new();
        run(&mut writer, &invocation).unwrap();
        assert!(db_path.is_file());
    }

    #[test]
    fn test_run_calls_writer_in_order() {
        let mut writer = RecordingWriter::default();
        let result = run(&mut writer, &invocation(SUPPORTED_DATABASE_VERSION));
        assert!(result.is_ok());
        assert_eq!(exit_code(&result), 0);

        assert_eq!(&writer.calls[..5], &["open", "clear", "begin_transaction", "record_file", "record_file_language"]);
        assert_eq!(writer.calls.iter().filter(|c| **c == "record_symbol").count(), 3);
        assert_eq!(writer.calls.iter().filter(|c| **c == "record_symbol_scope_location").count(), 2);
        assert_eq!(
            &writer.calls[writer.calls.len() - 4..],
            &["record_reference", "record_reference_location", "commit_transaction", "close"]
        );
    }

    #[test]
    fn test_failure_after_open_still_closes() {
        let mut writer = RecordingWriter::failing_on("record_symbol_kind");
        let result = run(&mut writer, &invocation(0));
        assert_eq!(result.unwrap_err().to_string(), "ERROR: IO error: record_symbol_kind failed");
        assert_eq!(writer.calls.last(), Some(&"close"));
        assert!(!writer.calls.contains(&"commit_transaction"));
    }

    #[test]
    fn test_close_failure_keeps_first_error() {
        let mut writer = RecordingWriter::failing_on("commit_transaction");
        writer.fail_close = true;
        let err = run(&mut writer, &invocation(0)).unwrap_err();
        assert_eq!(err.to_string(), "ERROR: IO error: commit_transaction failed");
    }

    #[test]
    fn test_close_failure_is_reported() {
        let mut writer = RecordingWriter { fail_close: true, ..RecordingWriter::default() };
        let err = run(&mut writer, &invocation(0)).unwrap_err();
        assert_eq!(err.to_string(), "ERROR: IO error: close failed");
    }

    #[test]
    fn test_open_failure_skips_close() {
        let mut writer = RecordingWriter::failing_on("open");
        assert!(run(&mut writer, &invocation(0)).is_err());
        assert_eq!(writer.calls, vec!["open"]);
    }

    #[test]
    fn test_run_records_sample_into_database() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("sample.srctrldb");
        let invocation = Invocation {
            database_file_path: db_path.clone(),
            source_file_path: "path/to/sample.py".to_string(),
            database_version: SUPPORTED_DATABASE_VERSION,
            language: DEFAULT_LANGUAGE.to_string(),
        };

        let mut writer = SqliteWriter::new();
        run(&mut writer, &invocation).unwrap();
        assert!(!writer.is_open());

        let store = SqliteStore::open(&db_path).unwrap();
        let stats = store.stats().unwrap();
        assert_eq!(stats.nodes, 4);
        assert_eq!(stats.edges, 3);
        assert_eq!(stats.symbols, 3);
        assert_eq!(stats.files, 1);
        assert_eq!(stats.source_locations, 6);

        let files = store.all_files().unwrap();
        assert_eq!(files[0].path, "path/to/sample.py");
        assert_eq!(files[0].language, "python");

        let nodes = store.all_nodes().unwrap();
        let kinds: Vec<NodeKind> = nodes.iter().map(|n| n.kind).collect();
        assert_eq!(kinds, vec![NodeKind::File, NodeKind::Class, NodeKind::Field, NodeKind::Method]);

        let edges = store.all_edges().unwrap();
        let usage = edges.iter().find(|e| e.kind == EdgeKind::Usage).unwrap();
        assert_eq!((usage.source_node_id, usage.target_node_id), (nodes[3].id, nodes[2].id));
        assert_eq!(edges.iter().filter(|e| e.kind == EdgeKind::Member).count(), 2);

        // running again replaces the previous contents
        run(&mut writer, &invocation).unwrap();
        let store = SqliteStore::open(&db_path).unwrap();
        assert_eq!(store.stats().unwrap().nodes, 4);
    }
}
