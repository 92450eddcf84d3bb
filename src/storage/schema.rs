//! Database schema definitions
//!
//! Table layout follows the Sourcetrail database format so that the
//! written files open in Sourcetrail directly.

pub const CREATE_META_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS meta (
    id INTEGER,
    key TEXT,
    value TEXT,
    PRIMARY KEY(id)
)
"#;

/// Id allocator shared by nodes, edges, local symbols, errors and components
pub const CREATE_ELEMENT_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS element (
    id INTEGER,
    PRIMARY KEY(id)
)
"#;

pub const CREATE_ELEMENT_COMPONENT_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS element_component (
    id INTEGER NOT NULL,
    element_id INTEGER,
    type INTEGER,
    data TEXT,
    PRIMARY KEY(id),
    FOREIGN KEY(element_id) REFERENCES element(id) ON DELETE CASCADE
)
"#;

pub const CREATE_EDGE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS edge (
    id INTEGER NOT NULL,
    type INTEGER NOT NULL,
    source_node_id INTEGER NOT NULL,
    target_node_id INTEGER NOT NULL,
    PRIMARY KEY(id),
    FOREIGN KEY(id) REFERENCES element(id) ON DELETE CASCADE,
    FOREIGN KEY(source_node_id) REFERENCES node(id) ON DELETE CASCADE,
    FOREIGN KEY(target_node_id) REFERENCES node(id) ON DELETE CASCADE
)
"#;

pub const CREATE_NODE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS node (
    id INTEGER NOT NULL,
    type INTEGER NOT NULL,
    serialized_name TEXT,
    PRIMARY KEY(id),
    FOREIGN KEY(id) REFERENCES element(id) ON DELETE CASCADE
)
"#;

pub const CREATE_SYMBOL_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS symbol (
    id INTEGER NOT NULL,
    definition_kind INTEGER NOT NULL,
    PRIMARY KEY(id),
    FOREIGN KEY(id) REFERENCES node(id) ON DELETE CASCADE
)
"#;

pub const CREATE_FILE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS file (
    id INTEGER NOT NULL,
    path TEXT,
    language TEXT,
    modification_time TEXT,
    indexed INTEGER,
    complete INTEGER,
    line_count INTEGER,
    PRIMARY KEY(id),
    FOREIGN KEY(id) REFERENCES node(id) ON DELETE CASCADE
)
"#;

pub const CREATE_FILECONTENT_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS filecontent (
    id INTEGER,
    content TEXT,
    FOREIGN KEY(id) REFERENCES file(id) ON DELETE CASCADE ON UPDATE CASCADE
)
"#;

pub const CREATE_LOCAL_SYMBOL_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS local_symbol (
    id INTEGER NOT NULL,
    name TEXT,
    PRIMARY KEY(id),
    FOREIGN KEY(id) REFERENCES element(id) ON DELETE CASCADE
)
"#;

pub const CREATE_SOURCE_LOCATION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS source_location (
    id INTEGER NOT NULL,
    file_node_id INTEGER,
    start_line INTEGER,
    start_column INTEGER,
    end_line INTEGER,
    end_column INTEGER,
    type INTEGER,
    PRIMARY KEY(id),
    FOREIGN KEY(file_node_id) REFERENCES node(id) ON DELETE CASCADE
)
"#;

pub const CREATE_OCCURRENCE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS occurrence (
    element_id INTEGER NOT NULL,
    source_location_id INTEGER NOT NULL,
    PRIMARY KEY(element_id, source_location_id),
    FOREIGN KEY(element_id) REFERENCES element(id) ON DELETE CASCADE,
    FOREIGN KEY(source_location_id) REFERENCES source_location(id) ON DELETE CASCADE
)
"#;

pub const CREATE_COMPONENT_ACCESS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS component_access (
    node_id INTEGER NOT NULL,
    type INTEGER NOT NULL,
    PRIMARY KEY(node_id),
    FOREIGN KEY(node_id) REFERENCES node(id) ON DELETE CASCADE
)
"#;

pub const CREATE_ERROR_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS error (
    id INTEGER NOT NULL,
    message TEXT,
    fatal INTEGER NOT NULL,
    indexed INTEGER NOT NULL,
    translation_unit TEXT,
    PRIMARY KEY(id),
    FOREIGN KEY(id) REFERENCES element(id) ON DELETE CASCADE
)
"#;

pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_node_serialized_name ON node(serialized_name)",
    "CREATE INDEX IF NOT EXISTS idx_edge_source_target ON edge(source_node_id, target_node_id, type)",
    "CREATE INDEX IF NOT EXISTS idx_source_location_span ON source_location(file_node_id, start_line, start_column, end_line, end_column, type)",
];

/// Every table, in the order they are dropped on clear
pub const TABLE_NAMES: &[&str] = &[
    "meta",
    "error",
    "component_access",
    "occurrence",
    "source_location",
    "local_symbol",
    "filecontent",
    "file",
    "symbol",
    "node",
    "edge",
    "element_component",
    "element",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_META_TABLE,
        CREATE_ELEMENT_TABLE,
        CREATE_ELEMENT_COMPONENT_TABLE,
        CREATE_EDGE_TABLE,
        CREATE_NODE_TABLE,
        CREATE_SYMBOL_TABLE,
        CREATE_FILE_TABLE,
        CREATE_FILECONTENT_TABLE,
        CREATE_LOCAL_SYMBOL_TABLE,
        CREATE_SOURCE_LOCATION_TABLE,
        CREATE_OCCURRENCE_TABLE,
        CREATE_COMPONENT_ACCESS_TABLE,
        CREATE_ERROR_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
