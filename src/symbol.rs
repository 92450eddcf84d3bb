//! Symbol kinds - what a recorded name stands for
//!
//! Three related enums live here:
//! - `DefinitionKind`: whether a symbol was explicitly defined in indexed code
//! - `SymbolKind`: the kind a client assigns to a symbol
//! - `NodeKind`: the bit-flag code stored in the `node.type` column
//!
//! Clients only ever deal with `SymbolKind`; the writer converts it to a
//! `NodeKind` before storing it.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Strips an optional `PREFIX_` and normalizes case and separators so that
/// `SYMBOL_BUILTIN_TYPE`, `builtin-type` and `builtin_type` compare equal.
pub(crate) fn normalize_kind(s: &str, prefix: &str) -> String {
    let lower = s.trim().to_lowercase().replace('-', "_");
    match lower.strip_prefix(prefix) {
        Some(rest) => rest.to_string(),
        None => lower,
    }
}

/// Whether a symbol's definition was seen in the indexed source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefinitionKind {
    /// Symbol exists but its definition is not part of the indexed code
    Implicit,
    /// Symbol is defined in the indexed code
    Explicit,
}

impl DefinitionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DefinitionKind::Implicit => "implicit",
            DefinitionKind::Explicit => "explicit",
        }
    }

    /// Integer stored in `symbol.definition_kind`
    pub fn to_i32(self) -> i32 {
        match self {
            DefinitionKind::Implicit => 0,
            DefinitionKind::Explicit => 1,
        }
    }

    /// Unknown codes read back as explicit.
    pub fn from_i32(v: i32) -> Self {
        if v == 0 {
            DefinitionKind::Implicit
        } else {
            DefinitionKind::Explicit
        }
    }

    pub fn all() -> &'static [DefinitionKind] {
        &[DefinitionKind::Implicit, DefinitionKind::Explicit]
    }
}

impl FromStr for DefinitionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_kind(s, "definition_").as_str() {
            "implicit" => Ok(DefinitionKind::Implicit),
            "explicit" => Ok(DefinitionKind::Explicit),
            _ => Err(Error::InvalidKind { kind: "definition kind", value: s.to_string() }),
        }
    }
}

impl std::fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Node type codes as stored in the database. Each kind is a distinct bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Unknown,
    Type,
    BuiltinType,
    Namespace,
    Package,
    Struct,
    Class,
    Interface,
    Annotation,
    GlobalVariable,
    Field,
    Function,
    Method,
    Enum,
    EnumConstant,
    Typedef,
    TemplateParameter,
    TypeParameter,
    File,
    Macro,
    Union,
}

impl NodeKind {
    pub fn all() -> &'static [NodeKind] {
        &[
            NodeKind::Unknown,
            NodeKind::Type,
            NodeKind::BuiltinType,
            NodeKind::Namespace,
            NodeKind::Package,
            NodeKind::Struct,
            NodeKind::Class,
            NodeKind::Interface,
            NodeKind::Annotation,
            NodeKind::GlobalVariable,
            NodeKind::Field,
            NodeKind::Function,
            NodeKind::Method,
            NodeKind::Enum,
            NodeKind::EnumConstant,
            NodeKind::Typedef,
            NodeKind::TemplateParameter,
            NodeKind::TypeParameter,
            NodeKind::File,
            NodeKind::Macro,
            NodeKind::Union,
        ]
    }

    /// Integer stored in `node.type`
    pub fn to_i32(self) -> i32 {
        // Declaration order is the bit position.
        1 << (self as i32)
    }

    /// Unrecognized codes read back as `Unknown`.
    pub fn from_i32(v: i32) -> Self {
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.to_i32() == v)
            .unwrap_or(NodeKind::Unknown)
    }
}

/// Kind of a recorded symbol, as chosen by the indexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Type,
    BuiltinType,
    Module,
    Namespace,
    Package,
    Struct,
    Class,
    Interface,
    Annotation,
    GlobalVariable,
    Field,
    Function,
    Method,
    Enum,
    EnumConstant,
    Typedef,
    TemplateParameter,
    TypeParameter,
    Macro,
    Union,
}

impl SymbolKind {
    /// Get the string representation of the symbol kind
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Type => "type",
            SymbolKind::BuiltinType => "builtin_type",
            SymbolKind::Module => "module",
            SymbolKind::Namespace => "namespace",
            SymbolKind::Package => "package",
            SymbolKind::Struct => "struct",
            SymbolKind::Class => "class",
            SymbolKind::Interface => "interface",
            SymbolKind::Annotation => "annotation",
            SymbolKind::GlobalVariable => "global_variable",
            SymbolKind::Field => "field",
            SymbolKind::Function => "function",
            SymbolKind::Method => "method",
            SymbolKind::Enum => "enum",
            SymbolKind::EnumConstant => "enum_constant",
            SymbolKind::Typedef => "typedef",
            SymbolKind::TemplateParameter => "template_parameter",
            SymbolKind::TypeParameter => "type_parameter",
            SymbolKind::Macro => "macro",
            SymbolKind::Union => "union",
        }
    }

    /// Get all symbol kinds
    pub fn all() -> &'static [SymbolKind] {
        &[
            SymbolKind::Type,
            SymbolKind::BuiltinType,
            SymbolKind::Module,
            SymbolKind::Namespace,
            SymbolKind::Package,
            SymbolKind::Struct,
            SymbolKind::Class,
            SymbolKind::Interface,
            SymbolKind::Annotation,
            SymbolKind::GlobalVariable,
            SymbolKind::Field,
            SymbolKind::Function,
            SymbolKind::Method,
            SymbolKind::Enum,
            SymbolKind::EnumConstant,
            SymbolKind::Typedef,
            SymbolKind::TemplateParameter,
            SymbolKind::TypeParameter,
            SymbolKind::Macro,
            SymbolKind::Union,
        ]
    }

    /// Node type the symbol is stored as. Modules have no node type of their own.
    pub fn to_node_kind(self) -> NodeKind {
        match self {
            SymbolKind::Type => NodeKind::Type,
            SymbolKind::BuiltinType => NodeKind::BuiltinType,
            SymbolKind::Module => NodeKind::Unknown,
            SymbolKind::Namespace => NodeKind::Namespace,
            SymbolKind::Package => NodeKind::Package,
            SymbolKind::Struct => NodeKind::Struct,
            SymbolKind::Class => NodeKind::Class,
            SymbolKind::Interface => NodeKind::Interface,
            SymbolKind::Annotation => NodeKind::Annotation,
            SymbolKind::GlobalVariable => NodeKind::GlobalVariable,
            SymbolKind::Field => NodeKind::Field,
            SymbolKind::Function => NodeKind::Function,
            SymbolKind::Method => NodeKind::Method,
            SymbolKind::Enum => NodeKind::Enum,
            SymbolKind::EnumConstant => NodeKind::EnumConstant,
            SymbolKind::Typedef => NodeKind::Typedef,
            SymbolKind::TemplateParameter => NodeKind::TemplateParameter,
            SymbolKind::TypeParameter => NodeKind::TypeParameter,
            SymbolKind::Macro => NodeKind::Macro,
            SymbolKind::Union => NodeKind::Union,
        }
    }
}

impl FromStr for SymbolKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = normalize_kind(s, "symbol_");
        SymbolKind::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| Error::InvalidKind { kind: "symbol kind", value: s.to_string() })
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
