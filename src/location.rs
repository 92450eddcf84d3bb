//! Source locations - where a recorded element appears in a file

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Role of a stored source location, kept in `source_location.type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    /// The name token of a symbol or reference
    Token,
    /// Full extent of a symbol's definition
    Scope,
    /// Symbol name used as a qualifier
    Qualifier,
    LocalSymbol,
    Signature,
    AtomicRange,
    IndexerError,
    FulltextSearch,
    ScreenSearch,
    /// Reference whose target could not be resolved
    Unsolved,
}

impl LocationKind {
    pub fn all() -> &'static [LocationKind] {
        &[
            LocationKind::Token,
            LocationKind::Scope,
            LocationKind::Qualifier,
            LocationKind::LocalSymbol,
            LocationKind::Signature,
            LocationKind::AtomicRange,
            LocationKind::IndexerError,
            LocationKind::FulltextSearch,
            LocationKind::ScreenSearch,
            LocationKind::Unsolved,
        ]
    }

    pub fn to_i32(self) -> i32 {
        self as i32
    }

    pub fn from_i32(v: i32) -> Result<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.to_i32() == v)
            .ok_or_else(|| Error::InvalidKind { kind: "location kind", value: v.to_string() })
    }
}

/// A range of characters in a recorded file.
///
/// Lines and columns start at 1. The end position is inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRange {
    /// Id returned by `record_file`
    pub file_id: i64,
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl SourceRange {
    pub fn new(file_id: i64, start_line: u32, start_column: u32, end_line: u32, end_column: u32) -> Self {
        Self {
            file_id,
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }
}

impl std::fmt::Display for SourceRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.start_line, self.start_column, self.end_line, self.end_column
        )
    }
}
