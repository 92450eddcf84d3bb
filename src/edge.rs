//! Edge types - relationships between recorded nodes
//!
//! Clients record references with a `ReferenceKind`; the writer stores them
//! as edges with the matching `EdgeKind` code. `EdgeKind::Member` has no
//! reference counterpart: member edges are created implicitly when a name
//! hierarchy with more than one element is recorded.

use crate::symbol::normalize_kind;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Edge type codes as stored in `edge.type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Unknown,
    /// Parent name → child name, created while recording hierarchies
    Member,
    TypeUsage,
    Usage,
    Call,
    Inheritance,
    Override,
    TemplateArgument,
    TypeArgument,
    TemplateDefaultArgument,
    TemplateSpecialization,
    TemplateMemberSpecialization,
    Include,
    Import,
    Aggregation,
    MacroUsage,
    AnnotationUsage,
}

impl EdgeKind {
    pub fn all() -> &'static [EdgeKind] {
        &[
            EdgeKind::Unknown,
            EdgeKind::Member,
            EdgeKind::TypeUsage,
            EdgeKind::Usage,
            EdgeKind::Call,
            EdgeKind::Inheritance,
            EdgeKind::Override,
            EdgeKind::TemplateArgument,
            EdgeKind::TypeArgument,
            EdgeKind::TemplateDefaultArgument,
            EdgeKind::TemplateSpecialization,
            EdgeKind::TemplateMemberSpecialization,
            EdgeKind::Include,
            EdgeKind::Import,
            EdgeKind::Aggregation,
            EdgeKind::MacroUsage,
            EdgeKind::AnnotationUsage,
        ]
    }

    /// Integer stored in `edge.type`: 0 for unknown, otherwise a single bit.
    pub fn to_i32(self) -> i32 {
        match self {
            EdgeKind::Unknown => 0,
            other => 1 << (other as i32 - 1),
        }
    }

    pub fn from_i32(v: i32) -> Self {
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.to_i32() == v)
            .unwrap_or(EdgeKind::Unknown)
    }
}

/// Kind of a reference recorded between two symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    TypeUsage,
    Usage,
    Call,
    Inheritance,
    Override,
    TemplateArgument,
    TypeArgument,
    TemplateDefaultArgument,
    TemplateSpecialization,
    TemplateMemberSpecialization,
    Include,
    Import,
    MacroUsage,
    AnnotationUsage,
}

impl ReferenceKind {
    /// Get the string representation of the reference kind
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceKind::TypeUsage => "type_usage",
            ReferenceKind::Usage => "usage",
            ReferenceKind::Call => "call",
            ReferenceKind::Inheritance => "inheritance",
            ReferenceKind::Override => "override",
            ReferenceKind::TemplateArgument => "template_argument",
            ReferenceKind::TypeArgument => "type_argument",
            ReferenceKind::TemplateDefaultArgument => "template_default_argument",
            ReferenceKind::TemplateSpecialization => "template_specialization",
            ReferenceKind::TemplateMemberSpecialization => "template_member_specialization",
            ReferenceKind::Include => "include",
            ReferenceKind::Import => "import",
            ReferenceKind::MacroUsage => "macro_usage",
            ReferenceKind::AnnotationUsage => "annotation_usage",
        }
    }

    /// Get all reference kinds
    pub fn all() -> &'static [ReferenceKind] {
        &[
            ReferenceKind::TypeUsage,
            ReferenceKind::Usage,
            ReferenceKind::Call,
            ReferenceKind::Inheritance,
            ReferenceKind::Override,
            ReferenceKind::TemplateArgument,
            ReferenceKind::TypeArgument,
            ReferenceKind::TemplateDefaultArgument,
            ReferenceKind::TemplateSpecialization,
            ReferenceKind::TemplateMemberSpecialization,
            ReferenceKind::Include,
            ReferenceKind::Import,
            ReferenceKind::MacroUsage,
            ReferenceKind::AnnotationUsage,
        ]
    }

    /// Edge type the reference is stored as
    pub fn to_edge_kind(self) -> EdgeKind {
        match self {
            ReferenceKind::TypeUsage => EdgeKind::TypeUsage,
            ReferenceKind::Usage => EdgeKind::Usage,
            ReferenceKind::Call => EdgeKind::Call,
            ReferenceKind::Inheritance => EdgeKind::Inheritance,
            ReferenceKind::Override => EdgeKind::Override,
            ReferenceKind::TemplateArgument => EdgeKind::TemplateArgument,
            ReferenceKind::TypeArgument => EdgeKind::TypeArgument,
            ReferenceKind::TemplateDefaultArgument => EdgeKind::TemplateDefaultArgument,
            ReferenceKind::TemplateSpecialization => EdgeKind::TemplateSpecialization,
            ReferenceKind::TemplateMemberSpecialization => EdgeKind::TemplateMemberSpecialization,
            ReferenceKind::Include => EdgeKind::Include,
            ReferenceKind::Import => EdgeKind::Import,
            ReferenceKind::MacroUsage => EdgeKind::MacroUsage,
            ReferenceKind::AnnotationUsage => EdgeKind::AnnotationUsage,
        }
    }
}

impl FromStr for ReferenceKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize_kind(s, "reference_");
        ReferenceKind::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| crate::Error::InvalidKind { kind: "reference kind", value: s.to_string() })
    }
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
