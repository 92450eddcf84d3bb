//! Name hierarchies - structured, delimiter-separated symbol names
//!
//! Clients describe a symbol by its chain of enclosing names, e.g.
//! `MyType` → `my_method`, together with the delimiter used to print it.
//! The JSON form is what indexers pass around:
//!
//! ```json
//! { "name_delimiter": ".", "name_elements": [
//!     { "prefix": "", "name": "MyType", "postfix": "" },
//!     { "prefix": "", "name": "my_method", "postfix": "" } ] }
//! ```
//!
//! The database form (`node.serialized_name`) uses tab-escaped separators:
//! `<delimiter>\tm<name>\ts<prefix>\tp<postfix>\tn<name>...`

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const META_DELIMITER: &str = "\tm";
const NAME_DELIMITER: &str = "\tn";
const PARTS_DELIMITER: &str = "\ts";
const SIGNATURE_DELIMITER: &str = "\tp";

/// One level of a name hierarchy.
///
/// `prefix` and `postfix` carry signature decorations such as a return type
/// or a parameter list; they are shown around `name` but are not part of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NameElement {
    pub prefix: String,
    pub name: String,
    pub postfix: String,
}

impl NameElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_signature(prefix: impl Into<String>, name: impl Into<String>, postfix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            name: name.into(),
            postfix: postfix.into(),
        }
    }
}

/// Fully qualified name of a symbol, outermost element first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NameHierarchy {
    pub name_delimiter: String,
    pub name_elements: Vec<NameElement>,
}

impl NameHierarchy {
    pub fn new(name_delimiter: impl Into<String>) -> Self {
        Self {
            name_delimiter: name_delimiter.into(),
            name_elements: Vec::new(),
        }
    }

    /// Build a hierarchy from plain names without signature parts
    pub fn from_names<I, S>(name_delimiter: impl Into<String>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name_delimiter: name_delimiter.into(),
            name_elements: names.into_iter().map(NameElement::new).collect(),
        }
    }

    pub fn push(mut self, element: NameElement) -> Self {
        self.name_elements.push(element);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name_elements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.name_elements.len()
    }

    /// Parse the JSON name descriptor.
    ///
    /// Fields that are missing or not strings are left empty, and a missing
    /// `name_elements` array yields an empty hierarchy. Only a document that
    /// is not valid JSON is an error.
    pub fn from_json(json: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(json)?;

        let string_field = |value: &Value, key: &str| -> String {
            value.get(key).and_then(Value::as_str).unwrap_or_default().to_string()
        };

        let name_elements = root
            .get("name_elements")
            .and_then(Value::as_array)
            .map(|elements| {
                elements
                    .iter()
                    .map(|element| NameElement {
                        prefix: string_field(element, "prefix"),
                        name: string_field(element, "name"),
                        postfix: string_field(element, "postfix"),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            name_delimiter: string_field(&root, "name_delimiter"),
            name_elements,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(Error::from)
    }

    /// Serialized form stored in `node.serialized_name`
    pub fn serialize_for_database(&self) -> String {
        let elements: Vec<String> = self
            .name_elements
            .iter()
            .map(|e| format!("{}{}{}{}{}", e.name, PARTS_DELIMITER, e.prefix, SIGNATURE_DELIMITER, e.postfix))
            .collect();
        format!("{}{}{}", self.name_delimiter, META_DELIMITER, elements.join(NAME_DELIMITER))
    }

    /// Hierarchies for every prefix of this one, outermost first.
    ///
    /// Recording `A.B.C` stores nodes for `A`, `A.B` and `A.B.C`.
    pub fn prefixes(&self) -> impl Iterator<Item = NameHierarchy> + '_ {
        (1..=self.name_elements.len()).map(move |len| NameHierarchy {
            name_delimiter: self.name_delimiter.clone(),
            name_elements: self.name_elements[..len].to_vec(),
        })
    }

    /// Names joined by the delimiter, without signature parts
    pub fn display_name(&self) -> String {
        self.name_elements
            .iter()
            .map(|e| e.name.as_str())
            .collect::<Vec<_>>()
            .join(&self.name_delimiter)
    }
}

impl std::fmt::Display for NameHierarchy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
