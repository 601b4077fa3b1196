//! Non-fatal diagnostics accumulated while parsing.

use super::position::Position;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// An element outside the known schema. Kept verbatim in extensions.
    UnknownElement,
    /// An attribute no rule claims. Kept verbatim in extensions.
    UnknownAttribute,
    /// A second value for a single-valued field. The first one is kept.
    DuplicateField,
}

/// A diagnostic that never interrupts iteration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseWarning {
    pub kind: WarningKind,
    /// Element, attribute or field name as written.
    pub name: String,
    /// Enclosing element, if any.
    pub parent: Option<String>,
    pub position: Position,
}

impl ParseWarning {
    pub(crate) fn new(
        kind: WarningKind,
        name: impl Into<String>,
        parent: Option<&str>,
        position: Position,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            parent: parent.map(str::to_string),
            position,
        }
    }
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            WarningKind::UnknownElement => write!(f, "unknown element <{}>", self.name)?,
            WarningKind::UnknownAttribute => write!(f, "unknown attribute {:?}", self.name)?,
            WarningKind::DuplicateField => write!(f, "duplicate field {:?} ignored", self.name)?,
        }
        if let Some(parent) = &self.parent {
            write!(f, " in <{parent}>")?;
        }
        write!(f, " at {}", self.position)
    }
}
