//! Error types for parsing and serialization.

use crate::parser::Position;
use std::io;
use std::sync::Arc;

/// Malformed XML. Always terminates the parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed XML at {position}: {message}")]
pub struct StructuralError {
    pub message: String,
    pub position: Position,
}

/// A well-formed element that breaks a required-field or format invariant.
///
/// Scoped to the offending element; whether it ends the parse depends on
/// [`ValidationPolicy`](crate::ValidationPolicy).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("<{element}> at {position} has no {field}")]
    MissingField {
        element: String,
        field: &'static str,
        position: Position,
    },

    #[error("<{element}> at {position}: invalid {field}: {message}")]
    InvalidField {
        element: String,
        field: String,
        message: String,
        position: Position,
    },

    #[error("<{element}> at {position}: {message}")]
    Invariant {
        element: String,
        message: String,
        position: Position,
    },
}

impl ValidationError {
    pub fn position(&self) -> Position {
        match self {
            ValidationError::MissingField { position, .. }
            | ValidationError::InvalidField { position, .. }
            | ValidationError::Invariant { position, .. } => *position,
        }
    }

    /// Tag of the rejected element.
    pub fn element(&self) -> &str {
        match self {
            ValidationError::MissingField { element, .. }
            | ValidationError::InvalidField { element, .. }
            | ValidationError::Invariant { element, .. } => element,
        }
    }
}

/// Anything that ends a [`NetworkStream`](crate::NetworkStream).
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to read NetXML input: {0}")]
    Io(#[from] io::Error),
}

impl ParseError {
    pub(crate) fn from_xml(err: quick_xml::Error, position: Position) -> Self {
        match err {
            quick_xml::Error::Io(io) => ParseError::Io(
                Arc::try_unwrap(io).unwrap_or_else(|shared| io::Error::new(shared.kind(), shared.to_string())),
            ),
            other => StructuralError {
                message: other.to_string(),
                position,
            }
            .into(),
        }
    }

    pub(crate) fn structural(message: impl Into<String>, position: Position) -> Self {
        StructuralError {
            message: message.into(),
            position,
        }
        .into()
    }

    /// Stream position, when the error carries one.
    pub fn position(&self) -> Option<Position> {
        match self {
            ParseError::Structural(err) => Some(err.position),
            ParseError::Validation(err) => Some(err.position()),
            ParseError::Io(_) => None,
        }
    }
}

/// Failure while writing XML.
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("failed to write NetXML: {0}")]
    Io(#[from] io::Error),

    #[error("XML writer error: {0}")]
    Xml(#[from] quick_xml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_message_names_offset() {
        let err = ParseError::structural("unclosed <SSID>", Position { byte: 300, line: 12 });
        assert_eq!(
            err.to_string(),
            "malformed XML at byte 300, line 12: unclosed <SSID>"
        );
        assert_eq!(err.position(), Some(Position { byte: 300, line: 12 }));
    }

    #[test]
    fn test_validation_accessors() {
        let err = ValidationError::MissingField {
            element: "wireless-network".into(),
            field: "BSSID",
            position: Position { byte: 10, line: 2 },
        };
        assert_eq!(err.element(), "wireless-network");
        assert_eq!(err.to_string(), "<wireless-network> at byte 10, line 2 has no BSSID");
    }

    #[test]
    fn test_xml_io_errors_stay_io() {
        let io = io::Error::new(io::ErrorKind::UnexpectedEof, "truncated");
        let err = ParseError::from_xml(quick_xml::Error::Io(Arc::new(io)), Position::default());
        assert!(matches!(err, ParseError::Io(ref e) if e.kind() == io::ErrorKind::UnexpectedEof));
    }
}
