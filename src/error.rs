//! Error types for xmlschema-completion
//!
//! This module defines the error types used throughout the library.
//! Schema loading failures are reported through [`Error`]; completion
//! queries never fail outright and report their degraded paths through
//! [`CompletionError`].

use std::fmt;
use thiserror::Error;

use crate::namespaces::QName;

/// Result type alias using the crate Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for grammar loading operations
#[derive(Error, Debug)]
pub enum Error {
    /// XML Schema parsing/building error
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Value error (invalid attribute or setting value)
    #[error("value error: {0}")]
    Value(String),

    /// Resource loading error
    #[error("resource error: {0}")]
    Resource(String),

    /// Namespace error
    #[error("namespace error: {0}")]
    Namespace(String),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// URL parsing error
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Settings deserialization error
    #[error("settings error: {0}")]
    Settings(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<roxmltree::Error> for Error {
    fn from(err: roxmltree::Error) -> Self {
        Error::Xml(err.to_string())
    }
}

/// Reasons a completion query falls back to a degraded result.
///
/// None of these are fatal: the engine maps each one to an empty or
/// statically computed candidate set at its boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    /// The type has no compiled content model (simple, empty or unknown type)
    #[error("no content model available for type '{type_name}'")]
    GrammarUnavailable {
        /// Display name of the type
        type_name: String,
    },

    /// A replayed child does not match the content model at its position
    #[error("child '{name}' at position {position} is not allowed by the content model")]
    SequenceRejected {
        /// Zero-based index of the offending child
        position: usize,
        /// Name of the offending child
        name: QName,
    },

    /// The content model was rejected at compile time
    #[error("content model of type '{type_name}' is ambiguous or malformed: {reason}")]
    AmbiguousOrMalformedGrammar {
        /// Display name of the type
        type_name: String,
        /// Reason reported by the model compiler
        reason: String,
    },
}

/// XML Schema parsing error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Error message
    pub message: String,
    /// Location in the schema file
    pub location: Option<String>,
    /// Schema source that caused the error
    pub source: Option<String>,
}

impl ParseError {
    /// Create a new parse error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
            source: None,
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the source
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref loc) = self.location {
            write!(f, "\n\nLocation: {}", loc)?;
        }

        if let Some(ref src) = self.source {
            write!(f, "\n\nSource:\n{}", src)?;
        }

        Ok(())
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::new("Invalid schema syntax")
            .with_location("schema.xsd:42:10")
            .with_source("<xs:element name='invalid'/>");

        let msg = format!("{}", err);
        assert!(msg.contains("Invalid schema syntax"));
        assert!(msg.contains("Location:"));
        assert!(msg.contains("Source:"));
    }

    #[test]
    fn test_error_conversion() {
        let parse_err = ParseError::new("test");
        let err: Error = parse_err.into();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_completion_error_display() {
        let err = CompletionError::SequenceRejected {
            position: 2,
            name: QName::local("title"),
        };
        let msg = err.to_string();
        assert!(msg.contains("'title'"));
        assert!(msg.contains("position 2"));
    }

    #[test]
    fn test_xml_error_conversion() {
        let xml_err = roxmltree::Document::parse("<a>").unwrap_err();
        let err: Error = xml_err.into();
        assert!(matches!(err, Error::Xml(_)));
    }
}
