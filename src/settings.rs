//! Validation settings
//!
//! Settings as sent by editor clients (camelCase JSON). They select the XML
//! Schema version used when compiling grammars and the severity reported for
//! documents without an associated grammar.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::grammar::XsdVersion;
use crate::{XSD_1_0_NAMESPACE, XSD_1_1_NAMESPACE};

/// Versioning namespace of the XSD 1.0 processor with 1.1 extensions
pub const XSD_1_0_EX_NAMESPACE: &str = "http://www.w3.org/XML/XMLSchema/v1.0";

/// XML Schema version requested by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SchemaVersion {
    /// XSD 1.0
    #[default]
    #[serde(rename = "1.0")]
    V10,
    /// XSD 1.1
    #[serde(rename = "1.1")]
    V11,
    /// XSD 1.0 with the extended 1.1 processor
    #[serde(rename = "1.0EX")]
    V10Ex,
}

impl SchemaVersion {
    /// The version string as used in settings
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V10 => "1.0",
            Self::V11 => "1.1",
            Self::V10Ex => "1.0EX",
        }
    }
}

/// Severity reported when a document has no associated grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoGrammarSeverity {
    /// Do not report
    Ignore,
    /// Report as a hint
    #[default]
    Hint,
    /// Report as information
    Info,
    /// Report as a warning
    Warning,
    /// Report as an error
    Error,
}

/// Diagnostic severity levels, in the order used by editor protocols
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Error
    Error,
    /// Warning
    Warning,
    /// Information
    Information,
    /// Hint
    Hint,
}

/// Validation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidationSettings {
    /// Whether validation is enabled at all
    pub enabled: bool,
    /// Whether schema-based validation is enabled
    pub schema: bool,
    /// Requested XML Schema version
    pub schema_version: SchemaVersion,
    /// Severity for documents without grammar
    pub no_grammar: NoGrammarSeverity,
    /// Reject documents carrying a DOCTYPE declaration
    pub disallow_doc_type_decl: bool,
    /// Resolve external entities while loading
    pub resolve_external_entities: bool,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            schema: true,
            schema_version: SchemaVersion::V10,
            no_grammar: NoGrammarSeverity::Hint,
            disallow_doc_type_decl: false,
            resolve_external_entities: false,
        }
    }
}

impl ValidationSettings {
    /// Parse settings from a JSON object. Missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Overwrite these settings with another set
    pub fn merge(&mut self, other: &ValidationSettings) -> &mut Self {
        self.enabled = other.enabled;
        self.schema = other.schema;
        self.schema_version = other.schema_version;
        self.no_grammar = other.no_grammar;
        self.disallow_doc_type_decl = other.disallow_doc_type_decl;
        self.resolve_external_entities = other.resolve_external_entities;
        self
    }

    /// The XML Schema version grammars are compiled for
    pub fn xsd_version(&self) -> XsdVersion {
        match self.schema_version {
            SchemaVersion::V11 => XsdVersion::Xsd11,
            SchemaVersion::V10 | SchemaVersion::V10Ex => XsdVersion::Xsd10,
        }
    }

    /// The schema language namespace matching the requested version
    pub fn schema_namespace(&self) -> &'static str {
        match self.schema_version {
            SchemaVersion::V10 => XSD_1_0_NAMESPACE,
            SchemaVersion::V11 => XSD_1_1_NAMESPACE,
            SchemaVersion::V10Ex => XSD_1_0_EX_NAMESPACE,
        }
    }

    /// Severity of the "no grammar" diagnostic, None when ignored
    pub fn no_grammar_severity(&self) -> Option<Severity> {
        match self.no_grammar {
            NoGrammarSeverity::Ignore => None,
            NoGrammarSeverity::Hint => Some(Severity::Hint),
            NoGrammarSeverity::Info => Some(Severity::Information),
            NoGrammarSeverity::Warning => Some(Severity::Warning),
            NoGrammarSeverity::Error => Some(Severity::Error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = ValidationSettings::default();
        assert!(settings.enabled);
        assert!(settings.schema);
        assert!(!settings.disallow_doc_type_decl);
        assert_eq!(settings.xsd_version(), XsdVersion::Xsd10);
        assert_eq!(settings.schema_namespace(), XSD_1_0_NAMESPACE);
        assert_eq!(settings.no_grammar_severity(), Some(Severity::Hint));
    }

    #[test]
    fn test_from_json() {
        let settings =
            ValidationSettings::from_json(r#"{"schemaVersion": "1.1", "noGrammar": "warning"}"#)
                .unwrap();
        assert_eq!(settings.schema_version, SchemaVersion::V11);
        assert_eq!(settings.xsd_version(), XsdVersion::Xsd11);
        assert_eq!(settings.schema_namespace(), XSD_1_1_NAMESPACE);
        assert_eq!(settings.no_grammar_severity(), Some(Severity::Warning));
        assert!(settings.enabled);
    }

    #[test]
    fn test_from_json_invalid_version() {
        let result = ValidationSettings::from_json(r#"{"schemaVersion": "2.0"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_version_1_0_ex() {
        let settings = ValidationSettings::from_json(r#"{"schemaVersion": "1.0EX"}"#).unwrap();
        assert_eq!(settings.xsd_version(), XsdVersion::Xsd10);
        assert_eq!(settings.schema_namespace(), XSD_1_0_EX_NAMESPACE);
        assert_eq!(settings.schema_version.as_str(), "1.0EX");
    }

    #[test]
    fn test_ignore_no_grammar() {
        let settings = ValidationSettings::from_json(r#"{"noGrammar": "ignore"}"#).unwrap();
        assert_eq!(settings.no_grammar_severity(), None);
    }

    #[test]
    fn test_merge() {
        let mut settings = ValidationSettings::default();
        let other = ValidationSettings {
            enabled: false,
            schema_version: SchemaVersion::V11,
            ..Default::default()
        };
        settings.merge(&other);
        assert!(!settings.enabled);
        assert_eq!(settings.schema_version, SchemaVersion::V11);
    }
}
