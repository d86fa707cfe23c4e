//! XML namespace handling
//!
//! This module provides qualified names (QNames) and the namespace prefix
//! scopes used to resolve element names of edited documents.

use crate::error::{Error, Result};
use crate::XML_NAMESPACE;
use std::collections::HashMap;
use std::fmt;

/// XML Namespace URI
pub type NamespaceUri = String;

/// Namespace prefix
pub type Prefix = String;

/// Qualified name (QName) - combination of namespace and local name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QName {
    /// Namespace URI (None for no namespace)
    pub namespace: Option<NamespaceUri>,
    /// Local name
    pub local_name: String,
}

impl QName {
    /// Create a new QName
    pub fn new(namespace: Option<impl Into<String>>, local_name: impl Into<String>) -> Self {
        let namespace: Option<String> = namespace.map(Into::into);
        Self {
            namespace: namespace.filter(|ns| !ns.is_empty()),
            local_name: local_name.into(),
        }
    }

    /// Create a QName without a namespace
    pub fn local(local_name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local_name: local_name.into(),
        }
    }

    /// Create a QName with a namespace
    pub fn namespaced(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self::new(Some(namespace), local_name)
    }

    /// Namespace URI, empty string for no namespace
    pub fn namespace_or_empty(&self) -> &str {
        self.namespace.as_deref().unwrap_or("")
    }

    /// Check if this name is in the given namespace (None = no namespace)
    pub fn is_in(&self, namespace: Option<&str>) -> bool {
        self.namespace.as_deref() == namespace.filter(|ns| !ns.is_empty())
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local_name),
            None => f.write_str(&self.local_name),
        }
    }
}

/// Namespace context for resolving prefixes
#[derive(Debug, Clone, Default)]
pub struct NamespaceContext {
    /// Mapping from prefix to namespace URI
    prefixes: HashMap<Prefix, NamespaceUri>,
    /// Default namespace (no prefix)
    default_namespace: Option<NamespaceUri>,
}

impl NamespaceContext {
    /// Create a new empty namespace context
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a namespace prefix mapping
    pub fn add_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.insert(prefix.into(), namespace.into());
    }

    /// Set the default namespace. An empty URI undeclares it.
    pub fn set_default_namespace(&mut self, namespace: impl Into<String>) {
        let namespace = namespace.into();
        self.default_namespace = if namespace.is_empty() {
            None
        } else {
            Some(namespace)
        };
    }

    /// Get the namespace for a prefix
    pub fn get_namespace(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(|s| s.as_str())
    }

    /// Get the default namespace
    pub fn get_default_namespace(&self) -> Option<&str> {
        self.default_namespace.as_deref()
    }

    /// Apply an `xmlns` or `xmlns:prefix` declaration.
    ///
    /// Returns false if the attribute is not a namespace declaration.
    pub fn declare(&mut self, attribute_name: &str, value: &str) -> bool {
        if attribute_name == "xmlns" {
            self.set_default_namespace(value);
            true
        } else if let Some(prefix) = attribute_name.strip_prefix("xmlns:") {
            self.add_prefix(prefix, value);
            true
        } else {
            false
        }
    }

    /// Resolve a prefixed element name to a QName. The `xml` prefix is
    /// always bound.
    pub fn resolve(&self, prefixed_name: &str) -> Result<QName> {
        if let Some((prefix, local)) = prefixed_name.split_once(':') {
            let namespace = self
                .get_namespace(prefix)
                .or((prefix == "xml").then_some(XML_NAMESPACE))
                .ok_or_else(|| Error::Namespace(format!("Unknown prefix: {}", prefix)))?;
            Ok(QName::namespaced(namespace, local))
        } else {
            Ok(QName::new(self.default_namespace.clone(), prefixed_name))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qname_creation() {
        let qname = QName::namespaced("http://example.com", "element");
        assert_eq!(qname.namespace, Some("http://example.com".to_string()));
        assert_eq!(qname.local_name, "element");
    }

    #[test]
    fn test_xml_prefix_is_bound() {
        let ctx = NamespaceContext::new();
        let qname = ctx.resolve("xml:lang").unwrap();
        assert_eq!(qname.namespace.as_deref(), Some(XML_NAMESPACE));
        assert!(ctx.resolve("p:lang").is_err());
    }

    #[test]
    fn test_empty_namespace_is_no_namespace() {
        let qname = QName::new(Some(""), "element");
        assert_eq!(qname, QName::local("element"));
        assert!(qname.is_in(None));
        assert!(qname.is_in(Some("")));
    }

    #[test]
    fn test_qname_to_string() {
        let qname = QName::namespaced("http://example.com", "element");
        assert_eq!(qname.to_string(), "{http://example.com}element");

        let qname_local = QName::local("element");
        assert_eq!(qname_local.to_string(), "element");
    }

    #[test]
    fn test_namespace_context() {
        let mut ctx = NamespaceContext::new();
        ctx.add_prefix("xs", "http://www.w3.org/2001/XMLSchema");
        ctx.set_default_namespace("http://example.com");

        assert_eq!(
            ctx.get_namespace("xs"),
            Some("http://www.w3.org/2001/XMLSchema")
        );
        assert_eq!(ctx.get_default_namespace(), Some("http://example.com"));
    }

    #[test]
    fn test_declare() {
        let mut ctx = NamespaceContext::new();
        assert!(ctx.declare("xmlns", "http://example.com"));
        assert!(ctx.declare("xmlns:b", "http://example.com/b"));
        assert!(!ctx.declare("id", "x"));

        assert_eq!(
            ctx.resolve("item").unwrap(),
            QName::namespaced("http://example.com", "item")
        );
        assert_eq!(
            ctx.resolve("b:item").unwrap(),
            QName::namespaced("http://example.com/b", "item")
        );

        ctx.declare("xmlns", "");
        assert_eq!(ctx.resolve("item").unwrap(), QName::local("item"));
    }

    #[test]
    fn test_resolve_unknown_prefix() {
        let ctx = NamespaceContext::new();
        assert!(matches!(ctx.resolve("p:item"), Err(Error::Namespace(_))));
    }
}
