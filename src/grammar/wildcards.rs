//! XSD element wildcards
//!
//! `xs:any` particles accept element names from a set of namespaces. The
//! completion engine only needs the process-contents mode of a wildcard, the
//! namespace constraint is used while replaying children through the automaton.
//!
//! Reference: https://www.w3.org/TR/xmlschema11-1/#Wildcards

use crate::error::ParseError;
use crate::namespaces::QName;
use std::collections::BTreeSet;

use super::particles::Occurs;

/// Process contents mode for wildcards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProcessContents {
    /// Matched elements must be declared
    #[default]
    Strict,
    /// Validate if a declaration is found, otherwise accept
    Lax,
    /// Skip validation entirely
    Skip,
}

impl ProcessContents {
    /// Parse from a `processContents` attribute value
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "strict" => Some(Self::Strict),
            "lax" => Some(Self::Lax),
            "skip" => Some(Self::Skip),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProcessContents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Lax => write!(f, "lax"),
            Self::Skip => write!(f, "skip"),
        }
    }
}

/// Namespace constraint for wildcards
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NamespaceConstraint {
    /// Any namespace is allowed (##any)
    #[default]
    Any,
    /// Any namespace except the target namespace and no namespace (##other)
    Other {
        /// The target namespace to exclude
        target_namespace: Option<String>,
    },
    /// Specific set of allowed namespaces ("" stands for no namespace)
    Enumeration(BTreeSet<String>),
    /// XSD 1.1: set of disallowed namespaces (notNamespace)
    Not(BTreeSet<String>),
}

impl NamespaceConstraint {
    /// Create from a `namespace` attribute value
    pub fn from_namespace_attr(
        value: &str,
        target_namespace: Option<&str>,
    ) -> Result<Self, ParseError> {
        match value.trim() {
            "##any" => Ok(Self::Any),
            "##other" => Ok(Self::Other {
                target_namespace: target_namespace.map(String::from),
            }),
            list => Ok(Self::Enumeration(parse_namespace_list(
                list,
                target_namespace,
                "namespace",
            )?)),
        }
    }

    /// Create from a `notNamespace` attribute value (XSD 1.1)
    pub fn from_not_namespace_attr(
        value: &str,
        target_namespace: Option<&str>,
    ) -> Result<Self, ParseError> {
        Ok(Self::Not(parse_namespace_list(
            value,
            target_namespace,
            "notNamespace",
        )?))
    }

    /// Check if a namespace ("" for none) is allowed by this constraint
    pub fn is_allowed(&self, namespace: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Other { target_namespace } => {
                !namespace.is_empty() && target_namespace.as_deref() != Some(namespace)
            }
            Self::Enumeration(set) => set.contains(namespace),
            Self::Not(set) => !set.contains(namespace),
        }
    }

    /// Check whether two constraints admit at least one common namespace
    pub fn overlaps(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Enumeration(a), b) | (b, Self::Enumeration(a)) => {
                a.iter().any(|ns| b.is_allowed(ns))
            }
            // Every other pair admits infinitely many namespaces
            _ => true,
        }
    }
}

fn parse_namespace_list(
    value: &str,
    target_namespace: Option<&str>,
    attribute: &str,
) -> Result<BTreeSet<String>, ParseError> {
    let mut namespaces = BTreeSet::new();
    for ns in value.split_whitespace() {
        match ns {
            "##local" => {
                namespaces.insert(String::new());
            }
            "##targetNamespace" => {
                namespaces.insert(target_namespace.unwrap_or_default().to_string());
            }
            s if s.starts_with("##") => {
                return Err(ParseError::new(format!(
                    "wrong value '{}' in '{}' attribute",
                    s, attribute
                )));
            }
            uri => {
                namespaces.insert(uri.to_string());
            }
        }
    }
    Ok(namespaces)
}

/// An `xs:any` element wildcard particle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XsdAnyElement {
    /// Allowed namespaces
    pub namespace: NamespaceConstraint,
    /// Process contents mode
    pub process_contents: ProcessContents,
    /// Occurrence bounds
    pub occurs: Occurs,
}

impl XsdAnyElement {
    /// Create a wildcard accepting any namespace
    pub fn new(process_contents: ProcessContents, occurs: Occurs) -> Self {
        Self {
            namespace: NamespaceConstraint::Any,
            process_contents,
            occurs,
        }
    }

    /// Set the namespace constraint
    pub fn with_namespace(mut self, namespace: NamespaceConstraint) -> Self {
        self.namespace = namespace;
        self
    }

    /// Check if an element name is accepted by this wildcard
    pub fn matches(&self, name: &QName) -> bool {
        self.namespace.is_allowed(name.namespace_or_empty())
    }
}
