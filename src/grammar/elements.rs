//! XSD Element declarations
//!
//! Raw element declarations as stored in the grammar arena. Every
//! `<xs:element name="...">` in a schema document, global or local, gets its
//! own slot; element references point at the global slot.
//!
//! Reference: https://www.w3.org/TR/xmlschema11-1/#cElement_Declarations

use crate::namespaces::QName;

use super::globals::TypeId;

/// Scope of an element declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ElementScope {
    /// Top-level declaration
    #[default]
    Global,
    /// Declared inside a complex type or named group
    Local,
}

/// Form of a local element or attribute name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ElementForm {
    /// Name is in the target namespace
    Qualified,
    /// Name has no namespace
    #[default]
    Unqualified,
}

impl ElementForm {
    /// Parse from a `form`/`elementFormDefault` attribute value
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "qualified" => Some(Self::Qualified),
            "unqualified" => Some(Self::Unqualified),
            _ => None,
        }
    }
}

/// How the type of a declaration is given in the schema
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TypeRef {
    /// `type="..."` attribute
    Named(QName),
    /// Definition in the grammar arena: an inline type, or a name resolved
    /// by the builder
    Definition(TypeId),
    /// No type given: the head's type or `xs:anyType`
    #[default]
    Unspecified,
}

/// Raw element declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XsdElement {
    /// Qualified name
    pub name: QName,
    /// Global or local
    pub scope: ElementScope,
    /// Type as written in the schema
    pub type_ref: TypeRef,
    /// Resolved type, set by the builder
    pub type_id: Option<TypeId>,
    /// `abstract="true"`
    pub is_abstract: bool,
    /// `nillable="true"`
    pub nillable: bool,
    /// Default value
    pub default: Option<String>,
    /// Fixed value
    pub fixed: Option<String>,
    /// Substitution group heads (XSD 1.1 allows a list)
    pub substitution_group: Vec<QName>,
    /// Text of `xs:annotation/xs:documentation`
    pub documentation: Option<String>,
    /// Index of the schema document that declares the element
    pub document: usize,
}

impl XsdElement {
    /// Create a declaration with default properties
    pub fn new(name: QName, scope: ElementScope) -> Self {
        Self {
            name,
            scope,
            type_ref: TypeRef::Unspecified,
            type_id: None,
            is_abstract: false,
            nillable: false,
            default: None,
            fixed: None,
            substitution_group: Vec::new(),
            documentation: None,
            document: 0,
        }
    }

    /// Check if this is a global declaration
    pub fn is_global(&self) -> bool {
        self.scope == ElementScope::Global
    }

    /// Local name of the declaration
    pub fn local_name(&self) -> &str {
        &self.name.local_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_defaults() {
        let elem = XsdElement::new(QName::local("item"), ElementScope::Local);
        assert!(!elem.is_global());
        assert_eq!(elem.type_ref, TypeRef::Unspecified);
        assert!(elem.substitution_group.is_empty());
        assert_eq!(elem.local_name(), "item");
    }

    #[test]
    fn test_form_parse() {
        assert_eq!(ElementForm::parse("qualified"), Some(ElementForm::Qualified));
        assert_eq!(ElementForm::parse(" unqualified "), Some(ElementForm::Unqualified));
        assert_eq!(ElementForm::parse("other"), None);
    }
}
