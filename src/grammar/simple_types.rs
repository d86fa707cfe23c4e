//! XSD Simple type definitions
//!
//! Only the parts of simple types that matter to editors are kept: the
//! derivation chain and the enumeration facet.
//!
//! Reference: https://www.w3.org/TR/xmlschema11-1/#Simple_Type_Definitions

use crate::namespaces::QName;

use super::elements::TypeRef;
use super::globals::TypeId;

/// Variety of a simple type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SimpleVariety {
    /// Atomic values
    #[default]
    Atomic,
    /// Whitespace separated list of an item type
    List,
    /// Union of member types
    Union,
}

/// Simple type definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XsdSimpleType {
    /// Name, None for anonymous types
    pub name: Option<QName>,
    /// Variety
    pub variety: SimpleVariety,
    /// Restriction base as written in the schema
    pub base: TypeRef,
    /// Resolved restriction base
    pub base_id: Option<TypeId>,
    /// Item type of a list
    pub item_type: TypeRef,
    /// Member types of a union
    pub member_types: Vec<TypeRef>,
    /// Enumeration facet values in declaration order
    pub enumeration: Vec<String>,
    /// Documentation text
    pub documentation: Option<String>,
    /// Built-in XSD type
    pub builtin: bool,
}

impl XsdSimpleType {
    /// Create an atomic type without a base
    pub fn new(name: Option<QName>) -> Self {
        Self {
            name,
            variety: SimpleVariety::Atomic,
            base: TypeRef::Unspecified,
            base_id: None,
            item_type: TypeRef::Unspecified,
            member_types: Vec::new(),
            enumeration: Vec::new(),
            documentation: None,
            builtin: false,
        }
    }

    /// Create a built-in type
    pub fn builtin(name: QName) -> Self {
        Self {
            builtin: true,
            ..Self::new(Some(name))
        }
    }

    /// Check if the type carries its own enumeration facet
    pub fn has_enumeration(&self) -> bool {
        !self.enumeration.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin() {
        let ty = XsdSimpleType::builtin(QName::namespaced(
            "http://www.w3.org/2001/XMLSchema",
            "string",
        ));
        assert!(ty.builtin);
        assert_eq!(ty.variety, SimpleVariety::Atomic);
        assert!(!ty.has_enumeration());
    }
}
