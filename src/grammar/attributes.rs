//! XSD Attribute declarations
//!
//! Attribute uses of complex types, attribute groups and global attributes.
//! References are resolved by the builder, which also flattens attribute
//! groups into the owning complex type.
//!
//! Reference: https://www.w3.org/TR/xmlschema11-1/#cAttribute_Declarations

use crate::namespaces::QName;

use super::elements::TypeRef;
use super::globals::TypeId;

/// Attribute use mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttributeUse {
    /// May be present
    #[default]
    Optional,
    /// Must be present
    Required,
    /// Must not be present
    Prohibited,
}

impl AttributeUse {
    /// Parse from a `use` attribute value
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "optional" => Some(Self::Optional),
            "required" => Some(Self::Required),
            "prohibited" => Some(Self::Prohibited),
            _ => None,
        }
    }
}

/// Attribute declaration or use
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XsdAttribute {
    /// Qualified name
    pub name: QName,
    /// Type as written in the schema
    pub type_ref: TypeRef,
    /// Resolved simple type
    pub type_id: Option<TypeId>,
    /// Use mode
    pub use_mode: AttributeUse,
    /// Default value
    pub default: Option<String>,
    /// Fixed value
    pub fixed: Option<String>,
    /// Documentation text
    pub documentation: Option<String>,
    /// Global attribute this use refers to, until resolved
    pub reference: Option<QName>,
}

impl XsdAttribute {
    /// Create an optional attribute with an unspecified type
    pub fn new(name: QName) -> Self {
        Self {
            name,
            type_ref: TypeRef::Unspecified,
            type_id: None,
            use_mode: AttributeUse::Optional,
            default: None,
            fixed: None,
            documentation: None,
            reference: None,
        }
    }

    /// Check if the attribute is required
    pub fn is_required(&self) -> bool {
        self.use_mode == AttributeUse::Required
    }

    /// Check if the attribute is prohibited
    pub fn is_prohibited(&self) -> bool {
        self.use_mode == AttributeUse::Prohibited
    }
}

/// Named attribute group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XsdAttributeGroup {
    /// Group name
    pub name: QName,
    /// Attribute uses
    pub attributes: Vec<XsdAttribute>,
    /// Nested attribute group references
    pub group_refs: Vec<QName>,
}

impl XsdAttributeGroup {
    /// Create an empty attribute group
    pub fn new(name: QName) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            group_refs: Vec::new(),
        }
    }
}

/// Merge attribute uses, later uses overriding earlier ones of the same name.
/// Prohibited uses remove the attribute.
pub fn merge_attributes(base: &[XsdAttribute], own: &[XsdAttribute]) -> Vec<XsdAttribute> {
    let mut merged: Vec<XsdAttribute> = base.to_vec();
    for attr in own {
        merged.retain(|a| a.name != attr.name);
        if !attr.is_prohibited() {
            merged.push(attr.clone());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_use_parse() {
        assert_eq!(AttributeUse::parse("required"), Some(AttributeUse::Required));
        assert_eq!(AttributeUse::parse("prohibited"), Some(AttributeUse::Prohibited));
        assert_eq!(AttributeUse::parse("sometimes"), None);
    }

    #[test]
    fn test_merge_attributes() {
        let mut id = XsdAttribute::new(QName::local("id"));
        id.use_mode = AttributeUse::Required;
        let lang = XsdAttribute::new(QName::local("lang"));

        let mut prohibited_lang = XsdAttribute::new(QName::local("lang"));
        prohibited_lang.use_mode = AttributeUse::Prohibited;
        let optional_id = XsdAttribute::new(QName::local("id"));

        let merged = merge_attributes(&[id, lang], &[prohibited_lang, optional_id]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name.local_name, "id");
        assert!(!merged[0].is_required());
    }
}
