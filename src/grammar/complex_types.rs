//! XSD Complex type definitions
//!
//! Complex types own the model group their content automaton is compiled
//! from, plus the attribute uses of the type. [`TypeDefinition`] wraps both
//! simple and complex definitions stored in the grammar arena.
//!
//! Reference: https://www.w3.org/TR/xmlschema11-1/#Complex_Type_Definitions

use crate::namespaces::QName;

use super::attributes::XsdAttribute;
use super::elements::TypeRef;
use super::groups::XsdGroup;
use super::simple_types::XsdSimpleType;

/// Derivation method of a complex type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivationMethod {
    /// Extension of the base content
    Extension,
    /// Restriction of the base content
    Restriction,
}

/// Content of a complex type
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ComplexContent {
    /// No element children
    #[default]
    Empty,
    /// Character data of a simple type
    Simple(TypeRef),
    /// Element children following a model group
    Group(XsdGroup),
}

/// Complex type definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XsdComplexType {
    /// Name, None for anonymous types
    pub name: Option<QName>,
    /// Content
    pub content: ComplexContent,
    /// `mixed="true"`
    pub mixed: bool,
    /// Attribute uses, flattened by the builder
    pub attributes: Vec<XsdAttribute>,
    /// Referenced attribute groups, until resolved
    pub attribute_group_refs: Vec<QName>,
    /// Base type and derivation method
    pub derivation: Option<(DerivationMethod, QName)>,
    /// `abstract="true"`
    pub is_abstract: bool,
    /// Documentation text
    pub documentation: Option<String>,
}

impl XsdComplexType {
    /// Create a complex type with empty content
    pub fn new(name: Option<QName>) -> Self {
        Self {
            name,
            content: ComplexContent::Empty,
            mixed: false,
            attributes: Vec::new(),
            attribute_group_refs: Vec::new(),
            derivation: None,
            is_abstract: false,
            documentation: None,
        }
    }

    /// The model group of element-only or mixed content
    pub fn model_group(&self) -> Option<&XsdGroup> {
        match &self.content {
            ComplexContent::Group(group) => Some(group),
            _ => None,
        }
    }

    /// Content kind of the type
    pub fn content_kind(&self) -> ContentKind {
        match (&self.content, self.mixed) {
            (ComplexContent::Simple(_), _) => ContentKind::Simple,
            (_, true) => ContentKind::Mixed,
            (ComplexContent::Empty, false) => ContentKind::Empty,
            (ComplexContent::Group(_), false) => ContentKind::ElementOnly,
        }
    }
}

/// Type category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCategory {
    /// Simple type
    Simple,
    /// Complex type
    Complex,
}

/// Content kind of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    /// No content
    Empty,
    /// Character data only
    Simple,
    /// Element children only
    ElementOnly,
    /// Element children interleaved with character data
    Mixed,
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty"),
            Self::Simple => write!(f, "simple"),
            Self::ElementOnly => write!(f, "element-only"),
            Self::Mixed => write!(f, "mixed"),
        }
    }
}

/// Type definition stored in the grammar arena
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDefinition {
    /// Simple type
    Simple(XsdSimpleType),
    /// Complex type
    Complex(XsdComplexType),
}

impl TypeDefinition {
    /// Type name, None for anonymous types
    pub fn name(&self) -> Option<&QName> {
        match self {
            TypeDefinition::Simple(st) => st.name.as_ref(),
            TypeDefinition::Complex(ct) => ct.name.as_ref(),
        }
    }

    /// Display name used in diagnostics
    pub fn display_name(&self) -> String {
        self.name()
            .map(|n| n.to_string())
            .unwrap_or_else(|| "<anonymous>".to_string())
    }

    /// Category of the type
    pub fn category(&self) -> TypeCategory {
        match self {
            TypeDefinition::Simple(_) => TypeCategory::Simple,
            TypeDefinition::Complex(_) => TypeCategory::Complex,
        }
    }

    /// Content kind of the type; simple types have simple content
    pub fn content_kind(&self) -> ContentKind {
        match self {
            TypeDefinition::Simple(_) => ContentKind::Simple,
            TypeDefinition::Complex(ct) => ct.content_kind(),
        }
    }

    /// Documentation text
    pub fn documentation(&self) -> Option<&str> {
        match self {
            TypeDefinition::Simple(st) => st.documentation.as_deref(),
            TypeDefinition::Complex(ct) => ct.documentation.as_deref(),
        }
    }

    /// The complex definition, if any
    pub fn as_complex(&self) -> Option<&XsdComplexType> {
        match self {
            TypeDefinition::Complex(ct) => Some(ct),
            TypeDefinition::Simple(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::groups::ModelType;

    #[test]
    fn test_content_kind() {
        let mut ct = XsdComplexType::new(None);
        assert_eq!(ct.content_kind(), ContentKind::Empty);

        ct.mixed = true;
        assert_eq!(ct.content_kind(), ContentKind::Mixed);

        ct.mixed = false;
        ct.content = ComplexContent::Group(XsdGroup::new(ModelType::Sequence));
        assert_eq!(ct.content_kind(), ContentKind::ElementOnly);
        assert!(ct.model_group().is_some());

        ct.content = ComplexContent::Simple(TypeRef::Unspecified);
        assert_eq!(ct.content_kind(), ContentKind::Simple);
    }

    #[test]
    fn test_type_definition() {
        let def = TypeDefinition::Complex(XsdComplexType::new(Some(QName::local("T"))));
        assert_eq!(def.category(), TypeCategory::Complex);
        assert_eq!(def.display_name(), "T");

        let anon = TypeDefinition::Simple(XsdSimpleType::new(None));
        assert_eq!(anon.category(), TypeCategory::Simple);
        assert_eq!(anon.content_kind(), ContentKind::Simple);
        assert_eq!(anon.display_name(), "<anonymous>");
    }
}
