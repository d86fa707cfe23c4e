//! XSD built-in types
//!
//! Names of the built-in datatypes and the definition of `xs:anyType`, the
//! type of elements declared without one.

use crate::namespaces::QName;

use super::complex_types::{ComplexContent, XsdComplexType};
use super::groups::{GroupParticle, ModelType, XsdGroup};
use super::particles::Occurs;
use super::wildcards::{ProcessContents, XsdAnyElement};

// =============================================================================
// XSD Namespace Constants
// =============================================================================

/// XSD Namespace
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// XSD anyType type name
pub const XSD_ANY_TYPE: &str = "anyType";
/// XSD anySimpleType type name
pub const XSD_ANY_SIMPLE_TYPE: &str = "anySimpleType";
/// XSD anyAtomicType type name (XSD 1.1)
pub const XSD_ANY_ATOMIC_TYPE: &str = "anyAtomicType";

/// Built-in simple datatypes, primitive and derived
pub const XSD_BUILTIN_SIMPLE_TYPES: &[&str] = &[
    XSD_ANY_SIMPLE_TYPE,
    XSD_ANY_ATOMIC_TYPE,
    "string",
    "normalizedString",
    "token",
    "language",
    "Name",
    "NCName",
    "ID",
    "IDREF",
    "IDREFS",
    "ENTITY",
    "ENTITIES",
    "NMTOKEN",
    "NMTOKENS",
    "boolean",
    "decimal",
    "integer",
    "long",
    "int",
    "short",
    "byte",
    "nonNegativeInteger",
    "positiveInteger",
    "unsignedLong",
    "unsignedInt",
    "unsignedShort",
    "unsignedByte",
    "nonPositiveInteger",
    "negativeInteger",
    "float",
    "double",
    "duration",
    "dayTimeDuration",
    "yearMonthDuration",
    "dateTime",
    "dateTimeStamp",
    "time",
    "date",
    "gYearMonth",
    "gYear",
    "gMonthDay",
    "gDay",
    "gMonth",
    "hexBinary",
    "base64Binary",
    "anyURI",
    "QName",
    "NOTATION",
];

/// Check if a name is a built-in simple type
pub fn is_builtin_simple_type(name: &QName) -> bool {
    name.is_in(Some(XSD_NAMESPACE)) && XSD_BUILTIN_SIMPLE_TYPES.contains(&name.local_name.as_str())
}

/// Check if a name is `xs:anyType`
pub fn is_any_type(name: &QName) -> bool {
    name.is_in(Some(XSD_NAMESPACE)) && name.local_name == XSD_ANY_TYPE
}

/// Qualified name of a built-in type
pub fn xsd_name(local_name: &str) -> QName {
    QName::namespaced(XSD_NAMESPACE, local_name)
}

/// The `xs:anyType` definition: mixed content of any elements, laxly assessed
pub fn any_type() -> XsdComplexType {
    let mut group = XsdGroup::new(ModelType::Sequence);
    group.push(GroupParticle::Any(XsdAnyElement::new(
        ProcessContents::Lax,
        Occurs::zero_or_more(),
    )));

    let mut ct = XsdComplexType::new(Some(xsd_name(XSD_ANY_TYPE)));
    ct.content = ComplexContent::Group(group);
    ct.mixed = true;
    ct
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::complex_types::ContentKind;

    #[test]
    fn test_builtin_lookup() {
        assert!(is_builtin_simple_type(&xsd_name("string")));
        assert!(is_builtin_simple_type(&xsd_name("dateTime")));
        assert!(!is_builtin_simple_type(&xsd_name("anyType")));
        assert!(!is_builtin_simple_type(&QName::local("string")));
        assert!(is_any_type(&xsd_name("anyType")));
    }

    #[test]
    fn test_any_type() {
        let ct = any_type();
        assert_eq!(ct.content_kind(), ContentKind::Mixed);
        let group = ct.model_group().unwrap();
        assert_eq!(group.iter_wildcards()[0].process_contents, ProcessContents::Lax);
    }
}
