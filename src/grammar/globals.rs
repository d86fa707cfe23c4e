//! Compiled grammars
//!
//! A [`Grammar`] is the immutable result of loading one set of schema
//! documents. It owns every raw declaration and type definition (arena
//! indexed by [`ElementDeclId`] and [`TypeId`]), the substitution group table,
//! the compiled content automata and the per-grammar declaration cache.

use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::completion::cache::{DeclarationCache, ElementDeclaration};
use crate::error::ParseError;
use crate::locations::Location;
use crate::namespaces::QName;

use super::attributes::XsdAttribute;
use super::builders::XsdVersion;
use super::complex_types::{ComplexContent, TypeDefinition};
use super::elements::{TypeRef, XsdElement};
use super::models::ContentAutomaton;

/// Position of a raw element declaration in the grammar arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementDeclId(pub u32);

/// Position of a type definition in the grammar arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

/// Process-unique identity of a loaded grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GrammarId(u64);

static NEXT_GRAMMAR_ID: AtomicU64 = AtomicU64::new(1);

impl GrammarId {
    /// Allocate a fresh identity
    pub fn next() -> Self {
        GrammarId(NEXT_GRAMMAR_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Numeric value of the identity
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for GrammarId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "grammar#{}", self.0)
    }
}

/// Compilation outcome of a type's content model
#[derive(Debug, Clone)]
pub enum ModelSlot {
    /// Deterministic automaton
    Compiled(ContentAutomaton),
    /// Simple type, or complex type with empty or simple content
    NoContentModel,
    /// The model group was rejected by the model compiler
    Rejected(String),
}

/// Immutable compiled grammar
#[derive(Debug)]
pub struct Grammar {
    pub(crate) id: GrammarId,
    pub(crate) version: XsdVersion,
    pub(crate) target_namespace: Option<String>,
    pub(crate) locations: Vec<Location>,
    pub(crate) elements: Vec<XsdElement>,
    pub(crate) types: Vec<TypeDefinition>,
    pub(crate) global_elements: IndexMap<QName, ElementDeclId>,
    pub(crate) global_types: IndexMap<QName, TypeId>,
    pub(crate) substitution_groups: HashMap<ElementDeclId, Vec<ElementDeclId>>,
    pub(crate) models: Vec<ModelSlot>,
    pub(crate) errors: Vec<ParseError>,
    pub(crate) declarations: DeclarationCache,
}

impl Grammar {
    /// Identity of this grammar
    pub fn id(&self) -> GrammarId {
        self.id
    }

    /// XSD version the grammar was compiled for
    pub fn version(&self) -> XsdVersion {
        self.version
    }

    /// Target namespace of the main schema document
    pub fn target_namespace(&self) -> Option<&str> {
        self.target_namespace.as_deref()
    }

    /// Schema documents the grammar was loaded from, main document first
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// Non-fatal problems found while building the grammar
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Raw element declaration
    pub fn element(&self, id: ElementDeclId) -> Option<&XsdElement> {
        self.elements.get(id.0 as usize)
    }

    /// Type definition
    pub fn type_definition(&self, id: TypeId) -> Option<&TypeDefinition> {
        self.types.get(id.0 as usize)
    }

    /// Type of an element declaration
    pub fn type_of(&self, decl: ElementDeclId) -> Option<TypeId> {
        self.element(decl).and_then(|e| e.type_id)
    }

    /// Display name of a type, for diagnostics
    pub fn type_name(&self, id: TypeId) -> String {
        self.type_definition(id)
            .map(TypeDefinition::display_name)
            .unwrap_or_else(|| format!("<unknown type {}>", id.0))
    }

    /// Compilation outcome of a type's content model
    pub fn model_slot(&self, id: TypeId) -> Option<&ModelSlot> {
        self.models.get(id.0 as usize)
    }

    /// Compiled automaton of a complex type, if it has element content
    pub fn automaton_for(&self, id: TypeId) -> Option<&ContentAutomaton> {
        match self.model_slot(id) {
            Some(ModelSlot::Compiled(automaton)) => Some(automaton),
            _ => None,
        }
    }

    /// Declared substitution group members of a head, in declaration order
    pub fn substitution_group_of(&self, head: ElementDeclId) -> &[ElementDeclId] {
        self.substitution_groups
            .get(&head)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Global element declarations, in declaration order
    pub fn global_elements(&self) -> impl Iterator<Item = ElementDeclId> + '_ {
        self.global_elements.values().copied()
    }

    /// Look up a global element declaration by name
    pub fn lookup_element(&self, name: &QName) -> Option<ElementDeclId> {
        self.global_elements.get(name).copied()
    }

    /// Look up a global type definition by name
    pub fn lookup_type(&self, name: &QName) -> Option<TypeId> {
        self.global_types.get(name).copied()
    }

    /// Schema document of an element declaration
    pub fn location_of(&self, decl: ElementDeclId) -> Option<&Location> {
        self.element(decl)
            .and_then(|e| self.locations.get(e.document))
    }

    /// Attribute uses of a type; empty for simple types
    pub fn attributes_of(&self, id: TypeId) -> &[XsdAttribute] {
        match self.type_definition(id) {
            Some(TypeDefinition::Complex(ct)) => &ct.attributes,
            _ => &[],
        }
    }

    /// Element children known without positional information.
    ///
    /// Collects every element declaration of the type's model group together
    /// with its substitution group members; a wildcard adds every global
    /// element. Simple types and empty content yield nothing.
    pub fn static_children(&self, id: TypeId) -> Vec<ElementDeclId> {
        let Some(group) = self
            .type_definition(id)
            .and_then(TypeDefinition::as_complex)
            .and_then(|ct| ct.model_group())
        else {
            return Vec::new();
        };

        let mut children = IndexSet::new();
        for decl in group.iter_elements() {
            children.insert(decl);
            children.extend(self.substitution_group_of(decl).iter().copied());
        }
        if !group.iter_wildcards().is_empty() {
            children.extend(self.global_elements());
        }
        children.into_iter().collect()
    }

    /// Enumeration values of a simple type, or of the simple content of a
    /// complex type. Restrictions without their own enumeration facet inherit
    /// the values of their base.
    pub fn enumeration_values(&self, id: TypeId) -> Vec<String> {
        let mut current = Some(id);
        // Each step moves to a base type, so the chain is at most the arena size
        for _ in 0..=self.types.len() {
            let Some(def) = current.and_then(|id| self.type_definition(id)) else {
                break;
            };
            current = match def {
                TypeDefinition::Simple(st) => {
                    if st.has_enumeration() {
                        return st.enumeration.clone();
                    }
                    st.base_id
                }
                TypeDefinition::Complex(ct) => match &ct.content {
                    ComplexContent::Simple(TypeRef::Definition(base)) => Some(*base),
                    _ => None,
                },
            };
        }
        Vec::new()
    }

    /// Cached declaration wrapper for a raw declaration
    pub fn declaration(self: &Arc<Self>, id: ElementDeclId) -> Option<Arc<ElementDeclaration>> {
        self.declarations.get(self, id)
    }

    /// Cached declaration wrapper for a global element
    pub fn global_declaration(self: &Arc<Self>, name: &QName) -> Option<Arc<ElementDeclaration>> {
        self.lookup_element(name).and_then(|id| self.declaration(id))
    }

    /// Number of materialized declaration wrappers
    pub fn cached_declarations(&self) -> usize {
        self.declarations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::builders::GrammarBuilder;

    const SCHEMA: &str = r###"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
            xmlns="urn:test" targetNamespace="urn:test" elementFormDefault="qualified">
        <xs:element name="root">
            <xs:complexType>
                <xs:sequence>
                    <xs:element ref="shape" maxOccurs="unbounded"/>
                    <xs:any namespace="##other" processContents="strict" minOccurs="0"/>
                </xs:sequence>
            </xs:complexType>
        </xs:element>
        <xs:element name="shape" abstract="true"/>
        <xs:element name="circle" substitutionGroup="shape"/>
        <xs:element name="square" substitutionGroup="shape"/>
        <xs:simpleType name="color">
            <xs:restriction base="xs:string">
                <xs:enumeration value="red"/>
                <xs:enumeration value="blue"/>
            </xs:restriction>
        </xs:simpleType>
        <xs:simpleType name="primary">
            <xs:restriction base="color"/>
        </xs:simpleType>
    </xs:schema>"###;

    fn grammar() -> Arc<Grammar> {
        let mut builder = GrammarBuilder::new(XsdVersion::Xsd10);
        builder
            .add_schema(SCHEMA, Location::String(SCHEMA.to_string()))
            .unwrap();
        Arc::new(builder.build().unwrap())
    }

    fn qname(local: &str) -> QName {
        QName::namespaced("urn:test", local)
    }

    #[test]
    fn test_grammar_ids_are_unique() {
        assert_ne!(GrammarId::next(), GrammarId::next());
        assert_ne!(grammar().id(), grammar().id());
    }

    #[test]
    fn test_global_lookup() {
        let grammar = grammar();
        let names: Vec<_> = grammar
            .global_elements()
            .filter_map(|id| grammar.element(id))
            .map(|e| e.local_name().to_string())
            .collect();
        assert_eq!(names, vec!["root", "shape", "circle", "square"]);
        assert!(grammar.lookup_element(&qname("circle")).is_some());
        assert!(grammar.lookup_element(&QName::local("circle")).is_none());
    }

    #[test]
    fn test_substitution_table() {
        let grammar = grammar();
        let shape = grammar.lookup_element(&qname("shape")).unwrap();
        let members: Vec<_> = grammar
            .substitution_group_of(shape)
            .iter()
            .map(|id| grammar.element(*id).unwrap().local_name().to_string())
            .collect();
        assert_eq!(members, vec!["circle", "square"]);

        let circle = grammar.lookup_element(&qname("circle")).unwrap();
        assert!(grammar.substitution_group_of(circle).is_empty());
    }

    #[test]
    fn test_static_children_include_members_and_globals() {
        let grammar = grammar();
        let root = grammar.lookup_element(&qname("root")).unwrap();
        let root_type = grammar.type_of(root).unwrap();
        assert!(grammar.automaton_for(root_type).is_some());

        let children = grammar.static_children(root_type);
        // shape, its members, then every global through the wildcard
        assert_eq!(children.len(), 4);
    }

    #[test]
    fn test_enumeration_inherited_from_base() {
        let grammar = grammar();
        let primary = grammar.lookup_type(&qname("primary")).unwrap();
        assert_eq!(grammar.enumeration_values(primary), vec!["red", "blue"]);
    }
}
