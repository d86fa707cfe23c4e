//! Grammar builder
//!
//! [`GrammarBuilder`] accumulates the components of one or more schema
//! documents and resolves them into an immutable [`Grammar`]:
//! - named group and element references are expanded into model groups
//! - complex type derivations merge base content and attribute uses
//! - element types are resolved, substitution members inheriting the type of
//!   their head
//! - the substitution group table is built in declaration order
//! - every complex type with element content gets a compiled automaton
//!
//! Unresolved references are not fatal: they are logged, recorded on the
//! grammar and the affected particle or type falls back to a neutral default.

use indexmap::{IndexMap, IndexSet};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::completion::cache::DeclarationCache;
use crate::error::{Error, ParseError, Result};
use crate::limits::Limits;
use crate::locations::Location;
use crate::namespaces::QName;

use super::attributes::{merge_attributes, XsdAttribute, XsdAttributeGroup};
use super::builtins::{
    any_type, is_any_type, is_builtin_simple_type, xsd_name, XSD_ANY_TYPE,
};
use super::complex_types::{ComplexContent, DerivationMethod, TypeDefinition, XsdComplexType};
use super::elements::{TypeRef, XsdElement};
use super::globals::{ElementDeclId, Grammar, GrammarId, ModelSlot, TypeId};
use super::groups::{ElementParticle, GroupParticle, ModelType, XsdGroup};
use super::models::ContentAutomaton;
use super::parsing::{self, SchemaReference};
use super::simple_types::XsdSimpleType;

/// XSD version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum XsdVersion {
    /// XSD 1.0
    #[default]
    Xsd10,
    /// XSD 1.1
    Xsd11,
}

impl XsdVersion {
    /// Parse from string
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim() {
            "1.0" => Ok(XsdVersion::Xsd10),
            "1.1" => Ok(XsdVersion::Xsd11),
            _ => Err(Error::Value(format!(
                "Invalid XSD version: '{}'. Must be '1.0' or '1.1'",
                s
            ))),
        }
    }

    /// Get as string
    pub fn as_str(&self) -> &'static str {
        match self {
            XsdVersion::Xsd10 => "1.0",
            XsdVersion::Xsd11 => "1.1",
        }
    }
}

impl std::fmt::Display for XsdVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Accumulates schema components and resolves them into a [`Grammar`]
#[derive(Debug)]
pub struct GrammarBuilder {
    version: XsdVersion,
    limits: Limits,
    target_namespace: Option<String>,
    locations: Vec<Location>,
    elements: Vec<XsdElement>,
    types: Vec<TypeDefinition>,
    global_elements: IndexMap<QName, ElementDeclId>,
    global_types: IndexMap<QName, TypeId>,
    groups: IndexMap<QName, XsdGroup>,
    attribute_groups: IndexMap<QName, XsdAttributeGroup>,
    global_attributes: IndexMap<QName, XsdAttribute>,
    builtin_types: HashMap<String, TypeId>,
    errors: Vec<ParseError>,
}

impl GrammarBuilder {
    /// Create a builder for the given XSD version
    pub fn new(version: XsdVersion) -> Self {
        Self {
            version,
            limits: Limits::default(),
            target_namespace: None,
            locations: Vec::new(),
            elements: Vec::new(),
            types: Vec::new(),
            global_elements: IndexMap::new(),
            global_types: IndexMap::new(),
            groups: IndexMap::new(),
            attribute_groups: IndexMap::new(),
            global_attributes: IndexMap::new(),
            builtin_types: HashMap::new(),
            errors: Vec::new(),
        }
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// XSD version the grammar will be compiled for
    pub fn version(&self) -> XsdVersion {
        self.version
    }

    /// Limits applied while parsing and compiling
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Schema documents added so far
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// Problems recorded so far
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Parse a schema document and add its components.
    ///
    /// Returns the `include`/`import`/`redefine` references found in the
    /// document; loading them is up to the caller.
    pub fn add_schema(&mut self, text: &str, location: Location) -> Result<Vec<SchemaReference>> {
        self.add_schema_with_namespace(text, location, None)
    }

    /// Like [`add_schema`](Self::add_schema), for a document included from a
    /// schema with the given target namespace (chameleon include).
    pub fn add_schema_with_namespace(
        &mut self,
        text: &str,
        location: Location,
        including_namespace: Option<&str>,
    ) -> Result<Vec<SchemaReference>> {
        self.limits.check_schema_size(text.len())?;
        let options = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..roxmltree::ParsingOptions::default()
        };
        let doc = roxmltree::Document::parse_with_options(text, options)?;

        let document = self.locations.len();
        debug!(location = %location, document, "adding schema document");
        self.locations.push(location);
        parsing::parse_schema(self, &doc, document, including_namespace)
    }

    // -------------------------------------------------------------------------
    // Component registration, used by the schema parser
    // -------------------------------------------------------------------------

    pub(crate) fn require_version(&mut self, version: XsdVersion) {
        if version > self.version {
            debug!(%version, "schema requires a newer XSD version");
            self.version = version;
        }
    }

    pub(crate) fn set_target_namespace(&mut self, namespace: Option<&str>) {
        if self.locations.len() == 1 {
            self.target_namespace = namespace.map(String::from);
        }
    }

    pub(crate) fn add_element(&mut self, element: XsdElement) -> ElementDeclId {
        let id = ElementDeclId(self.elements.len() as u32);
        self.elements.push(element);
        id
    }

    pub(crate) fn register_global_element(&mut self, id: ElementDeclId) {
        let Some(name) = self.elements.get(id.0 as usize).map(|e| e.name.clone()) else {
            return;
        };
        if self.global_elements.contains_key(&name) {
            self.report(ParseError::new(format!("duplicate global element '{}'", name)));
        } else {
            self.global_elements.insert(name, id);
        }
    }

    pub(crate) fn add_type(&mut self, definition: TypeDefinition) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(definition);
        id
    }

    pub(crate) fn register_global_type(&mut self, name: QName, id: TypeId) {
        if self.global_types.contains_key(&name) {
            self.report(ParseError::new(format!("duplicate global type '{}'", name)));
        } else {
            self.global_types.insert(name, id);
        }
    }

    pub(crate) fn register_group(&mut self, name: QName, group: XsdGroup) {
        self.groups.insert(name, group);
    }

    pub(crate) fn register_attribute_group(&mut self, group: XsdAttributeGroup) {
        self.attribute_groups.insert(group.name.clone(), group);
    }

    pub(crate) fn register_global_attribute(&mut self, attribute: XsdAttribute) {
        self.global_attributes
            .insert(attribute.name.clone(), attribute);
    }

    pub(crate) fn report(&mut self, error: ParseError) {
        warn!(error = %error.message, "schema problem");
        self.errors.push(error);
    }

    // -------------------------------------------------------------------------
    // Resolution
    // -------------------------------------------------------------------------

    /// Resolve all references and compile the content models
    pub fn build(mut self) -> Result<Grammar> {
        self.limits
            .check_schema_components(self.elements.len() + self.types.len())?;

        self.resolve_model_groups();
        self.resolve_simple_types();
        self.resolve_complex_types();
        self.resolve_element_types();
        self.normalize_empty_content();
        let substitution_groups = self.build_substitution_groups();
        let models = self.compile_models(&substitution_groups);

        let grammar = Grammar {
            id: GrammarId::next(),
            version: self.version,
            target_namespace: self.target_namespace,
            locations: self.locations,
            elements: self.elements,
            types: self.types,
            global_elements: self.global_elements,
            global_types: self.global_types,
            substitution_groups,
            models,
            errors: self.errors,
            declarations: DeclarationCache::new(),
        };
        debug!(
            grammar = %grammar.id,
            elements = grammar.elements.len(),
            types = grammar.types.len(),
            errors = grammar.errors.len(),
            "grammar built"
        );
        Ok(grammar)
    }

    fn builtin_type(&mut self, local_name: &str) -> TypeId {
        if let Some(id) = self.builtin_types.get(local_name) {
            return *id;
        }
        let definition = if local_name == XSD_ANY_TYPE {
            TypeDefinition::Complex(any_type())
        } else {
            TypeDefinition::Simple(XsdSimpleType::builtin(xsd_name(local_name)))
        };
        let id = self.add_type(definition);
        self.builtin_types.insert(local_name.to_string(), id);
        id
    }

    fn resolve_type_name(&mut self, name: &QName) -> Option<TypeId> {
        if let Some(id) = self.global_types.get(name) {
            return Some(*id);
        }
        if is_any_type(name) || is_builtin_simple_type(name) {
            return Some(self.builtin_type(&name.local_name));
        }
        None
    }

    fn resolve_type_ref(&mut self, type_ref: &TypeRef, context: &str) -> Option<TypeId> {
        match type_ref {
            TypeRef::Named(name) => {
                let resolved = self.resolve_type_name(name);
                if resolved.is_none() {
                    self.report(ParseError::new(format!(
                        "unknown type '{}' referenced by {}",
                        name, context
                    )));
                }
                resolved
            }
            TypeRef::Definition(id) => Some(*id),
            TypeRef::Unspecified => None,
        }
    }

    /// Expand group and element references inside model groups
    fn resolve_model_groups(&mut self) {
        let mut types = std::mem::take(&mut self.types);
        let mut errors = Vec::new();
        for definition in types.iter_mut() {
            if let TypeDefinition::Complex(ct) = definition {
                if let ComplexContent::Group(group) = &ct.content {
                    let expanded = self.expand_group(group, &mut Vec::new(), 1, &mut errors);
                    ct.content = ComplexContent::Group(unwrap_single_group(expanded));
                }
            }
        }
        self.types = types;
        for error in errors {
            self.report(error);
        }
    }

    fn expand_group(
        &self,
        group: &XsdGroup,
        stack: &mut Vec<QName>,
        depth: usize,
        errors: &mut Vec<ParseError>,
    ) -> XsdGroup {
        let mut out = XsdGroup::new(group.model).with_occurs(group.occurs);
        if let Err(err) = self.limits.check_model_depth(depth) {
            errors.push(ParseError::new(err.to_string()));
            return out;
        }

        for particle in &group.particles {
            match particle {
                GroupParticle::ElementRef { name, occurs } => match self.global_elements.get(name) {
                    Some(decl) => out.push(GroupParticle::Element(ElementParticle {
                        decl: *decl,
                        occurs: *occurs,
                    })),
                    None => errors.push(ParseError::new(format!(
                        "unknown element '{}' referenced in a content model",
                        name
                    ))),
                },
                GroupParticle::GroupRef { name, occurs } => {
                    if stack.contains(name) {
                        errors.push(ParseError::new(format!(
                            "circular reference to model group '{}'",
                            name
                        )));
                        continue;
                    }
                    let Some(definition) = self.groups.get(name) else {
                        errors.push(ParseError::new(format!("unknown model group '{}'", name)));
                        continue;
                    };
                    stack.push(name.clone());
                    let expanded = self
                        .expand_group(definition, stack, depth + 1, errors)
                        .with_occurs(*occurs);
                    stack.pop();
                    out.push(GroupParticle::Group(expanded));
                }
                GroupParticle::Group(inner) => {
                    out.push(GroupParticle::Group(
                        self.expand_group(inner, stack, depth + 1, errors),
                    ));
                }
                other => out.push(other.clone()),
            }
        }
        out
    }

    fn resolve_simple_types(&mut self) {
        for index in 0..self.types.len() {
            let TypeDefinition::Simple(st) = &self.types[index] else {
                continue;
            };
            if st.builtin {
                continue;
            }
            let base = st.base.clone();
            let context = format!("simple type '{}'", self.types[index].display_name());
            let base_id = self.resolve_type_ref(&base, &context);
            if let TypeDefinition::Simple(st) = &mut self.types[index] {
                st.base_id = base_id;
            }
        }
    }

    fn resolve_complex_types(&mut self) {
        let mut done = HashSet::new();
        let mut visiting = HashSet::new();
        for index in 0..self.types.len() {
            self.resolve_complex(index, &mut visiting, &mut done);
        }
    }

    fn resolve_complex(
        &mut self,
        index: usize,
        visiting: &mut HashSet<usize>,
        done: &mut HashSet<usize>,
    ) {
        if done.contains(&index) {
            return;
        }
        let Some(TypeDefinition::Complex(ct)) = self.types.get(index) else {
            done.insert(index);
            return;
        };
        let mut ct = ct.clone();
        if !visiting.insert(index) {
            let name = self.types[index].display_name();
            self.report(ParseError::new(format!(
                "circular derivation of complex type '{}'",
                name
            )));
            return;
        }

        let context = format!("complex type '{}'", self.types[index].display_name());

        let own_attributes = self.resolve_attribute_uses(&ct.attributes, &ct.attribute_group_refs);
        ct.attributes = own_attributes;
        ct.attribute_group_refs.clear();

        if let Some((method, base_name)) = ct.derivation.clone() {
            match self.resolve_type_name(&base_name) {
                Some(base_id) if base_id.0 as usize == index => {
                    self.report(ParseError::new(format!("{} derives from itself", context)));
                }
                Some(base_id) => {
                    let base_index = base_id.0 as usize;
                    self.resolve_complex(base_index, visiting, done);
                    match (self.types[base_index].clone(), method) {
                        (TypeDefinition::Complex(base), DerivationMethod::Extension) => {
                            ct.attributes = merge_attributes(&base.attributes, &ct.attributes);
                            ct.content = self.extend_content(&base.content, ct.content);
                            ct.mixed = ct.mixed || base.mixed;
                        }
                        (TypeDefinition::Complex(base), DerivationMethod::Restriction) => {
                            ct.attributes = merge_attributes(&base.attributes, &ct.attributes);
                            if ct.content == ComplexContent::Simple(TypeRef::Unspecified) {
                                ct.content = base.content;
                            }
                        }
                        (TypeDefinition::Simple(_), _) => {
                            if ct.content == ComplexContent::Simple(TypeRef::Unspecified) {
                                ct.content = ComplexContent::Simple(TypeRef::Definition(base_id));
                            }
                        }
                    }
                }
                None => {
                    self.report(ParseError::new(format!(
                        "unknown base type '{}' of {}",
                        base_name, context
                    )));
                }
            }
        }

        ct.attributes.retain(|a| !a.is_prohibited());

        if let ComplexContent::Simple(TypeRef::Named(name)) = &ct.content {
            let name = name.clone();
            ct.content = ComplexContent::Simple(
                self.resolve_type_name(&name)
                    .map(TypeRef::Definition)
                    .unwrap_or_default(),
            );
        }

        self.types[index] = TypeDefinition::Complex(ct);
        visiting.remove(&index);
        done.insert(index);
    }

    fn extend_content(&self, base: &ComplexContent, own: ComplexContent) -> ComplexContent {
        match (base, own) {
            (ComplexContent::Simple(base), _) => ComplexContent::Simple(base.clone()),
            (ComplexContent::Empty, own) => own,
            (base, ComplexContent::Empty) => base.clone(),
            (_, ComplexContent::Simple(own)) => ComplexContent::Simple(own),
            (ComplexContent::Group(base), ComplexContent::Group(own)) => {
                if self.version == XsdVersion::Xsd11
                    && base.model == ModelType::All
                    && own.model == ModelType::All
                {
                    let mut merged = base.clone();
                    merged.particles.extend(own.particles);
                    return ComplexContent::Group(merged);
                }
                let mut sequence = XsdGroup::new(ModelType::Sequence);
                sequence.push(GroupParticle::Group(base.clone()));
                sequence.push(GroupParticle::Group(own));
                ComplexContent::Group(sequence)
            }
        }
    }

    /// Flatten attribute group references and resolve attribute references
    /// and types
    fn resolve_attribute_uses(
        &mut self,
        attributes: &[XsdAttribute],
        group_refs: &[QName],
    ) -> Vec<XsdAttribute> {
        let mut errors = Vec::new();
        let from_groups = self.collect_attribute_groups(group_refs, &mut Vec::new(), &mut errors);
        for error in errors {
            self.report(error);
        }

        // Prohibited uses are kept until merged with the base type
        let mut merged = from_groups;
        for attribute in attributes {
            merged.retain(|a| a.name != attribute.name);
            merged.push(attribute.clone());
        }

        let mut resolved = Vec::with_capacity(merged.len());
        for attribute in merged {
            let mut attribute = self.resolve_attribute_reference(attribute);
            let context = format!("attribute '{}'", attribute.name);
            attribute.type_id = self.resolve_type_ref(&attribute.type_ref, &context);
            resolved.push(attribute);
        }
        resolved
    }

    fn collect_attribute_groups(
        &self,
        refs: &[QName],
        stack: &mut Vec<QName>,
        errors: &mut Vec<ParseError>,
    ) -> Vec<XsdAttribute> {
        let mut out = Vec::new();
        for name in refs {
            if stack.contains(name) {
                errors.push(ParseError::new(format!(
                    "circular reference to attribute group '{}'",
                    name
                )));
                continue;
            }
            let Some(group) = self.attribute_groups.get(name) else {
                errors.push(ParseError::new(format!("unknown attribute group '{}'", name)));
                continue;
            };
            stack.push(name.clone());
            let nested = self.collect_attribute_groups(&group.group_refs, stack, errors);
            stack.pop();
            out = merge_attributes(&out, &nested);
            out = merge_attributes(&out, &group.attributes);
        }
        out
    }

    fn resolve_attribute_reference(&mut self, mut attribute: XsdAttribute) -> XsdAttribute {
        let Some(reference) = attribute.reference.take() else {
            return attribute;
        };
        match self.global_attributes.get(&reference) {
            Some(global) => {
                attribute.name = global.name.clone();
                attribute.type_ref = global.type_ref.clone();
                if attribute.documentation.is_none() {
                    attribute.documentation = global.documentation.clone();
                }
                if attribute.default.is_none() && attribute.fixed.is_none() {
                    attribute.default = global.default.clone();
                    attribute.fixed = global.fixed.clone();
                }
            }
            None => self.report(ParseError::new(format!(
                "unknown attribute '{}' referenced",
                reference
            ))),
        }
        attribute
    }

    fn resolve_element_types(&mut self) {
        let mut visiting = HashSet::new();
        for index in 0..self.elements.len() {
            self.resolve_element_type(index, &mut visiting);
        }
    }

    fn resolve_element_type(&mut self, index: usize, visiting: &mut HashSet<usize>) -> Option<TypeId> {
        if let Some(id) = self.elements[index].type_id {
            return Some(id);
        }
        if !visiting.insert(index) {
            return None;
        }

        let context = format!("element '{}'", self.elements[index].name);
        let type_ref = self.elements[index].type_ref.clone();
        let resolved = match type_ref {
            TypeRef::Unspecified => {
                // Substitution group members default to the type of their head
                let heads: Vec<usize> = self.elements[index]
                    .substitution_group
                    .iter()
                    .filter_map(|head| self.global_elements.get(head))
                    .map(|id| id.0 as usize)
                    .collect();
                heads
                    .into_iter()
                    .find_map(|head| self.resolve_element_type(head, visiting))
            }
            other => self.resolve_type_ref(&other, &context),
        };
        let type_id = resolved.unwrap_or_else(|| self.builtin_type(XSD_ANY_TYPE));

        self.elements[index].type_id = Some(type_id);
        visiting.remove(&index);
        Some(type_id)
    }

    /// Model groups without any particle are empty content
    fn normalize_empty_content(&mut self) {
        for definition in self.types.iter_mut() {
            if let TypeDefinition::Complex(ct) = definition {
                let is_empty = ct.model_group().is_some_and(|group| {
                    group.iter_elements().is_empty() && group.iter_wildcards().is_empty()
                });
                if is_empty {
                    ct.content = ComplexContent::Empty;
                }
            }
        }
    }

    fn build_substitution_groups(&mut self) -> HashMap<ElementDeclId, Vec<ElementDeclId>> {
        let mut table: HashMap<ElementDeclId, Vec<ElementDeclId>> = HashMap::new();
        let mut errors = Vec::new();
        for (index, element) in self.elements.iter().enumerate() {
            for head in &element.substitution_group {
                match self.global_elements.get(head) {
                    Some(head_id) => {
                        let members = table.entry(*head_id).or_default();
                        let member = ElementDeclId(index as u32);
                        if !members.contains(&member) {
                            members.push(member);
                        }
                    }
                    None => errors.push(ParseError::new(format!(
                        "unknown substitution group head '{}' of element '{}'",
                        head, element.name
                    ))),
                }
            }
        }
        for error in errors {
            self.report(error);
        }
        table
    }

    fn compile_models(
        &mut self,
        substitution_groups: &HashMap<ElementDeclId, Vec<ElementDeclId>>,
    ) -> Vec<ModelSlot> {
        let elements = &self.elements;
        // Names an element particle matches: the head and its transitive members
        let accepts = |decl: ElementDeclId| {
            let mut names = IndexSet::new();
            let mut seen = HashSet::new();
            let mut pending = vec![decl];
            while let Some(current) = pending.pop() {
                if !seen.insert(current) {
                    continue;
                }
                if let Some(element) = elements.get(current.0 as usize) {
                    names.insert(element.name.clone());
                }
                if let Some(members) = substitution_groups.get(&current) {
                    pending.extend(members.iter().rev().copied());
                }
            }
            names
        };

        let mut errors = Vec::new();
        let models = self
            .types
            .iter()
            .map(|definition| {
                let Some(group) = definition.as_complex().and_then(XsdComplexType::model_group)
                else {
                    return ModelSlot::NoContentModel;
                };
                match ContentAutomaton::compile(group, &accepts, self.version, &self.limits) {
                    Ok(automaton) => ModelSlot::Compiled(automaton),
                    Err(err) => {
                        errors.push(ParseError::new(format!(
                            "content model of type '{}' rejected: {}",
                            definition.display_name(),
                            err
                        )));
                        ModelSlot::Rejected(err.to_string())
                    }
                }
            })
            .collect();

        for error in errors {
            self.report(error);
        }
        models
    }
}

/// A content model written as a lone group reference is the referenced group
fn unwrap_single_group(group: XsdGroup) -> XsdGroup {
    if group.model == ModelType::Sequence && group.occurs == super::particles::Occurs::once() {
        if let [GroupParticle::Group(inner)] = group.particles.as_slice() {
            return inner.clone();
        }
    }
    group
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::complex_types::ContentKind;
    use crate::grammar::models::{CandidateTerm, ContentModel, ModelVariant};

    fn build(schema: &str, version: XsdVersion) -> Grammar {
        let mut builder = GrammarBuilder::new(version);
        builder
            .add_schema(schema, Location::String(schema.to_string()))
            .unwrap();
        builder.build().unwrap()
    }

    fn type_of(grammar: &Grammar, element: &str) -> TypeId {
        let decl = grammar.lookup_element(&QName::local(element)).unwrap();
        grammar.type_of(decl).unwrap()
    }

    #[test]
    fn test_version_parse() {
        assert_eq!(XsdVersion::parse("1.1").unwrap(), XsdVersion::Xsd11);
        assert!(XsdVersion::parse("2.0").is_err());
        assert_eq!(XsdVersion::Xsd10.to_string(), "1.0");
    }

    #[test]
    fn test_group_reference_expansion() {
        let grammar = build(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                <xs:group name="head">
                    <xs:sequence>
                        <xs:element name="title" type="xs:string"/>
                        <xs:element name="meta" minOccurs="0"/>
                    </xs:sequence>
                </xs:group>
                <xs:element name="doc">
                    <xs:complexType>
                        <xs:sequence>
                            <xs:group ref="head"/>
                            <xs:element name="body"/>
                        </xs:sequence>
                    </xs:complexType>
                </xs:element>
            </xs:schema>"#,
            XsdVersion::Xsd10,
        );
        assert!(grammar.errors().is_empty(), "{:?}", grammar.errors());
        let doc = type_of(&grammar, "doc");
        let automaton = grammar.automaton_for(doc).unwrap();
        let state = automaton.start();
        let (state, _) = automaton.step(&state, &QName::local("title")).unwrap();
        assert_eq!(automaton.candidates_after(&state).len(), 2);
    }

    #[test]
    fn test_circular_group_is_reported() {
        let grammar = build(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                <xs:group name="loop">
                    <xs:sequence>
                        <xs:element name="a"/>
                        <xs:group ref="loop" minOccurs="0"/>
                    </xs:sequence>
                </xs:group>
                <xs:element name="doc">
                    <xs:complexType><xs:group ref="loop"/></xs:complexType>
                </xs:element>
            </xs:schema>"#,
            XsdVersion::Xsd10,
        );
        assert!(grammar
            .errors()
            .iter()
            .any(|e| e.message.contains("circular reference")));
        assert!(grammar.automaton_for(type_of(&grammar, "doc")).is_some());
    }

    #[test]
    fn test_extension_sequences_base_content() {
        let grammar = build(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                <xs:complexType name="base">
                    <xs:sequence><xs:element name="a"/></xs:sequence>
                    <xs:attribute name="id" use="required"/>
                </xs:complexType>
                <xs:complexType name="derived">
                    <xs:complexContent>
                        <xs:extension base="base">
                            <xs:sequence><xs:element name="b"/></xs:sequence>
                            <xs:attribute name="lang"/>
                        </xs:extension>
                    </xs:complexContent>
                </xs:complexType>
                <xs:element name="doc" type="derived"/>
            </xs:schema>"#,
            XsdVersion::Xsd10,
        );
        let doc = type_of(&grammar, "doc");
        let attributes: Vec<_> = grammar
            .attributes_of(doc)
            .iter()
            .map(|a| a.name.local_name.as_str())
            .collect();
        assert_eq!(attributes, vec!["id", "lang"]);

        let automaton = grammar.automaton_for(doc).unwrap();
        assert!(automaton.step(&automaton.start(), &QName::local("b")).is_err());
        let (state, _) = automaton.step(&automaton.start(), &QName::local("a")).unwrap();
        assert!(automaton.step(&state, &QName::local("b")).is_ok());
    }

    #[test]
    fn test_member_inherits_head_type() {
        let grammar = build(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                <xs:element name="head" type="xs:int"/>
                <xs:element name="member" substitutionGroup="head"/>
                <xs:element name="untyped"/>
            </xs:schema>"#,
            XsdVersion::Xsd10,
        );
        assert_eq!(type_of(&grammar, "head"), type_of(&grammar, "member"));
        let untyped = grammar.type_definition(type_of(&grammar, "untyped")).unwrap();
        assert_eq!(untyped.content_kind(), ContentKind::Mixed);
    }

    #[test]
    fn test_unknown_references_are_recorded() {
        let grammar = build(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                <xs:element name="doc" type="missing"/>
                <xs:element name="other">
                    <xs:complexType>
                        <xs:sequence><xs:element ref="nowhere"/></xs:sequence>
                    </xs:complexType>
                </xs:element>
            </xs:schema>"#,
            XsdVersion::Xsd10,
        );
        assert_eq!(grammar.errors().len(), 2);
        // The sequence lost its only particle
        let other = grammar.type_definition(type_of(&grammar, "other")).unwrap();
        assert_eq!(other.content_kind(), ContentKind::Empty);
    }

    #[test]
    fn test_ambiguous_model_is_rejected() {
        let grammar = build(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                <xs:element name="doc">
                    <xs:complexType>
                        <xs:sequence>
                            <xs:element name="a" minOccurs="0"/>
                            <xs:element name="a"/>
                        </xs:sequence>
                    </xs:complexType>
                </xs:element>
            </xs:schema>"#,
            XsdVersion::Xsd10,
        );
        let doc = type_of(&grammar, "doc");
        assert!(matches!(grammar.model_slot(doc), Some(ModelSlot::Rejected(_))));
        assert!(grammar.automaton_for(doc).is_none());
    }

    #[test]
    fn test_all_group_variant() {
        let grammar = build(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                <xs:element name="doc">
                    <xs:complexType>
                        <xs:all>
                            <xs:element name="x" maxOccurs="unbounded"/>
                            <xs:element name="y" minOccurs="0"/>
                        </xs:all>
                    </xs:complexType>
                </xs:element>
            </xs:schema>"#,
            XsdVersion::Xsd11,
        );
        let automaton = grammar.automaton_for(type_of(&grammar, "doc")).unwrap();
        assert_eq!(automaton.variant(), ModelVariant::UnorderedXsd11);
        let x = grammar.static_children(type_of(&grammar, "doc"))[0];
        assert_eq!(
            automaton.unbounded_unordered_members(),
            vec![CandidateTerm::Element(x)]
        );
    }
}
