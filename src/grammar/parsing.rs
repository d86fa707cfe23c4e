//! XSD Document Parsing
//!
//! Reads one schema document into a [`GrammarBuilder`]. Cross-references stay
//! symbolic ([`TypeRef::Named`], [`GroupParticle::ElementRef`], ...) until the
//! builder resolves them, so the documents of a grammar can be added in any
//! order. References to other schema documents are handed back to the caller.

use roxmltree::{Document, Node};

use super::attributes::{AttributeUse, XsdAttribute, XsdAttributeGroup};
use super::builders::{GrammarBuilder, XsdVersion};
use super::builtins::XSD_NAMESPACE;
use super::complex_types::{ComplexContent, DerivationMethod, TypeDefinition, XsdComplexType};
use super::elements::{ElementForm, ElementScope, TypeRef, XsdElement};
use super::globals::{ElementDeclId, TypeId};
use super::groups::{ElementParticle, GroupParticle, ModelType, XsdGroup};
use super::particles::{parse_occurs, Occurs};
use super::simple_types::{SimpleVariety, XsdSimpleType};
use super::wildcards::{NamespaceConstraint, ProcessContents, XsdAnyElement};

use crate::error::{Error, ParseError, Result};
use crate::namespaces::QName;
use crate::XSD_1_1_NAMESPACE;

/// Namespace of the `vc:minVersion` attribute
const VERSIONING_NAMESPACE: &str = "http://www.w3.org/2007/XMLSchema-versioning";

/// XSD element local names
mod xsd_elements {
    pub const SCHEMA: &str = "schema";
    pub const ELEMENT: &str = "element";
    pub const COMPLEX_TYPE: &str = "complexType";
    pub const SIMPLE_TYPE: &str = "simpleType";
    pub const ATTRIBUTE: &str = "attribute";
    pub const ATTRIBUTE_GROUP: &str = "attributeGroup";
    pub const GROUP: &str = "group";
    pub const SEQUENCE: &str = "sequence";
    pub const CHOICE: &str = "choice";
    pub const ALL: &str = "all";
    pub const ANNOTATION: &str = "annotation";
    pub const DOCUMENTATION: &str = "documentation";
    pub const IMPORT: &str = "import";
    pub const INCLUDE: &str = "include";
    pub const REDEFINE: &str = "redefine";
    pub const OVERRIDE: &str = "override";
    pub const RESTRICTION: &str = "restriction";
    pub const EXTENSION: &str = "extension";
    pub const LIST: &str = "list";
    pub const UNION: &str = "union";
    pub const COMPLEX_CONTENT: &str = "complexContent";
    pub const SIMPLE_CONTENT: &str = "simpleContent";
    pub const ANY: &str = "any";
    pub const ENUMERATION: &str = "enumeration";
}

/// XSD attribute names
mod xsd_attrs {
    pub const NAME: &str = "name";
    pub const REF: &str = "ref";
    pub const TYPE: &str = "type";
    pub const BASE: &str = "base";
    pub const ITEM_TYPE: &str = "itemType";
    pub const MEMBER_TYPES: &str = "memberTypes";
    pub const MIN_OCCURS: &str = "minOccurs";
    pub const MAX_OCCURS: &str = "maxOccurs";
    pub const TARGET_NAMESPACE: &str = "targetNamespace";
    pub const ELEMENT_FORM_DEFAULT: &str = "elementFormDefault";
    pub const ATTRIBUTE_FORM_DEFAULT: &str = "attributeFormDefault";
    pub const FORM: &str = "form";
    pub const ABSTRACT: &str = "abstract";
    pub const NILLABLE: &str = "nillable";
    pub const MIXED: &str = "mixed";
    pub const DEFAULT: &str = "default";
    pub const FIXED: &str = "fixed";
    pub const USE: &str = "use";
    pub const SUBSTITUTION_GROUP: &str = "substitutionGroup";
    pub const NAMESPACE: &str = "namespace";
    pub const NOT_NAMESPACE: &str = "notNamespace";
    pub const PROCESS_CONTENTS: &str = "processContents";
    pub const SCHEMA_LOCATION: &str = "schemaLocation";
    pub const VALUE: &str = "value";
    pub const MIN_VERSION: &str = "minVersion";
}

/// Kind of a reference to another schema document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    /// `xs:include`: same target namespace
    Include,
    /// `xs:import`: another namespace
    Import,
    /// `xs:redefine` or `xs:override`, loaded like an include
    Redefine,
}

/// Reference to another schema document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaReference {
    /// Kind of reference
    pub kind: ReferenceKind,
    /// `schemaLocation` attribute, relative to the referencing document
    pub schema_location: Option<String>,
    /// `namespace` attribute of an import
    pub namespace: Option<String>,
    /// Target namespace of the referencing document
    pub referencing_namespace: Option<String>,
}

/// Check if a node is an XSD element with the given local name
fn is_xsd(node: &Node, local_name: &str) -> bool {
    node.is_element() && node.tag_name().name() == local_name && is_xsd_namespace(node)
}

fn is_xsd_namespace(node: &Node) -> bool {
    matches!(
        node.tag_name().namespace(),
        Some(XSD_NAMESPACE) | Some(XSD_1_1_NAMESPACE)
    )
}

/// XSD element children of a node
fn xsd_children<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|n| n.is_element() && is_xsd_namespace(n))
}

fn parse_bool(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some("true") | Some("1"))
}

/// Text of the first non-empty `xs:annotation/xs:documentation`
fn documentation(node: Node) -> Option<String> {
    xsd_children(node)
        .filter(|n| n.tag_name().name() == xsd_elements::ANNOTATION)
        .flat_map(xsd_children)
        .filter(|n| n.tag_name().name() == xsd_elements::DOCUMENTATION)
        .map(|doc| {
            doc.descendants()
                .filter(|n| n.is_text())
                .filter_map(|n| n.text())
                .collect::<String>()
        })
        .map(|text| text.trim().to_string())
        .find(|text| !text.is_empty())
}

fn position(node: Node) -> String {
    let pos = node.document().text_pos_at(node.range().start);
    format!("line {}, column {}", pos.row, pos.col)
}

fn into_parse_error(error: Error) -> ParseError {
    match error {
        Error::Parse(err) => err,
        other => ParseError::new(other.to_string()),
    }
}

/// Parse a schema document into the builder.
///
/// `including_namespace` is the target namespace of the including document
/// when this document is the target of an `xs:include`: a document without a
/// target namespace then takes it over.
pub(crate) fn parse_schema(
    builder: &mut GrammarBuilder,
    doc: &Document,
    document: usize,
    including_namespace: Option<&str>,
) -> Result<Vec<SchemaReference>> {
    let root = doc.root_element();
    if !is_xsd(&root, xsd_elements::SCHEMA) {
        return Err(ParseError::new(format!(
            "root element '{}' is not an XSD schema element",
            root.tag_name().name()
        ))
        .into());
    }

    if root.tag_name().namespace() == Some(XSD_1_1_NAMESPACE) {
        builder.require_version(XsdVersion::Xsd11);
    }
    if let Some(min_version) = root.attribute((VERSIONING_NAMESPACE, xsd_attrs::MIN_VERSION)) {
        if min_version.trim().parse::<f32>().is_ok_and(|v| v >= 1.1) {
            builder.require_version(XsdVersion::Xsd11);
        }
    }

    let declared = root
        .attribute(xsd_attrs::TARGET_NAMESPACE)
        .filter(|ns| !ns.is_empty());
    let chameleon = declared.is_none() && including_namespace.is_some();
    let target_namespace = declared.or(including_namespace).map(String::from);
    builder.set_target_namespace(target_namespace.as_deref());

    let mut parser = SchemaParser {
        builder,
        target_namespace,
        element_form: root
            .attribute(xsd_attrs::ELEMENT_FORM_DEFAULT)
            .and_then(ElementForm::parse)
            .unwrap_or_default(),
        attribute_form: root
            .attribute(xsd_attrs::ATTRIBUTE_FORM_DEFAULT)
            .and_then(ElementForm::parse)
            .unwrap_or_default(),
        document,
        chameleon,
        references: Vec::new(),
    };

    for child in xsd_children(root) {
        parser.parse_schema_child(child);
    }
    Ok(parser.references)
}

/// Per-document parsing state
struct SchemaParser<'b> {
    builder: &'b mut GrammarBuilder,
    target_namespace: Option<String>,
    element_form: ElementForm,
    attribute_form: ElementForm,
    document: usize,
    chameleon: bool,
    references: Vec<SchemaReference>,
}

impl SchemaParser<'_> {
    fn report(&mut self, node: Node, message: impl Into<String>) {
        self.builder
            .report(ParseError::new(message).with_location(position(node)));
    }

    fn global_name(&self, local_name: &str) -> QName {
        QName::new(self.target_namespace.clone(), local_name)
    }

    /// Resolve a `prefix:local` reference against the namespace scope of a node
    fn resolve_qname(&self, node: Node, value: &str) -> std::result::Result<QName, ParseError> {
        let value = value.trim();
        let (prefix, local) = match value.split_once(':') {
            Some((prefix, local)) => (Some(prefix), local),
            None => (None, value),
        };
        if local.is_empty() {
            return Err(ParseError::new(format!("invalid qualified name '{}'", value)));
        }

        let namespace = match prefix {
            Some(prefix) => Some(node.lookup_namespace_uri(Some(prefix)).ok_or_else(|| {
                ParseError::new(format!("unknown namespace prefix '{}' in '{}'", prefix, value))
            })?),
            None => node.lookup_namespace_uri(None),
        };
        let namespace = match namespace {
            Some(XSD_1_1_NAMESPACE) => Some(XSD_NAMESPACE),
            Some("") => None,
            other => other,
        };
        let namespace = match namespace {
            None if self.chameleon => self.target_namespace.as_deref(),
            other => other,
        };
        Ok(QName::new(namespace, local))
    }

    fn resolve_attr(&mut self, node: Node, attribute: &str) -> Option<QName> {
        let value = node.attribute(attribute)?;
        match self.resolve_qname(node, value) {
            Ok(name) => Some(name),
            Err(err) => {
                self.builder.report(err.with_location(position(node)));
                None
            }
        }
    }

    fn occurs(&mut self, node: Node) -> Occurs {
        match parse_occurs(
            node.attribute(xsd_attrs::MIN_OCCURS),
            node.attribute(xsd_attrs::MAX_OCCURS),
        ) {
            Ok(occurs) => occurs,
            Err(err) => {
                self.builder
                    .report(into_parse_error(err).with_location(position(node)));
                Occurs::once()
            }
        }
    }

    fn parse_schema_child(&mut self, node: Node) {
        match node.tag_name().name() {
            xsd_elements::ELEMENT => {
                self.parse_element_decl(node, ElementScope::Global);
            }
            xsd_elements::COMPLEX_TYPE => {
                if let Some(name) = self.required_name(node) {
                    let id = self.parse_complex_type(node, Some(name.clone()));
                    self.builder.register_global_type(name, id);
                }
            }
            xsd_elements::SIMPLE_TYPE => {
                if let Some(name) = self.required_name(node) {
                    let id = self.parse_simple_type(node, Some(name.clone()));
                    self.builder.register_global_type(name, id);
                }
            }
            xsd_elements::ATTRIBUTE => {
                if let Some(attribute) = self.parse_attribute(node, true) {
                    self.builder.register_global_attribute(attribute);
                }
            }
            xsd_elements::ATTRIBUTE_GROUP => self.parse_attribute_group(node),
            xsd_elements::GROUP => self.parse_named_group(node),
            xsd_elements::INCLUDE => self.add_reference(node, ReferenceKind::Include),
            xsd_elements::IMPORT => self.add_reference(node, ReferenceKind::Import),
            xsd_elements::REDEFINE | xsd_elements::OVERRIDE => {
                tracing::debug!("redefined components are ignored, loading as include");
                self.add_reference(node, ReferenceKind::Redefine)
            }
            // annotation, notation, defaultOpenContent
            _ => {}
        }
    }

    fn required_name(&mut self, node: Node) -> Option<QName> {
        match node.attribute(xsd_attrs::NAME) {
            Some(name) => Some(self.global_name(name.trim())),
            None => {
                self.report(
                    node,
                    format!("global '{}' without a name", node.tag_name().name()),
                );
                None
            }
        }
    }

    fn add_reference(&mut self, node: Node, kind: ReferenceKind) {
        self.references.push(SchemaReference {
            kind,
            schema_location: node
                .attribute(xsd_attrs::SCHEMA_LOCATION)
                .map(|s| s.trim().to_string()),
            namespace: node
                .attribute(xsd_attrs::NAMESPACE)
                .map(|s| s.trim().to_string()),
            referencing_namespace: self.target_namespace.clone(),
        });
    }

    fn parse_element_decl(&mut self, node: Node, scope: ElementScope) -> Option<ElementDeclId> {
        let Some(local_name) = node.attribute(xsd_attrs::NAME) else {
            self.report(node, "element declaration without a name");
            return None;
        };
        let name = match scope {
            ElementScope::Global => self.global_name(local_name.trim()),
            ElementScope::Local => {
                let form = node
                    .attribute(xsd_attrs::FORM)
                    .and_then(ElementForm::parse)
                    .unwrap_or(self.element_form);
                match form {
                    ElementForm::Qualified => self.global_name(local_name.trim()),
                    ElementForm::Unqualified => QName::local(local_name.trim()),
                }
            }
        };

        let mut element = XsdElement::new(name, scope);
        element.document = self.document;
        element.type_ref = self.type_ref(node);
        element.is_abstract = parse_bool(node.attribute(xsd_attrs::ABSTRACT));
        element.nillable = parse_bool(node.attribute(xsd_attrs::NILLABLE));
        element.default = node.attribute(xsd_attrs::DEFAULT).map(String::from);
        element.fixed = node.attribute(xsd_attrs::FIXED).map(String::from);
        element.documentation = documentation(node);

        if let Some(heads) = node.attribute(xsd_attrs::SUBSTITUTION_GROUP) {
            for head in heads.split_whitespace() {
                match self.resolve_qname(node, head) {
                    Ok(head) => element.substitution_group.push(head),
                    Err(err) => self.builder.report(err.with_location(position(node))),
                }
            }
            if element.substitution_group.len() > 1 {
                self.builder.require_version(XsdVersion::Xsd11);
            }
        }

        let id = self.builder.add_element(element);
        if scope == ElementScope::Global {
            self.builder.register_global_element(id);
        }
        Some(id)
    }

    /// Type of an element or attribute: `type` attribute or inline definition
    fn type_ref(&mut self, node: Node) -> TypeRef {
        if let Some(name) = self.resolve_attr(node, xsd_attrs::TYPE) {
            return TypeRef::Named(name);
        }
        for child in xsd_children(node) {
            match child.tag_name().name() {
                xsd_elements::COMPLEX_TYPE => {
                    return TypeRef::Definition(self.parse_complex_type(child, None))
                }
                xsd_elements::SIMPLE_TYPE => {
                    return TypeRef::Definition(self.parse_simple_type(child, None))
                }
                _ => {}
            }
        }
        TypeRef::Unspecified
    }

    fn parse_model_group(&mut self, node: Node) -> XsdGroup {
        let model = ModelType::from_tag(node.tag_name().name()).unwrap_or(ModelType::Sequence);
        let occurs = self.occurs(node);
        let mut group = XsdGroup::new(model).with_occurs(occurs);

        for child in xsd_children(node) {
            match child.tag_name().name() {
                xsd_elements::ELEMENT => {
                    if let Some(particle) = self.parse_element_particle(child) {
                        group.push(particle);
                    }
                }
                xsd_elements::ANY => group.push(GroupParticle::Any(self.parse_any(child))),
                xsd_elements::SEQUENCE | xsd_elements::CHOICE | xsd_elements::ALL => {
                    let nested = self.parse_model_group(child);
                    group.push(GroupParticle::Group(nested));
                }
                xsd_elements::GROUP => {
                    if let Some(particle) = self.parse_group_ref(child) {
                        group.push(particle);
                    }
                }
                xsd_elements::ANNOTATION => {}
                other => self.report(
                    child,
                    format!("unexpected '{}' in a '{}' group", other, model),
                ),
            }
        }
        group
    }

    fn parse_element_particle(&mut self, node: Node) -> Option<GroupParticle> {
        let occurs = self.occurs(node);
        if node.attribute(xsd_attrs::REF).is_some() {
            let name = self.resolve_attr(node, xsd_attrs::REF)?;
            return Some(GroupParticle::ElementRef { name, occurs });
        }
        let decl = self.parse_element_decl(node, ElementScope::Local)?;
        Some(GroupParticle::Element(ElementParticle { decl, occurs }))
    }

    fn parse_group_ref(&mut self, node: Node) -> Option<GroupParticle> {
        let occurs = self.occurs(node);
        match self.resolve_attr(node, xsd_attrs::REF) {
            Some(name) => Some(GroupParticle::GroupRef { name, occurs }),
            None => {
                self.report(node, "group reference without a 'ref' attribute");
                None
            }
        }
    }

    fn parse_any(&mut self, node: Node) -> XsdAnyElement {
        let occurs = self.occurs(node);
        let process_contents = node
            .attribute(xsd_attrs::PROCESS_CONTENTS)
            .and_then(ProcessContents::parse)
            .unwrap_or_default();

        let tns = self.target_namespace.clone();
        let constraint = match (
            node.attribute(xsd_attrs::NAMESPACE),
            node.attribute(xsd_attrs::NOT_NAMESPACE),
        ) {
            (_, Some(not)) => NamespaceConstraint::from_not_namespace_attr(not, tns.as_deref()),
            (Some(namespace), None) => {
                NamespaceConstraint::from_namespace_attr(namespace, tns.as_deref())
            }
            (None, None) => Ok(NamespaceConstraint::Any),
        };
        let constraint = constraint.unwrap_or_else(|err| {
            self.builder.report(err.with_location(position(node)));
            NamespaceConstraint::Any
        });

        XsdAnyElement::new(process_contents, occurs).with_namespace(constraint)
    }

    fn parse_named_group(&mut self, node: Node) {
        let Some(name) = self.required_name(node) else {
            return;
        };
        let group = xsd_children(node)
            .find(|child| ModelType::from_tag(child.tag_name().name()).is_some())
            .map(|child| self.parse_model_group(child))
            .unwrap_or_else(|| XsdGroup::new(ModelType::Sequence));
        self.builder.register_group(name, group);
    }

    fn parse_complex_type(&mut self, node: Node, name: Option<QName>) -> TypeId {
        let mut ct = XsdComplexType::new(name);
        ct.mixed = parse_bool(node.attribute(xsd_attrs::MIXED));
        ct.is_abstract = parse_bool(node.attribute(xsd_attrs::ABSTRACT));
        ct.documentation = documentation(node);

        for child in xsd_children(node) {
            match child.tag_name().name() {
                xsd_elements::COMPLEX_CONTENT => {
                    if child.attribute(xsd_attrs::MIXED).is_some() {
                        ct.mixed = parse_bool(child.attribute(xsd_attrs::MIXED));
                    }
                    if let Some((method, derivation)) = self.derivation(child) {
                        if let Some(base) = self.resolve_attr(derivation, xsd_attrs::BASE) {
                            ct.derivation = Some((method, base));
                        }
                        self.parse_complex_body(derivation, &mut ct);
                    }
                }
                xsd_elements::SIMPLE_CONTENT => self.parse_simple_content(child, &mut ct),
                _ => self.parse_complex_child(child, &mut ct),
            }
        }

        self.builder.add_type(TypeDefinition::Complex(ct))
    }

    fn derivation<'a, 'input>(
        &mut self,
        node: Node<'a, 'input>,
    ) -> Option<(DerivationMethod, Node<'a, 'input>)> {
        let found = xsd_children(node).find_map(|child| match child.tag_name().name() {
            xsd_elements::EXTENSION => Some((DerivationMethod::Extension, child)),
            xsd_elements::RESTRICTION => Some((DerivationMethod::Restriction, child)),
            _ => None,
        });
        if found.is_none() {
            self.report(node, "derivation without 'extension' or 'restriction'");
        }
        found
    }

    /// Apply the model group and attribute children of a node to a complex type
    fn parse_complex_body(&mut self, node: Node, ct: &mut XsdComplexType) {
        for child in xsd_children(node) {
            self.parse_complex_child(child, ct);
        }
    }

    fn parse_complex_child(&mut self, child: Node, ct: &mut XsdComplexType) {
        match child.tag_name().name() {
            xsd_elements::SEQUENCE | xsd_elements::CHOICE | xsd_elements::ALL => {
                ct.content = ComplexContent::Group(self.parse_model_group(child));
            }
            xsd_elements::GROUP => {
                if let Some(particle) = self.parse_group_ref(child) {
                    let mut group = XsdGroup::new(ModelType::Sequence);
                    group.push(particle);
                    ct.content = ComplexContent::Group(group);
                }
            }
            xsd_elements::ATTRIBUTE => {
                if let Some(attribute) = self.parse_attribute(child, false) {
                    ct.attributes.push(attribute);
                }
            }
            xsd_elements::ATTRIBUTE_GROUP => {
                if let Some(name) = self.resolve_attr(child, xsd_attrs::REF) {
                    ct.attribute_group_refs.push(name);
                }
            }
            // anyAttribute, assert, openContent, annotation
            _ => {}
        }
    }

    fn parse_simple_content(&mut self, node: Node, ct: &mut XsdComplexType) {
        ct.content = ComplexContent::Simple(TypeRef::Unspecified);
        let Some((method, derivation)) = self.derivation(node) else {
            return;
        };
        let base = self.resolve_attr(derivation, xsd_attrs::BASE);
        if let Some(base) = &base {
            ct.derivation = Some((method, base.clone()));
        }

        let mut restricted: Option<XsdSimpleType> = None;
        for child in xsd_children(derivation) {
            match child.tag_name().name() {
                xsd_elements::ENUMERATION if method == DerivationMethod::Restriction => {
                    if let Some(value) = child.attribute(xsd_attrs::VALUE) {
                        restricted
                            .get_or_insert_with(|| XsdSimpleType::new(None))
                            .enumeration
                            .push(value.to_string());
                    }
                }
                xsd_elements::SIMPLE_TYPE => {
                    let inline = self.parse_simple_type(child, None);
                    restricted.get_or_insert_with(|| XsdSimpleType::new(None)).base =
                        TypeRef::Definition(inline);
                }
                _ => self.parse_complex_child(child, ct),
            }
        }

        // A restriction with its own facets gets an anonymous simple type
        if let Some(mut simple) = restricted {
            if simple.base == TypeRef::Unspecified {
                simple.base = base.map(TypeRef::Named).unwrap_or_default();
            }
            let id = self.builder.add_type(TypeDefinition::Simple(simple));
            ct.content = ComplexContent::Simple(TypeRef::Definition(id));
        }
    }

    fn parse_simple_type(&mut self, node: Node, name: Option<QName>) -> TypeId {
        let mut st = XsdSimpleType::new(name);
        st.documentation = documentation(node);

        for child in xsd_children(node) {
            match child.tag_name().name() {
                xsd_elements::RESTRICTION => {
                    st.variety = SimpleVariety::Atomic;
                    st.base = match self.resolve_attr(child, xsd_attrs::BASE) {
                        Some(base) => TypeRef::Named(base),
                        None => self.inline_simple_type(child),
                    };
                    st.enumeration = xsd_children(child)
                        .filter(|f| f.tag_name().name() == xsd_elements::ENUMERATION)
                        .filter_map(|f| f.attribute(xsd_attrs::VALUE))
                        .map(String::from)
                        .collect();
                }
                xsd_elements::LIST => {
                    st.variety = SimpleVariety::List;
                    st.item_type = match self.resolve_attr(child, xsd_attrs::ITEM_TYPE) {
                        Some(item) => TypeRef::Named(item),
                        None => self.inline_simple_type(child),
                    };
                }
                xsd_elements::UNION => {
                    st.variety = SimpleVariety::Union;
                    if let Some(members) = child.attribute(xsd_attrs::MEMBER_TYPES) {
                        for member in members.split_whitespace() {
                            match self.resolve_qname(child, member) {
                                Ok(name) => st.member_types.push(TypeRef::Named(name)),
                                Err(err) => {
                                    self.builder.report(err.with_location(position(child)))
                                }
                            }
                        }
                    }
                    for inline in xsd_children(child)
                        .filter(|n| n.tag_name().name() == xsd_elements::SIMPLE_TYPE)
                    {
                        let id = self.parse_simple_type(inline, None);
                        st.member_types.push(TypeRef::Definition(id));
                    }
                }
                _ => {}
            }
        }

        self.builder.add_type(TypeDefinition::Simple(st))
    }

    fn inline_simple_type(&mut self, node: Node) -> TypeRef {
        xsd_children(node)
            .find(|n| n.tag_name().name() == xsd_elements::SIMPLE_TYPE)
            .map(|inline| TypeRef::Definition(self.parse_simple_type(inline, None)))
            .unwrap_or_default()
    }

    fn parse_attribute(&mut self, node: Node, global: bool) -> Option<XsdAttribute> {
        let use_mode = node
            .attribute(xsd_attrs::USE)
            .and_then(AttributeUse::parse)
            .unwrap_or_default();

        let mut attribute = if node.attribute(xsd_attrs::REF).is_some() {
            let reference = self.resolve_attr(node, xsd_attrs::REF)?;
            let mut attribute = XsdAttribute::new(reference.clone());
            attribute.reference = Some(reference);
            attribute
        } else {
            let Some(local_name) = node.attribute(xsd_attrs::NAME) else {
                self.report(node, "attribute declaration without a name");
                return None;
            };
            let form = node
                .attribute(xsd_attrs::FORM)
                .and_then(ElementForm::parse)
                .unwrap_or(self.attribute_form);
            let name = if global || form == ElementForm::Qualified {
                self.global_name(local_name.trim())
            } else {
                QName::local(local_name.trim())
            };
            let mut attribute = XsdAttribute::new(name);
            attribute.type_ref = self.type_ref(node);
            attribute
        };

        attribute.use_mode = use_mode;
        attribute.default = node.attribute(xsd_attrs::DEFAULT).map(String::from);
        attribute.fixed = node.attribute(xsd_attrs::FIXED).map(String::from);
        attribute.documentation = documentation(node);
        Some(attribute)
    }

    fn parse_attribute_group(&mut self, node: Node) {
        let Some(name) = self.required_name(node) else {
            return;
        };
        let mut group = XsdAttributeGroup::new(name);
        for child in xsd_children(node) {
            match child.tag_name().name() {
                xsd_elements::ATTRIBUTE => {
                    if let Some(attribute) = self.parse_attribute(child, false) {
                        group.attributes.push(attribute);
                    }
                }
                xsd_elements::ATTRIBUTE_GROUP => {
                    if let Some(reference) = self.resolve_attr(child, xsd_attrs::REF) {
                        group.group_refs.push(reference);
                    }
                }
                _ => {}
            }
        }
        self.builder.register_attribute_group(group);
    }
}
