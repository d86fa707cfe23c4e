//! Declaration cache
//!
//! Completion results are built from [`ElementDeclaration`] wrappers around
//! the raw declarations of a grammar. The cache hands out exactly one wrapper
//! per raw declaration for the lifetime of the grammar, so results can be
//! compared and deduplicated by pointer identity. Everything beyond the name
//! is computed on first access.

use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, Weak};
use tracing::trace;

use crate::grammar::complex_types::{ContentKind, TypeCategory};
use crate::grammar::globals::{ElementDeclId, Grammar, GrammarId, TypeId};
use crate::locations::Location;
use crate::namespaces::QName;

/// Identity of a raw declaration across grammars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeclKey {
    /// Owning grammar
    pub grammar: GrammarId,
    /// Declaration in the grammar arena
    pub decl: ElementDeclId,
}

#[derive(Debug, Default)]
struct CacheInner {
    arena: Vec<Arc<ElementDeclaration>>,
    index: HashMap<DeclKey, usize>,
}

/// Identity-keyed store of declaration wrappers
#[derive(Debug, Default)]
pub struct DeclarationCache {
    inner: RwLock<CacheInner>,
}

impl DeclarationCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrapper for a raw declaration of `grammar`, created on first request
    pub fn get(&self, grammar: &Arc<Grammar>, id: ElementDeclId) -> Option<Arc<ElementDeclaration>> {
        let key = DeclKey {
            grammar: grammar.id(),
            decl: id,
        };

        {
            let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(slot) = inner.index.get(&key) {
                return inner.arena.get(*slot).cloned();
            }
        }

        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have materialized it between the two locks
        if let Some(slot) = inner.index.get(&key) {
            return inner.arena.get(*slot).cloned();
        }

        let declaration = Arc::new(ElementDeclaration::new(grammar, key)?);
        trace!(grammar = %key.grammar, decl = id.0, name = %declaration.name, "materialized declaration");
        let slot = inner.arena.len();
        inner.arena.push(Arc::clone(&declaration));
        inner.index.insert(key, slot);
        Some(declaration)
    }

    /// Number of materialized wrappers
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .arena
            .len()
    }

    /// Check if nothing was materialized yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Attribute of an element declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDeclaration {
    /// Qualified name
    pub name: QName,
    /// Name of the attribute type, if it has one
    pub type_name: Option<QName>,
    /// `use="required"`
    pub required: bool,
    /// Default value
    pub default_value: Option<String>,
    /// Fixed value
    pub fixed_value: Option<String>,
    /// Documentation text
    pub documentation: Option<String>,
    /// Enumeration values of the attribute type
    pub enumeration: Vec<String>,
}

/// Cached wrapper around a raw element declaration
#[derive(Debug)]
pub struct ElementDeclaration {
    key: DeclKey,
    name: QName,
    grammar: Weak<Grammar>,
    type_id: TypeId,
    category: TypeCategory,
    content_kind: ContentKind,
    is_abstract: bool,
    nillable: bool,
    documentation: OnceCell<Option<String>>,
    attributes: OnceCell<Vec<AttributeDeclaration>>,
    children: OnceCell<Vec<ElementDeclId>>,
    enumeration: OnceCell<Vec<String>>,
}

impl ElementDeclaration {
    fn new(grammar: &Arc<Grammar>, key: DeclKey) -> Option<Self> {
        let element = grammar.element(key.decl)?;
        let type_id = element.type_id?;
        let definition = grammar.type_definition(type_id)?;
        Some(Self {
            key,
            name: element.name.clone(),
            grammar: Arc::downgrade(grammar),
            type_id,
            category: definition.category(),
            content_kind: definition.content_kind(),
            is_abstract: element.is_abstract,
            nillable: element.nillable,
            documentation: OnceCell::new(),
            attributes: OnceCell::new(),
            children: OnceCell::new(),
            enumeration: OnceCell::new(),
        })
    }

    fn grammar(&self) -> Option<Arc<Grammar>> {
        self.grammar.upgrade()
    }

    /// Local name
    pub fn name(&self) -> &str {
        &self.name.local_name
    }

    /// Namespace URI, None for unqualified names
    pub fn namespace(&self) -> Option<&str> {
        self.name.namespace.as_deref()
    }

    /// Qualified name
    pub fn qname(&self) -> &QName {
        &self.name
    }

    /// Raw declaration identity
    pub fn id(&self) -> ElementDeclId {
        self.key.decl
    }

    /// Cache key
    pub fn key(&self) -> DeclKey {
        self.key
    }

    /// Resolved type of the declaration
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Simple or complex type
    pub fn type_category(&self) -> TypeCategory {
        self.category
    }

    /// Content kind of the type
    pub fn content_kind(&self) -> ContentKind {
        self.content_kind
    }

    /// `abstract="true"`
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// `nillable="true"`
    pub fn is_nillable(&self) -> bool {
        self.nillable
    }

    /// Complex type whose content is empty
    pub fn is_empty_content(&self) -> bool {
        self.category == TypeCategory::Complex && self.content_kind == ContentKind::Empty
    }

    /// Documentation of the element, or of its type when the element has none
    pub fn documentation(&self) -> Option<&str> {
        self.documentation
            .get_or_init(|| {
                let grammar = self.grammar()?;
                grammar
                    .element(self.key.decl)
                    .and_then(|e| e.documentation.clone())
                    .or_else(|| {
                        grammar
                            .type_definition(self.type_id)
                            .and_then(|t| t.documentation())
                            .map(String::from)
                    })
            })
            .as_deref()
    }

    /// Attributes of the element type, in declaration order
    pub fn attributes(&self) -> &[AttributeDeclaration] {
        self.attributes.get_or_init(|| {
            let Some(grammar) = self.grammar() else {
                return Vec::new();
            };
            grammar
                .attributes_of(self.type_id)
                .iter()
                .map(|attr| AttributeDeclaration {
                    name: attr.name.clone(),
                    type_name: attr
                        .type_id
                        .and_then(|id| grammar.type_definition(id))
                        .and_then(|t| t.name().cloned()),
                    required: attr.is_required(),
                    default_value: attr.default.clone(),
                    fixed_value: attr.fixed.clone(),
                    documentation: attr.documentation.clone(),
                    enumeration: attr
                        .type_id
                        .map(|id| grammar.enumeration_values(id))
                        .unwrap_or_default(),
                })
                .collect()
        })
    }

    /// Child element declarations known without positional information
    pub fn elements(&self) -> Vec<Arc<ElementDeclaration>> {
        let Some(grammar) = self.grammar() else {
            return Vec::new();
        };
        self.children
            .get_or_init(|| grammar.static_children(self.type_id))
            .iter()
            .filter_map(|id| grammar.declaration(*id))
            .collect()
    }

    /// Enumeration values of a simple type restricted by enumeration. Complex
    /// types yield nothing, simple content included.
    pub fn enumeration_values(&self) -> &[String] {
        self.enumeration.get_or_init(|| {
            if self.category != TypeCategory::Simple {
                return Vec::new();
            }
            self.grammar()
                .map(|grammar| grammar.enumeration_values(self.type_id))
                .unwrap_or_default()
        })
    }

    /// First child element with the given local name, and namespace if given
    pub fn find_element(&self, local_name: &str, namespace: Option<&str>) -> Option<Arc<ElementDeclaration>> {
        self.elements().into_iter().find(|child| {
            child.name() == local_name && namespace.map_or(true, |ns| child.name.is_in(Some(ns)))
        })
    }

    /// First attribute with the given local name
    pub fn find_attribute(&self, local_name: &str) -> Option<&AttributeDeclaration> {
        self.attributes()
            .iter()
            .find(|attr| attr.name.local_name == local_name)
    }

    /// Schema document that declares the element
    pub fn grammar_location(&self) -> Option<Location> {
        self.grammar()?.location_of(self.key.decl).cloned()
    }
}
