//! Completion engine
//!
//! Answers "which child elements can go here": the closed children written
//! so far are replayed through the content automaton of the parent type, and
//! the terms the automaton permits next are turned into element declarations.
//!
//! Element terms are expanded with their substitution group members, strict
//! wildcards contribute every global element and a lax or skip wildcard turns
//! the whole result into the any-element sentinel. When no automaton is available the
//! engine falls back to the children known statically from the type.

use indexmap::{IndexMap, IndexSet};
use std::sync::Arc;
use tracing::{debug, trace};

use crate::documents::{Document, DocumentElement};
use crate::error::CompletionError;
use crate::grammar::globals::{Grammar, ModelSlot, TypeId};
use crate::grammar::models::{CandidateTerm, ContentModel, ModelVariant};
use crate::grammar::wildcards::ProcessContents;
use crate::grammar::TypeDefinition;
use crate::namespaces::QName;

use super::cache::{DeclKey, ElementDeclaration};
use super::substitution::SubstitutionResolver;

/// Child elements permitted at a position
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    elements: Vec<Arc<ElementDeclaration>>,
    any_element: bool,
}

impl CandidateSet {
    /// The sentinel answer of lax and skip wildcards: any element, no
    /// concrete declarations
    pub fn any_element() -> Self {
        Self {
            elements: Vec::new(),
            any_element: true,
        }
    }

    /// Declarations permitted, deduplicated, in first-seen order
    pub fn elements(&self) -> &[Arc<ElementDeclaration>] {
        &self.elements
    }

    /// Whether this is the any-element sentinel of a lax or skip wildcard
    pub fn accepts_any_element(&self) -> bool {
        self.any_element
    }

    /// Nothing is permitted
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && !self.any_element
    }

    /// Number of declarations
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Qualified names of the declarations
    pub fn names(&self) -> Vec<&QName> {
        self.elements.iter().map(|decl| decl.qname()).collect()
    }

    /// Check if a declaration with the given name is permitted
    pub fn contains(&self, name: &QName) -> bool {
        self.elements.iter().any(|decl| decl.qname() == name)
    }
}

/// Accumulates a [`CandidateSet`], deduplicating by cache identity
#[derive(Debug, Default)]
struct CandidateBuilder {
    elements: IndexMap<DeclKey, Arc<ElementDeclaration>>,
}

impl CandidateBuilder {
    fn push(&mut self, decl: Arc<ElementDeclaration>) {
        self.elements.entry(decl.key()).or_insert(decl);
    }

    fn extend(&mut self, decls: impl IntoIterator<Item = Arc<ElementDeclaration>>) {
        for decl in decls {
            self.push(decl);
        }
    }

    fn finish(self) -> CandidateSet {
        CandidateSet {
            elements: self.elements.into_values().collect(),
            any_element: false,
        }
    }
}

/// Replay `closed` through a content model and collect the terms permitted
/// after it.
///
/// For unordered groups under XSD 1.1 rules, top-level members with unbounded
/// maxOccurs are always part of the result, even when the automaton no
/// longer reports them.
pub fn next_terms<M: ContentModel>(
    model: &M,
    closed: &[QName],
) -> Result<IndexSet<CandidateTerm>, CompletionError> {
    let unbounded = match model.variant() {
        ModelVariant::UnorderedXsd11 => model.unbounded_unordered_members(),
        ModelVariant::Standard => Vec::new(),
    };

    let mut state = model.start();
    for (position, name) in closed.iter().enumerate() {
        let (next, term) = model
            .step(&state, name)
            .map_err(|rejected| CompletionError::SequenceRejected {
                position,
                name: rejected.name,
            })?;
        trace!(%name, ?term, "replayed child");
        state = next;
    }

    let mut terms: IndexSet<CandidateTerm> = model.candidates_after(&state).into_iter().collect();
    terms.extend(unbounded);
    Ok(terms)
}

/// Completion queries over one grammar
#[derive(Debug, Clone)]
pub struct CompletionEngine {
    grammar: Arc<Grammar>,
    substitutions: SubstitutionResolver,
}

impl CompletionEngine {
    /// Create an engine for a grammar
    pub fn new(grammar: Arc<Grammar>) -> Self {
        let substitutions = SubstitutionResolver::new(Arc::clone(&grammar));
        Self {
            grammar,
            substitutions,
        }
    }

    /// The grammar queries run against
    pub fn grammar(&self) -> &Arc<Grammar> {
        &self.grammar
    }

    /// Substitution group expansion over the same grammar
    pub fn substitutions(&self) -> &SubstitutionResolver {
        &self.substitutions
    }

    /// Child elements permitted in a `parent_type` element after the
    /// `closed` children, reporting why a degraded result would be used.
    pub fn try_possible_elements_after(
        &self,
        parent_type: TypeId,
        closed: &[QName],
    ) -> Result<CandidateSet, CompletionError> {
        match self.grammar.model_slot(parent_type) {
            Some(ModelSlot::Compiled(automaton)) => {
                let terms = next_terms(automaton, closed)?;
                Ok(self.assemble(terms))
            }
            Some(ModelSlot::Rejected(reason)) => Err(CompletionError::AmbiguousOrMalformedGrammar {
                type_name: self.grammar.type_name(parent_type),
                reason: reason.clone(),
            }),
            Some(ModelSlot::NoContentModel) | None => Err(CompletionError::GrammarUnavailable {
                type_name: self.grammar.type_name(parent_type),
            }),
        }
    }

    /// Child elements permitted in a `parent_type` element after the
    /// `closed` children.
    ///
    /// A child sequence the content model rejects yields an empty set; types
    /// without a usable automaton yield their statically known children.
    pub fn possible_elements_after(&self, parent_type: TypeId, closed: &[QName]) -> CandidateSet {
        match self.try_possible_elements_after(parent_type, closed) {
            Ok(candidates) => candidates,
            Err(err @ CompletionError::SequenceRejected { .. }) => {
                debug!(error = %err, "no candidates after rejected children");
                CandidateSet::default()
            }
            Err(err) => {
                debug!(error = %err, "using statically known children");
                self.static_candidates(parent_type)
            }
        }
    }

    /// Children of a type known without positional information.
    ///
    /// A lax or skip wildcard anywhere in the model yields the any-element
    /// sentinel.
    pub fn static_candidates(&self, parent_type: TypeId) -> CandidateSet {
        let accepts_any = self
            .grammar
            .type_definition(parent_type)
            .and_then(TypeDefinition::as_complex)
            .and_then(|ct| ct.model_group())
            .is_some_and(|group| {
                group
                    .iter_wildcards()
                    .iter()
                    .any(|any| any.process_contents != ProcessContents::Strict)
            });
        if accepts_any {
            return CandidateSet::any_element();
        }

        let mut builder = CandidateBuilder::default();
        builder.extend(
            self.grammar
                .static_children(parent_type)
                .into_iter()
                .filter_map(|id| self.grammar.declaration(id)),
        );
        builder.finish()
    }

    /// Elements permitted as the document root: every global element
    pub fn root_candidates(&self) -> CandidateSet {
        let mut builder = CandidateBuilder::default();
        builder.extend(self.global_declarations());
        builder.finish()
    }

    /// Child elements permitted at a caret offset of an editor document
    pub fn possible_elements(&self, document: &Document, offset: usize) -> CandidateSet {
        let path = document.path_at(offset);
        let Some(parent) = path.last() else {
            return self.root_candidates();
        };
        let Some(declaration) = self.resolve_path(&path) else {
            debug!(element = %parent.name, "no declaration for element at caret");
            return CandidateSet::default();
        };
        let closed = parent.closed_children_before(offset);
        self.possible_elements_after(declaration.type_id(), &closed)
    }

    /// Declaration of the element whose content contains a caret offset
    pub fn declaration_at(&self, document: &Document, offset: usize) -> Option<Arc<ElementDeclaration>> {
        self.resolve_path(&document.path_at(offset))
    }

    /// Follow an element path from the root, falling back to global
    /// declarations for children matched by wildcards
    fn resolve_path(
        &self,
        path: &[&DocumentElement],
    ) -> Option<Arc<ElementDeclaration>> {
        let (root, rest) = path.split_first()?;
        let mut current = self.grammar.global_declaration(&root.name)?;
        for element in rest {
            current = current
                .find_element(&element.name.local_name, Some(element.name.namespace_or_empty()))
                .or_else(|| self.grammar.global_declaration(&element.name))?;
        }
        Some(current)
    }

    fn global_declarations(&self) -> impl Iterator<Item = Arc<ElementDeclaration>> + '_ {
        self.grammar
            .global_elements()
            .filter_map(|id| self.grammar.declaration(id))
    }

    fn assemble(&self, terms: IndexSet<CandidateTerm>) -> CandidateSet {
        let mut builder = CandidateBuilder::default();
        for term in terms {
            match term {
                CandidateTerm::Element(decl) => {
                    if let Some(head) = self.grammar.declaration(decl) {
                        builder.push(head);
                    }
                    builder.extend(self.substitutions.expand(decl));
                }
                CandidateTerm::Wildcard(ProcessContents::Strict) => {
                    builder.extend(self.global_declarations());
                }
                CandidateTerm::Wildcard(ProcessContents::Lax | ProcessContents::Skip) => {
                    return CandidateSet::any_element();
                }
            }
        }
        builder.finish()
    }
}
