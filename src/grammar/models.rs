//! XSD Content Model automata
//!
//! This module compiles the model group of a complex type into a
//! [`ContentAutomaton`] and provides:
//! - the [`ContentModel`] trait used by the completion engine, so the walk can
//!   run against any automaton implementation
//! - pure, deterministic stepping with per-particle occurrence counters
//! - a determinism check (Unique Particle Attribution) run at compile time
//!
//! Reference: https://www.w3.org/TR/xmlschema11-1/#cos-nonambig

use indexmap::IndexSet;
use thiserror::Error;

use crate::limits::Limits;
use crate::namespaces::QName;

use super::builders::XsdVersion;
use super::globals::ElementDeclId;
use super::groups::{GroupParticle, ModelType, XsdGroup};
use super::particles::Occurs;
use super::wildcards::{NamespaceConstraint, ProcessContents, XsdAnyElement};

/// A term the content model can accept next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateTerm {
    /// An element declaration (a substitution head, never expanded here)
    Element(ElementDeclId),
    /// An element wildcard
    Wildcard(ProcessContents),
}

/// A child name that cannot occur at the current position
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("element '{name}' is not allowed at this position")]
pub struct Rejected {
    /// The rejected child name
    pub name: QName,
}

/// Automaton variants that need special handling by consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelVariant {
    /// Ordinary automaton
    #[default]
    Standard,
    /// Unordered (`xs:all`) group under XSD 1.1 rules. Members with unbounded
    /// maxOccurs may drop out of the candidates after their first occurrence.
    UnorderedXsd11,
}

/// State-transition interface over a compiled content model.
///
/// Implementations must be pure: `step` and `candidates_after` depend only on
/// their arguments, so states can be replayed from any thread.
pub trait ContentModel {
    /// Opaque automaton state, meaningful only for the model that produced it
    type State: Clone;

    /// Initial state
    fn start(&self) -> Self::State;

    /// Consume one child element name
    fn step(&self, state: &Self::State, name: &QName)
        -> Result<(Self::State, CandidateTerm), Rejected>;

    /// Terms legally permitted after `state`
    fn candidates_after(&self, state: &Self::State) -> Vec<CandidateTerm>;

    /// Variant flag of this automaton
    fn variant(&self) -> ModelVariant {
        ModelVariant::Standard
    }

    /// Top-level members of an unordered group with unbounded maxOccurs
    fn unbounded_unordered_members(&self) -> Vec<CandidateTerm> {
        Vec::new()
    }
}

/// Reasons a model group cannot be compiled
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// The model violates Unique Particle Attribution
    #[error("ambiguous content model: {0}")]
    Ambiguous(String),
    /// The model contains unresolved or unsupported parts
    #[error("malformed content model: {0}")]
    Malformed(String),
    /// Groups nest deeper than the configured limit
    #[error("model depth {0} exceeds the configured maximum")]
    TooDeep(usize),
}

#[derive(Debug, Clone)]
struct Node {
    occurs: Occurs,
    term: Term,
}

#[derive(Debug, Clone)]
enum Term {
    Element {
        leaf: usize,
        decl: ElementDeclId,
        /// Head name plus the names of its substitution members
        accepts: IndexSet<QName>,
    },
    Wildcard {
        leaf: usize,
        any: XsdAnyElement,
    },
    Group {
        model: ModelType,
        children: Vec<Node>,
    },
}

/// State of a [`ContentAutomaton`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelState {
    root: NodeState,
}

/// Occurrences started for a particle, and the progress inside the last one
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct NodeState {
    count: u32,
    inner: Option<Box<GroupState>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum GroupState {
    Sequence { index: usize, current: NodeState },
    Choice { branch: Option<(usize, NodeState)> },
    All { members: Vec<NodeState> },
}

impl GroupState {
    fn initial(model: ModelType, len: usize) -> Self {
        match model {
            ModelType::Sequence => GroupState::Sequence {
                index: 0,
                current: NodeState::default(),
            },
            ModelType::Choice => GroupState::Choice { branch: None },
            ModelType::All => GroupState::All {
                members: vec![NodeState::default(); len],
            },
        }
    }
}

impl Term {
    fn is_nullable(&self) -> bool {
        match self {
            Term::Element { .. } | Term::Wildcard { .. } => false,
            Term::Group { model, children } => match model {
                ModelType::Choice => children.is_empty() || children.iter().any(Node::is_nullable),
                ModelType::Sequence | ModelType::All => children.iter().all(Node::is_nullable),
            },
        }
    }
}

impl Node {
    fn is_nullable(&self) -> bool {
        self.occurs.is_emptiable() || self.term.is_nullable()
    }

    /// Whether the current occurrence is finished (leaves finish on consumption)
    fn inner_complete(&self, st: &NodeState) -> bool {
        match (&self.term, &st.inner) {
            (Term::Group { children, .. }, Some(gs)) => group_can_end(children, gs),
            _ => true,
        }
    }

    fn can_end(&self, st: &NodeState) -> bool {
        if st.count == 0 {
            return self.is_nullable();
        }
        self.inner_complete(st) && (st.count >= self.occurs.min || self.term.is_nullable())
    }

    fn can_start_occurrence(&self, st: &NodeState) -> bool {
        !self.occurs.is_over(st.count) && (st.count == 0 || self.inner_complete(st))
    }

    fn step(&self, st: &NodeState, name: &QName) -> Option<(NodeState, CandidateTerm)> {
        if let (Term::Group { children, .. }, Some(gs)) = (&self.term, &st.inner) {
            if let Some((next, term)) = group_step(children, gs, name) {
                let state = NodeState {
                    count: st.count,
                    inner: Some(Box::new(next)),
                };
                return Some((state, term));
            }
        }

        if !self.can_start_occurrence(st) {
            return None;
        }

        let started = |inner: Option<Box<GroupState>>| NodeState {
            count: st.count + 1,
            inner,
        };
        match &self.term {
            Term::Element { decl, accepts, .. } => accepts
                .contains(name)
                .then(|| (started(None), CandidateTerm::Element(*decl))),
            Term::Wildcard { any, .. } => any
                .matches(name)
                .then(|| (started(None), CandidateTerm::Wildcard(any.process_contents))),
            Term::Group { model, children } => {
                let fresh = GroupState::initial(*model, children.len());
                group_step(children, &fresh, name)
                    .map(|(next, term)| (started(Some(Box::new(next))), term))
            }
        }
    }

    fn candidates(&self, st: &NodeState, out: &mut IndexSet<CandidateTerm>) {
        if let (Term::Group { children, .. }, Some(gs)) = (&self.term, &st.inner) {
            group_candidates(children, gs, out);
        }
        if self.can_start_occurrence(st) {
            self.first_terms(out);
        }
    }

    fn first_terms(&self, out: &mut IndexSet<CandidateTerm>) {
        match &self.term {
            Term::Element { decl, .. } => {
                out.insert(CandidateTerm::Element(*decl));
            }
            Term::Wildcard { any, .. } => {
                out.insert(CandidateTerm::Wildcard(any.process_contents));
            }
            Term::Group { model, children } => {
                group_candidates(children, &GroupState::initial(*model, children.len()), out);
            }
        }
    }

    fn leaf_term(&self) -> Option<CandidateTerm> {
        match &self.term {
            Term::Element { decl, .. } => Some(CandidateTerm::Element(*decl)),
            Term::Wildcard { any, .. } => Some(CandidateTerm::Wildcard(any.process_contents)),
            Term::Group { .. } => None,
        }
    }
}

fn group_can_end(children: &[Node], gs: &GroupState) -> bool {
    match gs {
        GroupState::Sequence { index, current } => match children.get(*index) {
            Some(child) => {
                child.can_end(current) && children[index + 1..].iter().all(Node::is_nullable)
            }
            None => true,
        },
        GroupState::Choice { branch: Some((i, st)) } => {
            children.get(*i).map_or(true, |child| child.can_end(st))
        }
        GroupState::Choice { branch: None } => {
            children.is_empty() || children.iter().any(Node::is_nullable)
        }
        GroupState::All { members } => children
            .iter()
            .zip(members)
            .all(|(child, st)| child.can_end(st)),
    }
}

fn group_step(
    children: &[Node],
    gs: &GroupState,
    name: &QName,
) -> Option<(GroupState, CandidateTerm)> {
    match gs {
        GroupState::Sequence { index, current } => {
            let mut i = *index;
            let mut cur = current.clone();
            while let Some(child) = children.get(i) {
                if let Some((next, term)) = child.step(&cur, name) {
                    return Some((GroupState::Sequence { index: i, current: next }, term));
                }
                if !child.can_end(&cur) {
                    return None;
                }
                i += 1;
                cur = NodeState::default();
            }
            None
        }
        GroupState::Choice { branch: Some((i, st)) } => {
            let child = children.get(*i)?;
            child.step(st, name).map(|(next, term)| {
                (
                    GroupState::Choice {
                        branch: Some((*i, next)),
                    },
                    term,
                )
            })
        }
        GroupState::Choice { branch: None } => {
            let fresh = NodeState::default();
            prefer_element(children.iter().enumerate().filter_map(|(i, child)| {
                child.step(&fresh, name).map(|(next, term)| (i, next, term))
            }))
            .map(|(i, next, term)| {
                (
                    GroupState::Choice {
                        branch: Some((i, next)),
                    },
                    term,
                )
            })
        }
        GroupState::All { members } => {
            prefer_element(children.iter().zip(members).enumerate().filter_map(
                |(i, (child, st))| child.step(st, name).map(|(next, term)| (i, next, term)),
            ))
            .map(|(i, next, term)| {
                let mut members = members.clone();
                members[i] = next;
                (GroupState::All { members }, term)
            })
        }
    }
}

/// First match naming an element declaration, else the first wildcard match
fn prefer_element(
    matches: impl Iterator<Item = (usize, NodeState, CandidateTerm)>,
) -> Option<(usize, NodeState, CandidateTerm)> {
    let mut fallback = None;
    for found in matches {
        if matches!(found.2, CandidateTerm::Element(_)) {
            return Some(found);
        }
        if fallback.is_none() {
            fallback = Some(found);
        }
    }
    fallback
}

fn group_candidates(children: &[Node], gs: &GroupState, out: &mut IndexSet<CandidateTerm>) {
    match gs {
        GroupState::Sequence { index, current } => {
            let mut i = *index;
            let mut cur = current.clone();
            while let Some(child) = children.get(i) {
                child.candidates(&cur, out);
                if !child.can_end(&cur) {
                    break;
                }
                i += 1;
                cur = NodeState::default();
            }
        }
        GroupState::Choice { branch: Some((i, st)) } => {
            if let Some(child) = children.get(*i) {
                child.candidates(st, out);
            }
        }
        GroupState::Choice { branch: None } => {
            let fresh = NodeState::default();
            for child in children {
                child.candidates(&fresh, out);
            }
        }
        GroupState::All { members } => {
            for (child, st) in children.iter().zip(members) {
                child.candidates(st, out);
            }
        }
    }
}

/// Deterministic automaton compiled from the model group of a complex type
#[derive(Debug, Clone)]
pub struct ContentAutomaton {
    root: Node,
    variant: ModelVariant,
}

impl ContentAutomaton {
    /// Compile a resolved model group.
    ///
    /// `accepts` returns the names an element particle matches: the
    /// declaration's own name plus those of its substitution group members.
    pub fn compile<F>(
        group: &XsdGroup,
        accepts: F,
        version: XsdVersion,
        limits: &Limits,
    ) -> Result<Self, ModelError>
    where
        F: Fn(ElementDeclId) -> IndexSet<QName>,
    {
        let mut leaves = 0;
        let root = compile_group(group, &accepts, &mut leaves, 1, limits)?;
        check_model(&root, version)?;

        let variant = match (&root.term, version) {
            (
                Term::Group {
                    model: ModelType::All,
                    ..
                },
                XsdVersion::Xsd11,
            ) => ModelVariant::UnorderedXsd11,
            _ => ModelVariant::Standard,
        };

        Ok(Self { root, variant })
    }

    /// Check if a state is a valid end of the content
    pub fn is_accepting(&self, state: &ModelState) -> bool {
        self.root.can_end(&state.root)
    }
}

impl ContentModel for ContentAutomaton {
    type State = ModelState;

    fn start(&self) -> ModelState {
        ModelState::default()
    }

    fn step(
        &self,
        state: &ModelState,
        name: &QName,
    ) -> Result<(ModelState, CandidateTerm), Rejected> {
        self.root
            .step(&state.root, name)
            .map(|(root, term)| (ModelState { root }, term))
            .ok_or_else(|| Rejected { name: name.clone() })
    }

    fn candidates_after(&self, state: &ModelState) -> Vec<CandidateTerm> {
        let mut out = IndexSet::new();
        self.root.candidates(&state.root, &mut out);
        out.into_iter().collect()
    }

    fn variant(&self) -> ModelVariant {
        self.variant
    }

    fn unbounded_unordered_members(&self) -> Vec<CandidateTerm> {
        match (&self.variant, &self.root.term) {
            (ModelVariant::UnorderedXsd11, Term::Group { children, .. }) => children
                .iter()
                .filter(|child| child.occurs.is_unbounded())
                .filter_map(Node::leaf_term)
                .collect(),
            _ => Vec::new(),
        }
    }
}

fn compile_group<F>(
    group: &XsdGroup,
    accepts: &F,
    leaves: &mut usize,
    depth: usize,
    limits: &Limits,
) -> Result<Node, ModelError>
where
    F: Fn(ElementDeclId) -> IndexSet<QName>,
{
    limits
        .check_model_depth(depth)
        .map_err(|_| ModelError::TooDeep(depth))?;

    let mut children = Vec::with_capacity(group.particles.len());
    for particle in &group.particles {
        if particle.occurs().is_empty() {
            continue;
        }
        let node = match particle {
            GroupParticle::Element(e) => {
                *leaves += 1;
                Node {
                    occurs: e.occurs,
                    term: Term::Element {
                        leaf: *leaves,
                        decl: e.decl,
                        accepts: accepts(e.decl),
                    },
                }
            }
            GroupParticle::Any(any) => {
                *leaves += 1;
                Node {
                    occurs: any.occurs,
                    term: Term::Wildcard {
                        leaf: *leaves,
                        any: any.clone(),
                    },
                }
            }
            GroupParticle::Group(inner) => compile_group(inner, accepts, leaves, depth + 1, limits)?,
            GroupParticle::ElementRef { name, .. } => {
                return Err(ModelError::Malformed(format!(
                    "unresolved element reference '{}'",
                    name
                )))
            }
            GroupParticle::GroupRef { name, .. } => {
                return Err(ModelError::Malformed(format!(
                    "unresolved group reference '{}'",
                    name
                )))
            }
        };
        children.push(node);
    }

    Ok(Node {
        occurs: group.occurs,
        term: Term::Group {
            model: group.model,
            children,
        },
    })
}

// =============================================================================
// Determinism check
// =============================================================================

#[derive(Debug, Clone, Copy)]
enum SymbolKind<'a> {
    Names(&'a IndexSet<QName>),
    Wildcard(&'a NamespaceConstraint),
}

#[derive(Debug, Clone, Copy)]
struct Symbol<'a> {
    leaf: usize,
    kind: SymbolKind<'a>,
}

impl<'a> Symbol<'a> {
    fn describe(&self) -> String {
        match self.kind {
            SymbolKind::Names(names) => names
                .first()
                .map(|n| n.to_string())
                .unwrap_or_default(),
            SymbolKind::Wildcard(_) => "xs:any".to_string(),
        }
    }

    /// Two different particles competing for the same element name
    fn competes_with(&self, other: &Symbol<'_>, version: XsdVersion) -> bool {
        if self.leaf == other.leaf {
            return false;
        }
        match (self.kind, other.kind) {
            (SymbolKind::Names(a), SymbolKind::Names(b)) => a.iter().any(|n| b.contains(n)),
            (SymbolKind::Names(names), SymbolKind::Wildcard(ns))
            | (SymbolKind::Wildcard(ns), SymbolKind::Names(names)) => {
                // XSD 1.1 resolves element/wildcard overlaps in favour of the element
                version == XsdVersion::Xsd10
                    && names.iter().any(|n| ns.is_allowed(n.namespace_or_empty()))
            }
            (SymbolKind::Wildcard(a), SymbolKind::Wildcard(b)) => a.overlaps(b),
        }
    }
}

/// Symbols that can be consumed first by a node
fn first_symbols(node: &Node) -> Vec<Symbol<'_>> {
    match &node.term {
        Term::Element { leaf, accepts, .. } => vec![Symbol {
            leaf: *leaf,
            kind: SymbolKind::Names(accepts),
        }],
        Term::Wildcard { leaf, any } => vec![Symbol {
            leaf: *leaf,
            kind: SymbolKind::Wildcard(&any.namespace),
        }],
        Term::Group { model, children } => {
            let mut out = Vec::new();
            match model {
                ModelType::Sequence => {
                    for child in children {
                        out.extend(first_symbols(child));
                        if !child.is_nullable() {
                            break;
                        }
                    }
                }
                ModelType::Choice | ModelType::All => {
                    for child in children {
                        out.extend(first_symbols(child));
                    }
                }
            }
            out
        }
    }
}

/// Symbols a node can consume at a point where it could also be finished
fn end_symbols(node: &Node) -> Vec<Symbol<'_>> {
    let mut out = term_end_symbols(node);
    let repeatable = node.occurs.max.map_or(true, |max| node.occurs.min < max);
    if repeatable {
        out.extend(first_symbols(node));
    }
    out
}

fn term_end_symbols(node: &Node) -> Vec<Symbol<'_>> {
    let Term::Group { model, children } = &node.term else {
        return Vec::new();
    };
    let mut out = Vec::new();
    match model {
        ModelType::Sequence => {
            let suffix = children
                .iter()
                .rposition(|c| !c.is_nullable())
                .map_or(0, |p| p + 1);
            if let Some(last_required) = suffix.checked_sub(1) {
                out.extend(end_symbols(&children[last_required]));
            }
            for child in &children[suffix..] {
                out.extend(end_symbols(child));
                out.extend(first_symbols(child));
            }
        }
        ModelType::Choice | ModelType::All => {
            for child in children {
                out.extend(end_symbols(child));
            }
        }
    }
    out
}

fn find_conflict<'a>(
    a: &[Symbol<'a>],
    b: &[Symbol<'a>],
    version: XsdVersion,
) -> Option<(Symbol<'a>, Symbol<'a>)> {
    a.iter()
        .flat_map(|x| b.iter().map(move |y| (*x, *y)))
        .find(|(x, y)| x.competes_with(y, version))
}

fn ambiguity(model: ModelType, (x, y): (Symbol<'_>, Symbol<'_>)) -> ModelError {
    ModelError::Ambiguous(format!(
        "particles '{}' and '{}' of a {} both match the same element",
        x.describe(),
        y.describe(),
        model
    ))
}

fn check_model(node: &Node, version: XsdVersion) -> Result<(), ModelError> {
    let Term::Group { model, children } = &node.term else {
        return Ok(());
    };

    match model {
        ModelType::Sequence => {
            for (i, child) in children.iter().enumerate() {
                let tail = end_symbols(child);
                if tail.is_empty() {
                    continue;
                }
                for next in &children[i + 1..] {
                    if let Some(conflict) = find_conflict(&tail, &first_symbols(next), version) {
                        return Err(ambiguity(*model, conflict));
                    }
                    if !next.is_nullable() {
                        break;
                    }
                }
            }
        }
        ModelType::Choice | ModelType::All => {
            for (i, child) in children.iter().enumerate() {
                let first = first_symbols(child);
                for other in &children[i + 1..] {
                    if let Some(conflict) = find_conflict(&first, &first_symbols(other), version) {
                        return Err(ambiguity(*model, conflict));
                    }
                }
            }
        }
    }

    if node.occurs.max.map_or(true, |max| node.occurs.min < max) {
        if let Some(conflict) =
            find_conflict(&term_end_symbols(node), &first_symbols(node), version)
        {
            return Err(ambiguity(*model, conflict));
        }
    }

    children
        .iter()
        .try_for_each(|child| check_model(child, version))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::groups::ElementParticle;

    fn name_of(id: ElementDeclId) -> QName {
        QName::local(["A", "B", "C", "D"][id.0 as usize])
    }

    fn accepts(id: ElementDeclId) -> IndexSet<QName> {
        let mut set = IndexSet::new();
        set.insert(name_of(id));
        set
    }

    fn el(id: u32, occurs: Occurs) -> GroupParticle {
        GroupParticle::Element(ElementParticle {
            decl: ElementDeclId(id),
            occurs,
        })
    }

    fn group(model: ModelType, particles: Vec<GroupParticle>) -> XsdGroup {
        let mut group = XsdGroup::new(model);
        for p in particles {
            group.push(p);
        }
        group
    }

    fn compile(group: &XsdGroup, version: XsdVersion) -> Result<ContentAutomaton, ModelError> {
        ContentAutomaton::compile(group, accepts, version, &Limits::default())
    }

    fn replay(model: &ContentAutomaton, names: &[&str]) -> Result<ModelState, Rejected> {
        let mut state = model.start();
        for name in names {
            state = model.step(&state, &QName::local(*name))?.0;
        }
        Ok(state)
    }

    fn names_after(model: &ContentAutomaton, names: &[&str]) -> Vec<String> {
        let state = replay(model, names).unwrap();
        model
            .candidates_after(&state)
            .into_iter()
            .map(|term| match term {
                CandidateTerm::Element(id) => name_of(id).local_name,
                CandidateTerm::Wildcard(pc) => format!("any:{}", pc),
            })
            .collect()
    }

    fn abc() -> ContentAutomaton {
        let g = group(
            ModelType::Sequence,
            vec![
                el(0, Occurs::once()),
                el(1, Occurs::optional()),
                el(2, Occurs::zero_or_more()),
            ],
        );
        compile(&g, XsdVersion::Xsd10).unwrap()
    }

    #[test]
    fn test_sequence_candidates() {
        let model = abc();
        assert_eq!(names_after(&model, &[]), vec!["A"]);
        assert_eq!(names_after(&model, &["A"]), vec!["B", "C"]);
        assert_eq!(names_after(&model, &["A", "B"]), vec!["C"]);
        assert_eq!(names_after(&model, &["A", "B", "C", "C"]), vec!["C"]);
    }

    #[test]
    fn test_sequence_rejects_out_of_order() {
        let model = abc();
        let err = replay(&model, &["B"]).unwrap_err();
        assert_eq!(err.name, QName::local("B"));
        assert!(replay(&model, &["A", "C", "B"]).is_err());
    }

    #[test]
    fn test_accepting_states() {
        let model = abc();
        assert!(!model.is_accepting(&model.start()));
        assert!(model.is_accepting(&replay(&model, &["A"]).unwrap()));
        assert!(model.is_accepting(&replay(&model, &["A", "C"]).unwrap()));
    }

    #[test]
    fn test_repeated_choice() {
        let g = group(ModelType::Choice, vec![el(0, Occurs::once()), el(1, Occurs::once())])
            .with_occurs(Occurs::new(1, Some(2)));
        let model = compile(&g, XsdVersion::Xsd10).unwrap();

        assert_eq!(names_after(&model, &[]), vec!["A", "B"]);
        assert_eq!(names_after(&model, &["A"]), vec!["A", "B"]);
        assert!(names_after(&model, &["A", "B"]).is_empty());
        assert!(replay(&model, &["A", "B", "A"]).is_err());
    }

    #[test]
    fn test_nested_sequence_repeats() {
        let inner = group(ModelType::Sequence, vec![el(0, Occurs::once()), el(1, Occurs::optional())])
            .with_occurs(Occurs::zero_or_more());
        let g = group(
            ModelType::Sequence,
            vec![GroupParticle::Group(inner), el(2, Occurs::once())],
        );
        let model = compile(&g, XsdVersion::Xsd10).unwrap();

        assert_eq!(names_after(&model, &[]), vec!["A", "C"]);
        assert_eq!(names_after(&model, &["A"]), vec!["B", "A", "C"]);
        assert_eq!(names_after(&model, &["A", "B", "A"]), vec!["B", "A", "C"]);
        assert!(names_after(&model, &["A", "C"]).is_empty());
    }

    #[test]
    fn test_all_group() {
        let g = group(
            ModelType::All,
            vec![el(0, Occurs::zero_or_more()), el(1, Occurs::optional())],
        );
        let model = compile(&g, XsdVersion::Xsd11).unwrap();
        assert_eq!(model.variant(), ModelVariant::UnorderedXsd11);
        assert_eq!(
            model.unbounded_unordered_members(),
            vec![CandidateTerm::Element(ElementDeclId(0))]
        );

        assert_eq!(names_after(&model, &["A"]), vec!["A", "B"]);
        assert_eq!(names_after(&model, &["B"]), vec!["A"]);
        assert_eq!(names_after(&model, &["B", "A", "A"]), vec!["A"]);
        assert!(replay(&model, &["B", "B"]).is_err());
    }

    #[test]
    fn test_all_group_xsd10_is_standard() {
        let g = group(ModelType::All, vec![el(0, Occurs::once()), el(1, Occurs::optional())]);
        let model = compile(&g, XsdVersion::Xsd10).unwrap();
        assert_eq!(model.variant(), ModelVariant::Standard);
        assert!(model.unbounded_unordered_members().is_empty());
    }

    #[test]
    fn test_wildcard_candidates() {
        let g = group(
            ModelType::Sequence,
            vec![
                el(0, Occurs::once()),
                GroupParticle::Any(XsdAnyElement::new(ProcessContents::Lax, Occurs::zero_or_more())),
            ],
        );
        let model = compile(&g, XsdVersion::Xsd11).unwrap();
        assert_eq!(names_after(&model, &["A"]), vec!["any:lax"]);
        assert_eq!(names_after(&model, &["A", "anything"]), vec!["any:lax"]);
    }

    #[test]
    fn test_ambiguous_optional_prefix() {
        let g = group(ModelType::Sequence, vec![el(0, Occurs::optional()), el(0, Occurs::once())]);
        assert!(matches!(
            compile(&g, XsdVersion::Xsd10),
            Err(ModelError::Ambiguous(_))
        ));
    }

    #[test]
    fn test_ambiguous_choice() {
        let g = group(
            ModelType::Choice,
            vec![
                el(0, Occurs::once()),
                GroupParticle::Group(group(
                    ModelType::Sequence,
                    vec![el(0, Occurs::once()), el(1, Occurs::once())],
                )),
            ],
        );
        assert!(matches!(
            compile(&g, XsdVersion::Xsd10),
            Err(ModelError::Ambiguous(_))
        ));
    }

    #[test]
    fn test_element_wildcard_overlap_by_version() {
        let g = group(
            ModelType::Choice,
            vec![
                el(0, Occurs::once()),
                GroupParticle::Any(XsdAnyElement::new(ProcessContents::Strict, Occurs::once())),
            ],
        );
        assert!(compile(&g, XsdVersion::Xsd10).is_err());

        let model = compile(&g, XsdVersion::Xsd11).unwrap();
        let (_, term) = model.step(&model.start(), &QName::local("A")).unwrap();
        assert_eq!(term, CandidateTerm::Element(ElementDeclId(0)));
    }

    #[test]
    fn test_unambiguous_repetition_of_same_particle() {
        let inner = group(ModelType::Sequence, vec![el(0, Occurs::zero_or_more())])
            .with_occurs(Occurs::zero_or_more());
        let g = group(ModelType::Sequence, vec![GroupParticle::Group(inner)]);
        assert!(compile(&g, XsdVersion::Xsd10).is_ok());
    }

    #[test]
    fn test_unresolved_reference_is_malformed() {
        let g = group(
            ModelType::Sequence,
            vec![GroupParticle::GroupRef {
                name: QName::local("missing"),
                occurs: Occurs::once(),
            }],
        );
        assert!(matches!(
            compile(&g, XsdVersion::Xsd10),
            Err(ModelError::Malformed(_))
        ));
    }

    #[test]
    fn test_depth_limit() {
        let mut g = group(ModelType::Sequence, vec![el(0, Occurs::once())]);
        for _ in 0..10 {
            g = group(ModelType::Sequence, vec![GroupParticle::Group(g)]);
        }
        let limits = Limits {
            max_model_depth: 5,
            ..Limits::default()
        };
        let result = ContentAutomaton::compile(&g, accepts, XsdVersion::Xsd10, &limits);
        assert!(matches!(result, Err(ModelError::TooDeep(_))));
    }
}
