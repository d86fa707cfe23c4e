//! XSD Model Groups
//!
//! Model groups (`xs:sequence`, `xs:choice`, `xs:all`) and their particles.
//! Element and group references are kept by name until the builder resolves
//! them; a resolved group contains only element, wildcard and nested group
//! particles.
//!
//! Reference: https://www.w3.org/TR/xmlschema11-1/#Model_Groups

use crate::namespaces::QName;

use super::globals::ElementDeclId;
use super::particles::Occurs;
use super::wildcards::XsdAnyElement;

/// Model group compositor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelType {
    /// Children in order
    Sequence,
    /// Exactly one of the children
    Choice,
    /// Children in any order
    All,
}

impl ModelType {
    /// Parse from an XSD tag local name
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "sequence" => Some(Self::Sequence),
            "choice" => Some(Self::Choice),
            "all" => Some(Self::All),
            _ => None,
        }
    }
}

impl std::fmt::Display for ModelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sequence => write!(f, "sequence"),
            Self::Choice => write!(f, "choice"),
            Self::All => write!(f, "all"),
        }
    }
}

/// Element particle: an element declaration with occurrence bounds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementParticle {
    /// Declaration in the grammar arena
    pub decl: ElementDeclId,
    /// Occurrence bounds of this use
    pub occurs: Occurs,
}

/// A particle in a model group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupParticle {
    /// Local or referenced element declaration
    Element(ElementParticle),
    /// Element wildcard
    Any(XsdAnyElement),
    /// Nested model group
    Group(XsdGroup),
    /// Unresolved `<xs:element ref="..."/>`
    ElementRef {
        /// Referenced global element
        name: QName,
        /// Occurrence bounds of this use
        occurs: Occurs,
    },
    /// Unresolved `<xs:group ref="..."/>`
    GroupRef {
        /// Referenced named group
        name: QName,
        /// Occurrence bounds of this use
        occurs: Occurs,
    },
}

impl GroupParticle {
    /// Occurrence bounds of the particle
    pub fn occurs(&self) -> Occurs {
        match self {
            GroupParticle::Element(e) => e.occurs,
            GroupParticle::Any(any) => any.occurs,
            GroupParticle::Group(g) => g.occurs,
            GroupParticle::ElementRef { occurs, .. } | GroupParticle::GroupRef { occurs, .. } => {
                *occurs
            }
        }
    }
}

/// A model group with its particles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XsdGroup {
    /// Compositor
    pub model: ModelType,
    /// Particles in declaration order
    pub particles: Vec<GroupParticle>,
    /// Occurrence bounds of the group itself
    pub occurs: Occurs,
}

impl XsdGroup {
    /// Create an empty group occurring once
    pub fn new(model: ModelType) -> Self {
        Self {
            model,
            particles: Vec::new(),
            occurs: Occurs::once(),
        }
    }

    /// Set the occurrence bounds
    pub fn with_occurs(mut self, occurs: Occurs) -> Self {
        self.occurs = occurs;
        self
    }

    /// Append a particle
    pub fn push(&mut self, particle: GroupParticle) {
        self.particles.push(particle);
    }

    /// Number of particles
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// True if the group has no particles
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Check if the group can match an empty child sequence
    pub fn is_emptiable(&self) -> bool {
        if self.occurs.is_emptiable() {
            return true;
        }
        self.content_is_emptiable()
    }

    fn content_is_emptiable(&self) -> bool {
        let particle_emptiable = |p: &GroupParticle| match p {
            GroupParticle::Group(g) => g.is_emptiable(),
            other => other.occurs().is_emptiable(),
        };
        match self.model {
            ModelType::Choice => self.particles.is_empty() || self.particles.iter().any(particle_emptiable),
            ModelType::Sequence | ModelType::All => self.particles.iter().all(particle_emptiable),
        }
    }

    /// Iterate over every element declaration in the group tree
    pub fn iter_elements(&self) -> Vec<ElementDeclId> {
        let mut out = Vec::new();
        self.collect_elements(&mut out);
        out
    }

    fn collect_elements(&self, out: &mut Vec<ElementDeclId>) {
        for particle in &self.particles {
            match particle {
                GroupParticle::Element(e) => {
                    if !out.contains(&e.decl) {
                        out.push(e.decl);
                    }
                }
                GroupParticle::Group(g) => g.collect_elements(out),
                _ => {}
            }
        }
    }

    /// Iterate over every wildcard in the group tree
    pub fn iter_wildcards(&self) -> Vec<&XsdAnyElement> {
        let mut out = Vec::new();
        self.collect_wildcards(&mut out);
        out
    }

    fn collect_wildcards<'a>(&'a self, out: &mut Vec<&'a XsdAnyElement>) {
        for particle in &self.particles {
            match particle {
                GroupParticle::Any(any) => out.push(any),
                GroupParticle::Group(g) => g.collect_wildcards(out),
                _ => {}
            }
        }
    }
}
