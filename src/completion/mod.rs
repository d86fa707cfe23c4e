//! Content-model completion
//!
//! Declaration wrappers, substitution group expansion and the engine that
//! computes the child elements permitted at a position.

pub mod cache;
pub mod engine;
pub mod substitution;

pub use cache::{AttributeDeclaration, DeclKey, DeclarationCache, ElementDeclaration};
pub use engine::{next_terms, CandidateSet, CompletionEngine};
pub use substitution::SubstitutionResolver;
