//! Schema grammars
//!
//! Parsing of schema documents, resolution of their components and
//! compilation of content models into deterministic automata.

// Components
pub mod attributes;
pub mod builtins;
pub mod complex_types;
pub mod elements;
pub mod groups;
pub mod particles;
pub mod simple_types;
pub mod wildcards;

// Content models
pub mod models;

// Building
pub mod builders;
pub mod globals;
pub mod parsing;

// Re-exports
pub use builders::{GrammarBuilder, XsdVersion};
pub use complex_types::{ContentKind, TypeCategory, TypeDefinition};
pub use globals::{ElementDeclId, Grammar, GrammarId, ModelSlot, TypeId};
pub use models::{CandidateTerm, ContentAutomaton, ContentModel, ModelError, ModelVariant, Rejected};
pub use parsing::{ReferenceKind, SchemaReference};
pub use wildcards::ProcessContents;
