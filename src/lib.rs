//! # xmlschema-completion
//!
//! XML Schema (XSD 1.0 and XSD 1.1) content-model completion for editors.
//!
//! Given the child elements already written inside an element, the library
//! answers which elements may come next according to the element's schema
//! type, and exposes the attributes, documentation and enumeration values of
//! the declarations involved.
//!
//! ## Features
//!
//! - Grammar loading from schema documents, following include and import
//! - Deterministic content automata compiled per complex type
//! - XSD 1.1 `xs:all` groups with unbounded members
//! - Substitution group expansion
//! - A per-grammar cache handing out shared declaration handles
//! - A tolerant document model for half-typed editor buffers
//!
//! ## Example
//!
//! ```rust,ignore
//! use xmlschema_completion::{CompletionEngine, Document, GrammarRegistry, Location};
//!
//! let registry = GrammarRegistry::new();
//! let grammar = registry.load_grammar(&[Location::path("schema.xsd")])?;
//! let engine = CompletionEngine::new(grammar);
//!
//! let document = Document::parse("<book><title>T</title></book>");
//! for decl in engine.possible_elements(&document, 22).elements() {
//!     println!("{}", decl.name());
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod limits;

// Names and resources
pub mod namespaces;
pub mod locations;
pub mod loaders;
pub mod settings;

// Edited documents
pub mod documents;

// Grammars and completion
pub mod grammar;
pub mod completion;
pub mod registry;

// Re-exports for convenience
pub use completion::{CandidateSet, CompletionEngine, DeclarationCache, ElementDeclaration};
pub use documents::Document;
pub use error::{CompletionError, Error, Result};
pub use grammar::{Grammar, GrammarBuilder, XsdVersion};
pub use locations::Location;
pub use namespaces::QName;
pub use registry::GrammarRegistry;
pub use settings::ValidationSettings;

/// Version of the xmlschema-completion library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// XSD 1.0 namespace
pub const XSD_1_0_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// XSD 1.1 namespace
pub const XSD_1_1_NAMESPACE: &str = "http://www.w3.org/2009/XMLSchema";

/// XML namespace
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
