//! Grammar registry
//!
//! Loads schema documents into compiled [`Grammar`]s and caches them by the
//! locations they were requested for. A grammar is never mutated once
//! loaded: when a schema changes the cached grammar is invalidated and the
//! next request builds a new one.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

use crate::error::{Error, ParseError, Result};
use crate::grammar::{Grammar, GrammarBuilder, ReferenceKind, XsdVersion};
use crate::loaders::Loader;
use crate::locations::Location;
use crate::settings::ValidationSettings;

/// Pending schema document for iterative loading
struct PendingSchemaWork {
    location: Location,
    /// Target namespace of the including document (chameleon include)
    including_namespace: Option<String>,
    /// Include/import nesting depth
    depth: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GrammarKey {
    locations: Vec<Location>,
    version: XsdVersion,
}

/// Loads and caches compiled grammars
#[derive(Debug, Default)]
pub struct GrammarRegistry {
    loader: Loader,
    settings: ValidationSettings,
    grammars: RwLock<HashMap<GrammarKey, Arc<Grammar>>>,
}

impl GrammarRegistry {
    /// Create a registry with default loader and settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the given loader
    pub fn with_loader(mut self, loader: Loader) -> Self {
        self.loader = loader;
        self
    }

    /// Use the given settings
    pub fn with_settings(mut self, settings: ValidationSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Current settings
    pub fn settings(&self) -> &ValidationSettings {
        &self.settings
    }

    /// Replace the settings. Cached grammars stay valid; a changed schema
    /// version selects different cache entries.
    pub fn update_settings(&mut self, settings: &ValidationSettings) {
        self.settings.merge(settings);
    }

    /// Grammar for a set of schema documents, loading it on first request
    pub fn load_grammar(&self, locations: &[Location]) -> Result<Arc<Grammar>> {
        let key = GrammarKey {
            locations: locations.to_vec(),
            version: self.settings.xsd_version(),
        };

        if let Some(grammar) = self.read().get(&key) {
            debug!(grammar = %grammar.id(), "grammar cache hit");
            return Ok(Arc::clone(grammar));
        }

        let grammar = Arc::new(self.compile(locations, key.version)?);
        let mut grammars = self.write();
        // A concurrent load of the same key keeps the first grammar
        let grammar = grammars.entry(key).or_insert(grammar);
        Ok(Arc::clone(grammar))
    }

    /// Drop every cached grammar built from one of `locations`, included
    /// documents counted. Returns the number of grammars dropped.
    pub fn invalidate(&self, locations: &[Location]) -> usize {
        let mut grammars = self.write();
        let before = grammars.len();
        grammars.retain(|_, grammar| {
            !grammar
                .locations()
                .iter()
                .any(|loaded| locations.contains(loaded))
        });
        let dropped = before - grammars.len();
        if dropped > 0 {
            info!(dropped, "invalidated cached grammars");
        }
        dropped
    }

    /// Drop every cached grammar
    pub fn clear(&self) {
        self.write().clear();
        debug!("grammar cache cleared");
    }

    /// Number of cached grammars
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Check if no grammar is cached
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<GrammarKey, Arc<Grammar>>> {
        self.grammars.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<GrammarKey, Arc<Grammar>>> {
        self.grammars.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load the documents and everything they include or import.
    ///
    /// Documents are processed from a worklist rather than recursively so deep
    /// include chains cannot overflow the stack. Failing to load one of the
    /// requested documents is an error; failing to load a referenced one is
    /// recorded on the grammar.
    fn compile(&self, locations: &[Location], version: XsdVersion) -> Result<Grammar> {
        if locations.is_empty() {
            return Err(Error::Value("no schema location given".to_string()));
        }
        info!(documents = locations.len(), %version, "loading grammar");

        let limits = self.loader.limits().clone();
        let mut builder = GrammarBuilder::new(version).with_limits(limits.clone());
        let mut loaded: HashSet<Location> = HashSet::new();
        let mut pending: VecDeque<PendingSchemaWork> = locations
            .iter()
            .map(|location| PendingSchemaWork {
                location: location.clone(),
                including_namespace: None,
                depth: 0,
            })
            .collect();

        while let Some(work) = pending.pop_front() {
            if !loaded.insert(work.location.clone()) {
                continue;
            }
            let requested = work.depth == 0;

            let references = limits
                .check_schema_depth(work.depth)
                .and_then(|_| self.loader.load(&work.location))
                .and_then(|text| {
                    builder.add_schema_with_namespace(
                        &text,
                        work.location.clone(),
                        work.including_namespace.as_deref(),
                    )
                });
            let references = match references {
                Ok(references) => references,
                Err(err) if requested => return Err(err),
                Err(err) => {
                    warn!(location = %work.location, error = %err, "skipping referenced schema");
                    builder.report(
                        ParseError::new(format!("failed to load referenced schema: {}", err))
                            .with_source(work.location.to_string()),
                    );
                    continue;
                }
            };

            for reference in references {
                let Some(schema_location) = reference.schema_location else {
                    debug!(namespace = ?reference.namespace, "import without schemaLocation");
                    continue;
                };
                let location = match work.location.resolve(&schema_location) {
                    Ok(location) => location,
                    Err(err) => {
                        builder.report(ParseError::new(format!(
                            "cannot resolve schemaLocation '{}': {}",
                            schema_location, err
                        )));
                        continue;
                    }
                };
                let including_namespace = match reference.kind {
                    ReferenceKind::Include | ReferenceKind::Redefine => {
                        reference.referencing_namespace
                    }
                    ReferenceKind::Import => None,
                };
                pending.push_back(PendingSchemaWork {
                    location,
                    including_namespace,
                    depth: work.depth + 1,
                });
            }
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::Limits;
    use crate::namespaces::QName;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> Location {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        Location::path(path)
    }

    const MAIN: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
            xmlns:c="urn:common" targetNamespace="urn:main" xmlns="urn:main">
        <xs:include schemaLocation="parts.xsd"/>
        <xs:import namespace="urn:common" schemaLocation="common/common.xsd"/>
        <xs:element name="doc">
            <xs:complexType>
                <xs:sequence>
                    <xs:element ref="part"/>
                    <xs:element ref="c:note"/>
                </xs:sequence>
            </xs:complexType>
        </xs:element>
    </xs:schema>"#;

    const PARTS: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
        <xs:element name="part" type="xs:string"/>
    </xs:schema>"#;

    const COMMON: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
            targetNamespace="urn:common">
        <xs:element name="note" type="xs:string"/>
    </xs:schema>"#;

    fn fixture() -> (TempDir, Location) {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("common")).unwrap();
        let main = write(&dir, "main.xsd", MAIN);
        write(&dir, "parts.xsd", PARTS);
        write(&dir, "common/common.xsd", COMMON);
        (dir, main)
    }

    #[test]
    fn test_load_follows_includes_and_imports() {
        let (_dir, main) = fixture();
        let registry = GrammarRegistry::new();
        let grammar = registry.load_grammar(&[main]).unwrap();
        assert!(grammar.errors().is_empty(), "{:?}", grammar.errors());
        assert_eq!(grammar.locations().len(), 3);
        assert_eq!(grammar.target_namespace(), Some("urn:main"));
        // The chameleon include takes over the including namespace
        assert!(grammar
            .lookup_element(&QName::namespaced("urn:main", "part"))
            .is_some());
        assert!(grammar
            .lookup_element(&QName::namespaced("urn:common", "note"))
            .is_some());
    }

    #[test]
    fn test_grammars_are_cached_and_invalidated() {
        let (dir, main) = fixture();
        let registry = GrammarRegistry::new();
        let first = registry.load_grammar(&[main.clone()]).unwrap();
        let second = registry.load_grammar(&[main.clone()]).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);

        // Editing an included document drops the grammar
        let parts = Location::path(dir.path().join("parts.xsd"));
        assert_eq!(registry.invalidate(&[parts]), 1);
        assert!(registry.is_empty());

        let third = registry.load_grammar(&[main]).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_ne!(first.id(), third.id());

        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_schema_version_selects_grammar() {
        let (_dir, main) = fixture();
        let mut registry = GrammarRegistry::new();
        let xsd10 = registry.load_grammar(&[main.clone()]).unwrap();

        let settings = ValidationSettings::from_json(r#"{"schemaVersion": "1.1"}"#).unwrap();
        registry.update_settings(&settings);
        let xsd11 = registry.load_grammar(&[main]).unwrap();
        assert_eq!(xsd10.version(), XsdVersion::Xsd10);
        assert_eq!(xsd11.version(), XsdVersion::Xsd11);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_missing_main_document_is_an_error() {
        let registry = GrammarRegistry::new();
        let result = registry.load_grammar(&[Location::path("/nonexistent/main.xsd")]);
        assert!(matches!(result, Err(Error::Resource(_))));
        assert!(registry.load_grammar(&[]).is_err());
    }

    #[test]
    fn test_missing_include_is_recorded() {
        let dir = TempDir::new().unwrap();
        let main = write(
            &dir,
            "main.xsd",
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                <xs:include schemaLocation="missing.xsd"/>
                <xs:element name="doc"/>
            </xs:schema>"#,
        );
        let grammar = GrammarRegistry::new().load_grammar(&[main]).unwrap();
        assert_eq!(grammar.errors().len(), 1);
        assert!(grammar.lookup_element(&QName::local("doc")).is_some());
    }

    #[test]
    fn test_include_depth_limit() {
        let dir = TempDir::new().unwrap();
        for i in 0..4 {
            write(
                &dir,
                &format!("s{}.xsd", i),
                &format!(
                    r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                        <xs:include schemaLocation="s{}.xsd"/>
                        <xs:element name="e{}"/>
                    </xs:schema>"#,
                    i + 1,
                    i
                ),
            );
        }
        let limits = Limits {
            max_schema_depth: 2,
            ..Limits::default()
        };
        let registry = GrammarRegistry::new().with_loader(Loader::new().with_limits(limits));
        let grammar = registry
            .load_grammar(&[Location::path(dir.path().join("s0.xsd"))])
            .unwrap();
        assert!(grammar.lookup_element(&QName::local("e2")).is_some());
        assert!(grammar.lookup_element(&QName::local("e3")).is_none());
    }

    #[test]
    fn test_inline_schema() {
        let registry = GrammarRegistry::new();
        let grammar = registry
            .load_grammar(&[Location::String(PARTS.to_string())])
            .unwrap();
        assert!(grammar.lookup_element(&QName::local("part")).is_some());
    }
}
