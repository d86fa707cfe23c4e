//! Resource location resolution
//!
//! This module handles resolution of schema locations (file paths, URLs and
//! in-memory schema text) including `schemaLocation` hints relative to the
//! document that carries them.

use crate::error::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use url::Url;

/// Resource location - can be a URL, file path, or in-memory schema text
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Location {
    /// File system path
    Path(PathBuf),
    /// URL (http, https, ftp, etc.)
    Url(Url),
    /// In-memory schema text
    String(String),
}

impl FromStr for Location {
    type Err = Error;

    /// Create a location from a string (auto-detect type)
    fn from_str(s: &str) -> Result<Self> {
        if let Ok(url) = Url::parse(s) {
            if url.scheme() == "file" {
                let path = url
                    .to_file_path()
                    .map_err(|_| Error::Resource(format!("Invalid file URL: {}", s)))?;
                return Ok(Location::Path(path));
            }
            // Single letters are Windows drive prefixes, not schemes
            if url.scheme().len() > 1 {
                return Ok(Location::Url(url));
            }
        }

        if s.trim_start().starts_with('<') {
            return Ok(Location::String(s.to_string()));
        }

        Ok(Location::Path(PathBuf::from(s)))
    }
}

impl Location {
    /// Create a location for a file path
    pub fn path(path: impl AsRef<Path>) -> Self {
        Location::Path(path.as_ref().to_path_buf())
    }

    /// Get the location as a string
    pub fn as_str(&self) -> String {
        match self {
            Location::Path(p) => p.to_string_lossy().to_string(),
            Location::Url(u) => u.to_string(),
            Location::String(s) => s.clone(),
        }
    }

    /// Check if this is a remote location (URL)
    pub fn is_remote(&self) -> bool {
        matches!(self, Location::Url(_))
    }

    /// Check if this is a local file
    pub fn is_file(&self) -> bool {
        matches!(self, Location::Path(_))
    }

    /// Resolve a `schemaLocation` hint relative to this location
    pub fn resolve(&self, reference: &str) -> Result<Location> {
        if let Ok(url) = Url::parse(reference) {
            if url.scheme().len() > 1 {
                return reference.parse();
            }
        }

        match self {
            Location::Path(base) => {
                let reference_path = Path::new(reference);
                if reference_path.is_absolute() {
                    return Ok(Location::Path(reference_path.to_path_buf()));
                }
                let parent = base.parent().unwrap_or_else(|| Path::new(""));
                Ok(Location::Path(parent.join(reference_path)))
            }
            Location::Url(base) => Ok(Location::Url(base.join(reference)?)),
            Location::String(_) => Ok(Location::Path(PathBuf::from(reference))),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Path(p) => write!(f, "{}", p.display()),
            Location::Url(u) => write!(f, "{}", u),
            Location::String(_) => f.write_str("<inline schema>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_from_url() {
        let loc: Location = "http://example.com/schema.xsd".parse().unwrap();
        assert!(matches!(loc, Location::Url(_)));
        assert!(loc.is_remote());
    }

    #[test]
    fn test_location_from_path() {
        let loc: Location = "/tmp/schema.xsd".parse().unwrap();
        assert!(matches!(loc, Location::Path(_)));
        assert!(loc.is_file());
    }

    #[test]
    fn test_location_from_inline_text() {
        let loc: Location = "<xs:schema/>".parse().unwrap();
        assert!(matches!(loc, Location::String(_)));
        assert_eq!(loc.to_string(), "<inline schema>");
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = Location::path("/schemas/main.xsd");
        let resolved = base.resolve("common/types.xsd").unwrap();
        assert_eq!(resolved, Location::path("/schemas/common/types.xsd"));

        let absolute = base.resolve("/other/types.xsd").unwrap();
        assert_eq!(absolute, Location::path("/other/types.xsd"));
    }

    #[test]
    fn test_resolve_relative_url() {
        let base: Location = "http://example.com/xsd/main.xsd".parse().unwrap();
        let resolved = base.resolve("types.xsd").unwrap();
        assert_eq!(resolved.as_str(), "http://example.com/xsd/types.xsd");
    }
}
