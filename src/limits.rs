//! Limits and constraints for schema loading
//!
//! This module defines limits that keep grammar loading bounded: schema
//! document size, include/import nesting, component counts and the nesting
//! depth of content models (which also guards circular group references).

use crate::error::{Error, Result};

/// Global limits configuration
#[derive(Debug, Clone)]
pub struct Limits {
    /// Maximum schema document size in bytes
    pub max_schema_size: usize,

    /// Maximum include/import nesting depth
    pub max_schema_depth: usize,

    /// Maximum number of schema components (element and type declarations)
    pub max_schema_components: usize,

    /// Maximum nesting depth of model groups, after group references are expanded
    pub max_model_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_schema_size: 100 * 1024 * 1024, // 100 MB
            max_schema_depth: 100,
            max_schema_components: 100000,
            max_model_depth: 100,
        }
    }
}

impl Limits {
    /// Create a new Limits with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create strict limits (more restrictive)
    pub fn strict() -> Self {
        Self {
            max_schema_size: 10 * 1024 * 1024, // 10 MB
            max_schema_depth: 20,
            max_schema_components: 10000,
            max_model_depth: 32,
        }
    }

    /// Create permissive limits (less restrictive, use with caution)
    pub fn permissive() -> Self {
        Self {
            max_schema_size: 1024 * 1024 * 1024, // 1 GB
            max_schema_depth: 1000,
            max_schema_components: 1000000,
            max_model_depth: 1000,
        }
    }

    /// Check if a schema document size is within limits
    pub fn check_schema_size(&self, size: usize) -> Result<()> {
        if size > self.max_schema_size {
            Err(Error::LimitExceeded(format!(
                "Schema size {} bytes exceeds maximum {} bytes",
                size, self.max_schema_size
            )))
        } else {
            Ok(())
        }
    }

    /// Check if schema depth is within limits
    pub fn check_schema_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_schema_depth {
            Err(Error::LimitExceeded(format!(
                "Schema depth {} exceeds maximum {}",
                depth, self.max_schema_depth
            )))
        } else {
            Ok(())
        }
    }

    /// Check if number of schema components is within limits
    pub fn check_schema_components(&self, count: usize) -> Result<()> {
        if count > self.max_schema_components {
            Err(Error::LimitExceeded(format!(
                "Schema component count {} exceeds maximum {}",
                count, self.max_schema_components
            )))
        } else {
            Ok(())
        }
    }

    /// Check if a content model nesting depth is within limits
    pub fn check_model_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_model_depth {
            Err(Error::LimitExceeded(format!(
                "Model depth {} exceeds maximum {}",
                depth, self.max_model_depth
            )))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = Limits::default();
        assert_eq!(limits.max_schema_depth, 100);
        assert!(limits.check_schema_depth(50).is_ok());
        assert!(limits.check_schema_depth(150).is_err());
    }

    #[test]
    fn test_strict_limits() {
        let limits = Limits::strict();
        assert!(limits.max_model_depth < Limits::default().max_model_depth);
        assert!(limits.check_model_depth(64).is_err());
    }

    #[test]
    fn test_permissive_limits() {
        let limits = Limits::permissive();
        assert!(limits.max_schema_depth > Limits::default().max_schema_depth);
        assert!(limits.check_schema_depth(500).is_ok());
    }

    #[test]
    fn test_check_schema_size() {
        let limits = Limits::default();
        assert!(limits.check_schema_size(1024).is_ok());
        assert!(limits.check_schema_size(200 * 1024 * 1024).is_err());
    }

    #[test]
    fn test_check_schema_components() {
        let limits = Limits::strict();
        assert!(limits.check_schema_components(100).is_ok());
        assert!(matches!(
            limits.check_schema_components(20000),
            Err(Error::LimitExceeded(_))
        ));
    }
}
