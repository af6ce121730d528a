// src/config.rs

//! Parser configuration
//!
//! Options are plain data and can be loaded from TOML:
//!
//! ```toml
//! max_substitution_depth = 16
//! lenient_coercion = true
//! unknown_packager = "Unknown Packager"
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default nesting budget for recipe variable expansion
pub const DEFAULT_MAX_SUBSTITUTION_DEPTH: usize = 32;

/// Packager value written by makepkg when PACKAGER is unset
pub const UNKNOWN_PACKAGER: &str = "Unknown Packager";

/// Options shared by the `.PKGINFO` and PKGBUILD readers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// How many nested `$name` expansions a single value may go through
    pub max_substitution_depth: usize,

    /// Leave malformed numeric/timestamp fields unset instead of failing
    pub lenient_coercion: bool,

    /// Packager string that means "no packager"
    pub unknown_packager: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_substitution_depth: DEFAULT_MAX_SUBSTITUTION_DEPTH,
            lenient_coercion: false,
            unknown_packager: UNKNOWN_PACKAGER.to_string(),
        }
    }
}

impl ParseOptions {
    /// Parse options from a TOML document; missing keys take defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let options: Self = toml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Invalid parser options: {}", e)))?;

        if options.max_substitution_depth == 0 {
            return Err(Error::ConfigError(
                "max_substitution_depth must be at least 1".to_string(),
            ));
        }

        Ok(options)
    }

    /// Load options from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::IoError(format!(
                "Failed to read options file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_toml_str(&content)
    }

    /// Builder-style toggle for lenient coercion
    pub fn lenient(mut self, lenient: bool) -> Self {
        self.lenient_coercion = lenient;
        self
    }

    /// Builder-style override of the substitution budget
    pub fn with_max_substitution_depth(mut self, depth: usize) -> Self {
        self.max_substitution_depth = depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ParseOptions::default();
        assert_eq!(options.max_substitution_depth, 32);
        assert!(!options.lenient_coercion);
        assert_eq!(options.unknown_packager, "Unknown Packager");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let options = ParseOptions::from_toml_str("lenient_coercion = true\n").unwrap();
        assert!(options.lenient_coercion);
        assert_eq!(options.max_substitution_depth, DEFAULT_MAX_SUBSTITUTION_DEPTH);
    }

    #[test]
    fn test_zero_depth_rejected() {
        let err = ParseOptions::from_toml_str("max_substitution_depth = 0").unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let err = ParseOptions::from_toml_str("lenient_coercion = \"maybe\"").unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parched.toml");
        std::fs::write(&path, "max_substitution_depth = 4\nunknown_packager = \"nobody\"\n")
            .unwrap();

        let options = ParseOptions::load(&path).unwrap();
        assert_eq!(options.max_substitution_depth, 4);
        assert_eq!(options.unknown_packager, "nobody");
    }

    #[test]
    fn test_load_missing_file() {
        let err = ParseOptions::load(Path::new("/nonexistent/parched.toml")).unwrap_err();
        assert!(matches!(err, Error::IoError(_)));
    }
}
