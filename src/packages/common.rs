// src/packages/common.rs
//! Canonical package record shared by the `.PKGINFO` and PKGBUILD parsers
//!
//! Both parsers produce a format-specific record that embeds `Package` and
//! adds its own fields. Field lookup by name goes through `scalar_mut` and
//! `sequence_mut` so each parser only has to translate its own vocabulary
//! into canonical field names.

use crate::config::ParseOptions;
use crate::error::{Error, Result};
use serde::Serialize;
use std::fmt;
use tracing::warn;

/// Metadata common to pacman packages and PKGBUILDs
///
/// Every field has a default (empty string or empty list), so a record is
/// fully defined before any input has been read. List order is the order
/// in which values were encountered.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Package {
    /// Package name
    pub name: String,
    /// Upstream version, without the release suffix
    pub version: String,
    /// One-line description
    pub description: String,
    /// Upstream URL
    pub url: String,
    pub licenses: Vec<String>,
    pub groups: Vec<String>,
    /// Virtual provisions
    pub provides: Vec<String>,
    pub depends: Vec<String>,
    /// Optional dependencies, usually `name: reason`
    pub optdepends: Vec<String>,
    pub conflicts: Vec<String>,
    pub replaces: Vec<String>,
    pub architectures: Vec<String>,
    /// makepkg options such as `!strip`
    pub options: Vec<String>,
    /// Files to back up on upgrade
    pub backup: Vec<String>,
}

impl Package {
    /// Mutable access to a scalar field by canonical name
    pub fn scalar_mut(&mut self, field: &str) -> Option<&mut String> {
        match field {
            "name" => Some(&mut self.name),
            "version" => Some(&mut self.version),
            "description" => Some(&mut self.description),
            "url" => Some(&mut self.url),
            _ => None,
        }
    }

    /// Mutable access to a list field by canonical name
    pub fn sequence_mut(&mut self, field: &str) -> Option<&mut Vec<String>> {
        match field {
            "licenses" => Some(&mut self.licenses),
            "groups" => Some(&mut self.groups),
            "provides" => Some(&mut self.provides),
            "depends" => Some(&mut self.depends),
            "optdepends" => Some(&mut self.optdepends),
            "conflicts" => Some(&mut self.conflicts),
            "replaces" => Some(&mut self.replaces),
            "architectures" => Some(&mut self.architectures),
            "options" => Some(&mut self.options),
            "backup" => Some(&mut self.backup),
            _ => None,
        }
    }

    /// Write `name version-release`, or `name version` without a release
    pub(crate) fn fmt_with_release<R: fmt::Display>(
        &self,
        f: &mut fmt::Formatter<'_>,
        release: Option<R>,
    ) -> fmt::Result {
        match release {
            Some(release) => write!(f, "{} {}-{}", self.name, self.version, release),
            None => write!(f, "{} {}", self.name, self.version),
        }
    }
}

/// Turn a parse result into a field value, honoring lenient coercion
pub(crate) fn coerce<T, E: fmt::Display>(
    field: &'static str,
    raw: &str,
    parsed: std::result::Result<T, E>,
    options: &ParseOptions,
) -> Result<Option<T>> {
    match parsed {
        Ok(value) => Ok(Some(value)),
        Err(e) if options.lenient_coercion => {
            warn!("Ignoring malformed {} '{}': {}", field, raw, e);
            Ok(None)
        }
        Err(e) => Err(Error::coercion(field, raw, e)),
    }
}
