// src/recipe/mapper.rs

//! Mapping of resolved recipe symbols onto a `Pkgbuild` record
//!
//! - `md5sums` .. `sha512sums` go into `checksums`, keyed by algorithm
//! - `pkgname`, `pkgver`, `pkgdesc`, `pkgrel`, `source`, `arch` and
//!   `license` are renamed to their canonical fields
//! - any other name that matches a record field is assigned to it as-is
//!   (`depends`, `url`, `install`, ...), and everything else is kept in
//!   `extra`
//!
//! When a recipe sets both a recipe name and the canonical name of the same
//! field (`source` and `sources`), the recipe name wins.

use crate::config::ParseOptions;
use crate::error::Result;
use crate::packages::common::coerce;
use crate::recipe::pkgbuild::{ChecksumAlgorithm, Pkgbuild};
use crate::recipe::symbols::{SymbolTable, SymbolValue};
use tracing::warn;

/// Recipe variable names whose record field has a different name
const FIELD_MAP: &[(&str, &str)] = &[
    ("pkgname", "name"),
    ("pkgver", "version"),
    ("pkgdesc", "description"),
    ("pkgrel", "release"),
    ("source", "sources"),
    ("arch", "architectures"),
    ("license", "licenses"),
];

fn renamed(name: &str) -> Option<&'static str> {
    FIELD_MAP
        .iter()
        .find(|(recipe, _)| *recipe == name)
        .map(|(_, field)| *field)
}

/// Build a `Pkgbuild` from a resolved symbol table
pub fn map_symbols(symbols: SymbolTable, options: &ParseOptions) -> Result<Pkgbuild> {
    let mut pkg = Pkgbuild::default();
    let mut release = None;

    let mut entries: Vec<(String, SymbolValue)> = symbols.into_iter().collect();
    // Renamed recipe variables are applied last so they take precedence
    entries.sort_by_key(|(name, _)| renamed(name).is_some());

    for (name, value) in entries {
        if let Some(algorithm) = ChecksumAlgorithm::from_symbol(&name) {
            pkg.checksums.insert(algorithm, value.into_vec());
            continue;
        }

        let field = renamed(&name).unwrap_or(name.as_str());
        if field == "release" {
            release = Some(scalar_value(&name, value));
        } else if let Some(slot) = pkg.scalar_mut(field) {
            *slot = scalar_value(&name, value);
        } else if let Some(list) = pkg.sequence_mut(field) {
            *list = value.into_vec();
        } else {
            pkg.extra.insert(name, value);
        }
    }

    if let Some(raw) = release.filter(|r| !r.is_empty()) {
        let parsed = raw
            .parse::<f64>()
            .map_err(|e| e.to_string())
            .and_then(|r| {
                if r.is_finite() {
                    Ok(r)
                } else {
                    Err("not a finite number".to_string())
                }
            });
        pkg.release = coerce("release", &raw, parsed, options)?;
    }

    for (algorithm, sums) in &pkg.checksums {
        if !sums.is_empty() && sums.len() != pkg.sources.len() {
            warn!(
                "{} has {} {} checksums for {} sources",
                pkg.package.name,
                sums.len(),
                algorithm,
                pkg.sources.len()
            );
        }
    }

    Ok(pkg)
}

/// Scalar view of a symbol; an array keeps only its first element
fn scalar_value(name: &str, value: SymbolValue) -> String {
    match value {
        SymbolValue::Scalar(s) => s,
        SymbolValue::Array(items) => {
            if items.len() > 1 {
                warn!(
                    "{} is an array of {} values, using the first",
                    name,
                    items.len()
                );
            }
            items.into_iter().next().unwrap_or_default()
        }
    }
}
