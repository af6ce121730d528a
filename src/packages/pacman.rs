// src/packages/pacman.rs

//! Pacman package metadata reader
//!
//! A built pacman package (`.pkg.tar.zst`, `.pkg.tar.xz`, ...) carries its
//! metadata in a `.PKGINFO` member: one `key = value` pair per line, with
//! `#` comments and repeated keys for list fields:
//!
//! ```text
//! # Generated by makepkg
//! pkgname = nano
//! pkgver = 8.5-2
//! pkgdesc = Pico editor clone with enhancements
//! builddate = 1751530000
//! packager = Jane Doe <jane@example.org>
//! size = 2619392
//! arch = x86_64
//! license = GPL-3.0-or-later
//! depend = ncurses
//! depend = file
//! ```
//!
//! Each line is split on the *last* ` = `. There is no quoting and no
//! variable substitution.

use crate::archive::{PKGINFO, PackageArchive, TarArchive};
use crate::config::ParseOptions;
use crate::error::{Error, Result};
use crate::packages::common::{Package, coerce};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// `.PKGINFO` keys whose canonical field name differs from the key
const FIELD_MAP: &[(&str, &str)] = &[
    ("pkgname", "name"),
    ("pkgver", "version"),
    ("pkgdesc", "description"),
    ("license", "licenses"),
    ("arch", "architectures"),
    ("force", "is_forced"),
    ("conflict", "conflicts"),
    ("group", "groups"),
    ("optdepend", "optdepends"),
    ("makepkgopt", "options"),
    ("depend", "depends"),
    ("makedepend", "makedepends"),
    ("checkdepend", "checkdepends"),
];

/// Keys that may repeat; every occurrence appends to a list
const REPEATABLE: &[&str] = &[
    "arch",
    "license",
    "replaces",
    "group",
    "depend",
    "optdepend",
    "conflict",
    "provides",
    "backup",
    "makepkgopt",
    "makedepend",
    "checkdepend",
];

/// Metadata of a built pacman package
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PacmanPackage {
    #[serde(flatten)]
    pub package: Package,
    /// Package release, split off the end of `pkgver`
    pub release: Option<u64>,
    pub builddate: Option<DateTime<Utc>>,
    /// `None` when unset or when makepkg wrote its "Unknown Packager" default
    pub packager: Option<String>,
    pub is_forced: bool,
    /// Installed size in bytes
    pub size: Option<u64>,
    pub makedepends: Vec<String>,
    pub checkdepends: Vec<String>,
    /// Archive member names, in archive order
    pub files: Vec<String>,
    /// Keys with no canonical field; last occurrence wins
    pub extra: BTreeMap<String, String>,
}

/// Raw values of typed fields, coerced once all lines are read
#[derive(Default)]
struct PendingFields {
    builddate: Option<String>,
    size: Option<String>,
    force: Option<String>,
    packager: Option<String>,
}

impl PacmanPackage {
    /// Read a package file from disk
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        PacmanPackageReader::new().path(path).read()
    }

    /// Read from an archive the caller already has open
    pub fn from_archive(archive: &mut dyn PackageArchive) -> Result<Self> {
        PacmanPackageReader::new().archive(archive).read()
    }

    /// Parse a bare `.PKGINFO` stream with default options
    ///
    /// `files` stays empty since there is no archive to list.
    pub fn parse_pkginfo<R: BufRead>(reader: R) -> Result<Self> {
        Self::parse_pkginfo_with(reader, &ParseOptions::default())
    }

    /// Parse a bare `.PKGINFO` stream
    pub fn parse_pkginfo_with<R: BufRead>(reader: R, options: &ParseOptions) -> Result<Self> {
        let mut pkg = Self::default();
        let mut pending = PendingFields::default();

        for (index, line) in reader.lines().enumerate() {
            let line = line
                .map_err(|e| Error::IoError(format!("Failed to read {}: {}", PKGINFO, e)))?;
            let line = line.trim();

            // Skip comments and empty lines
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (key, value) = split_line(line).ok_or_else(|| {
                Error::ParseError(format!(
                    "{} line {}: expected 'key = value', found '{}'",
                    PKGINFO,
                    index + 1,
                    line
                ))
            })?;
            trace!("{}: {} = {}", PKGINFO, key, value);

            pkg.assign(key, value.to_string(), &mut pending);
        }

        pkg.finalize(pending, options)?;

        debug!(
            "Parsed {}: {} {} ({} dependencies)",
            PKGINFO,
            pkg.package.name,
            pkg.package.version,
            pkg.package.depends.len()
        );

        Ok(pkg)
    }

    fn assign(&mut self, key: &str, value: String, pending: &mut PendingFields) {
        let field = FIELD_MAP
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, f)| *f)
            .unwrap_or(key);

        if REPEATABLE.contains(&key) {
            if let Some(list) = self.sequence_mut(field) {
                list.push(value);
            }
            return;
        }

        match field {
            "builddate" => pending.builddate = Some(value),
            "size" => pending.size = Some(value),
            "is_forced" => pending.force = Some(value),
            "packager" => pending.packager = Some(value),
            _ => {
                if let Some(slot) = self.package.scalar_mut(field) {
                    *slot = value;
                } else if let Some(list) = self.sequence_mut(field) {
                    *list = vec![value];
                } else {
                    self.extra.insert(key.to_string(), value);
                }
            }
        }
    }

    fn sequence_mut(&mut self, field: &str) -> Option<&mut Vec<String>> {
        match field {
            "makedepends" => Some(&mut self.makedepends),
            "checkdepends" => Some(&mut self.checkdepends),
            _ => self.package.sequence_mut(field),
        }
    }

    /// Coerce typed fields and split the release off `pkgver`
    fn finalize(&mut self, pending: PendingFields, options: &ParseOptions) -> Result<()> {
        if let Some(raw) = pending.size.filter(|s| !s.is_empty()) {
            self.size = coerce("size", &raw, raw.parse::<u64>(), options)?;
        }

        if let Some(raw) = pending.force {
            self.is_forced = raw == "True";
        }

        if let Some(raw) = pending.builddate.filter(|s| !s.is_empty()) {
            let parsed = raw.parse::<i64>().map_err(|e| e.to_string()).and_then(|secs| {
                DateTime::from_timestamp(secs, 0)
                    .ok_or_else(|| "timestamp out of range".to_string())
            });
            self.builddate = coerce("builddate", &raw, parsed, options)?;
        }

        if let Some((version, release)) = self.package.version.rsplit_once('-') {
            let release = release.to_string();
            self.package.version = version.to_string();
            self.release = coerce("release", &release, release.parse::<u64>(), options)?;
        }

        self.packager = pending
            .packager
            .filter(|packager| *packager != options.unknown_packager);

        Ok(())
    }
}

impl fmt::Display for PacmanPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.package.fmt_with_release(f, self.release)
    }
}

/// Split a trimmed line on the rightmost ` = `
///
/// Trimming eats the space after `=` when the value is empty, so a line
/// ending in ` =` is a key with an empty value.
fn split_line(line: &str) -> Option<(&str, &str)> {
    line.rsplit_once(" = ")
        .or_else(|| line.strip_suffix(" =").map(|key| (key, "")))
}

/// Builder for reading a pacman package from exactly one source
///
/// A path is opened and released by the reader; an archive passed in is
/// only borrowed and stays usable by the caller afterwards.
pub struct PacmanPackageReader<'a> {
    path: Option<PathBuf>,
    archive: Option<&'a mut dyn PackageArchive>,
    options: ParseOptions,
}

impl Default for PacmanPackageReader<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> PacmanPackageReader<'a> {
    pub fn new() -> Self {
        Self {
            path: None,
            archive: None,
            options: ParseOptions::default(),
        }
    }

    /// Read the package file at `path`
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Read from an already open archive
    pub fn archive(mut self, archive: &'a mut dyn PackageArchive) -> Self {
        self.archive = Some(archive);
        self
    }

    pub fn options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    pub fn read(self) -> Result<PacmanPackage> {
        match (self.path, self.archive) {
            (Some(path), None) => {
                debug!("Reading pacman package: {}", path.display());
                let mut archive = TarArchive::open(&path)?;
                read_archive(&mut archive, &self.options)
            }
            (None, Some(archive)) => read_archive(archive, &self.options),
            (None, None) => Err(Error::InvalidArgument(
                "nothing to open: supply a package path or an archive".to_string(),
            )),
            (Some(_), Some(_)) => Err(Error::InvalidArgument(
                "supply either a package path or an archive, not both".to_string(),
            )),
        }
    }
}

fn read_archive(archive: &mut dyn PackageArchive, options: &ParseOptions) -> Result<PacmanPackage> {
    let files = archive.member_names()?;

    let mut pkg = {
        let member = archive
            .open_member(PKGINFO)?
            .ok_or_else(|| Error::MissingMember(PKGINFO.to_string()))?;
        PacmanPackage::parse_pkginfo_with(BufReader::new(member), options)?
    };
    pkg.files = files;

    debug!("Read pacman package {} ({} members)", pkg, pkg.files.len());
    Ok(pkg)
}
