// src/recipe/pkgbuild.rs

//! PKGBUILD metadata extraction
//!
//! PKGBUILDs are Bash scripts with specific variables and functions:
//!
//! ```bash
//! pkgname=nano
//! pkgver=8.5
//! pkgrel=2
//! pkgdesc="A small and friendly text editor"
//! url="https://www.nano-editor.org"
//! license=('GPL')
//! depends=('ncurses')
//! source=("https://nano-editor.org/dist/v8/nano-$pkgver.tar.xz")
//! sha256sums=('abc123...')
//!
//! build() {
//!     cd "$pkgname-$pkgver"
//!     ./configure --prefix=/usr
//!     make
//! }
//! ```
//!
//! The script is never executed. Top-level assignments are read by the
//! tokenizer, `$name` references are expanded from the other assignments,
//! and the result is mapped onto a `Pkgbuild` record. Function bodies are
//! skipped.
//!
//! # Limitations
//!
//! - No arithmetic, command substitution, conditionals or loops
//! - Parameter expansions other than `$name` and `${name}` are kept as text
//! - Split packages (`pkgname=(a b)`) keep only the first name

use crate::config::ParseOptions;
use crate::error::{Error, Result};
use crate::packages::common::Package;
use crate::recipe::mapper::map_symbols;
use crate::recipe::symbols::{SymbolTable, SymbolValue};
use crate::recipe::tokenizer::Tokenizer;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use tracing::debug;

/// Checksum algorithms a PKGBUILD can list per source (`<alg>sums=(...)`)
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ChecksumAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl ChecksumAlgorithm {
    /// Algorithm for a recipe variable such as `sha256sums`
    pub fn from_symbol(name: &str) -> Option<Self> {
        name.strip_suffix("sums")?.parse().ok()
    }

    /// Recipe variable name for this algorithm
    pub fn symbol(&self) -> String {
        format!("{}sums", self.as_ref())
    }
}

/// Metadata declared by a PKGBUILD
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Pkgbuild {
    #[serde(flatten)]
    pub package: Package,
    /// `pkgrel`, which may carry a fractional part (`1.1`)
    pub release: Option<f64>,
    /// Install scriptlet file name
    pub install: String,
    /// Checksums per algorithm, positionally aligned with `sources`
    pub checksums: BTreeMap<ChecksumAlgorithm, Vec<String>>,
    pub sources: Vec<String>,
    pub makedepends: Vec<String>,
    pub checkdepends: Vec<String>,
    pub noextract: Vec<String>,
    /// Variables with no record field (`_pkgname`, `epoch`, ...)
    pub extra: BTreeMap<String, SymbolValue>,
}

impl Pkgbuild {
    /// Read a PKGBUILD from disk
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        PkgbuildReader::new().path(path).read()
    }

    /// Read a PKGBUILD from a stream with default options
    pub fn parse<R: Read>(mut reader: R) -> Result<Self> {
        PkgbuildReader::new().reader(&mut reader).read()
    }

    /// Parse PKGBUILD text with default options
    pub fn parse_str(content: &str) -> Result<Self> {
        Self::parse_str_with(content, &ParseOptions::default())
    }

    /// Parse PKGBUILD text
    pub fn parse_str_with(content: &str, options: &ParseOptions) -> Result<Self> {
        let mut symbols = SymbolTable::new();
        let mut count = 0;
        for assignment in Tokenizer::new(content) {
            symbols.assign(assignment?);
            count += 1;
        }
        debug!("PKGBUILD has {} top-level assignments", count);

        symbols.resolve(options.max_substitution_depth)?;
        let pkg = map_symbols(symbols, options)?;

        debug!(
            "Parsed PKGBUILD: {} ({} sources, {} dependencies)",
            pkg,
            pkg.sources.len(),
            pkg.package.depends.len()
        );
        Ok(pkg)
    }

    /// Each source paired with its checksum for `algorithm`, if listed
    pub fn source_checksums(
        &self,
        algorithm: ChecksumAlgorithm,
    ) -> impl Iterator<Item = (&str, Option<&str>)> {
        let sums = self.checksums.get(&algorithm);
        self.sources.iter().enumerate().map(move |(i, source)| {
            (
                source.as_str(),
                sums.and_then(|s| s.get(i)).map(String::as_str),
            )
        })
    }

    pub(crate) fn scalar_mut(&mut self, field: &str) -> Option<&mut String> {
        match field {
            "install" => Some(&mut self.install),
            _ => self.package.scalar_mut(field),
        }
    }

    pub(crate) fn sequence_mut(&mut self, field: &str) -> Option<&mut Vec<String>> {
        match field {
            "sources" => Some(&mut self.sources),
            "makedepends" => Some(&mut self.makedepends),
            "checkdepends" => Some(&mut self.checkdepends),
            "noextract" => Some(&mut self.noextract),
            _ => self.package.sequence_mut(field),
        }
    }
}

impl fmt::Display for Pkgbuild {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.package.fmt_with_release(f, self.release)
    }
}

/// A readable stream that can be rewound
pub trait SeekRead: Read + Seek {}

impl<T: Read + Seek> SeekRead for T {}

enum Input<'a> {
    Reader(&'a mut dyn Read),
    Seekable(&'a mut dyn SeekRead),
}

/// Builder for reading a PKGBUILD from exactly one source
///
/// A path is opened and closed by the reader. A stream passed in is only
/// borrowed; a seekable one is rewound to its start first.
pub struct PkgbuildReader<'a> {
    path: Option<PathBuf>,
    input: Option<Input<'a>>,
    options: ParseOptions,
}

impl Default for PkgbuildReader<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> PkgbuildReader<'a> {
    pub fn new() -> Self {
        Self {
            path: None,
            input: None,
            options: ParseOptions::default(),
        }
    }

    /// Read the PKGBUILD at `path`
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Read from a stream, starting at its current position
    pub fn reader(mut self, reader: &'a mut dyn Read) -> Self {
        self.input = Some(Input::Reader(reader));
        self
    }

    /// Read from a stream after rewinding it
    pub fn seekable(mut self, stream: &'a mut dyn SeekRead) -> Self {
        self.input = Some(Input::Seekable(stream));
        self
    }

    pub fn options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    pub fn read(self) -> Result<Pkgbuild> {
        let content = match (self.path, self.input) {
            (Some(path), None) => {
                debug!("Reading PKGBUILD: {}", path.display());
                let mut file = File::open(&path).map_err(|e| {
                    Error::IoError(format!("Failed to open {}: {}", path.display(), e))
                })?;
                read_text(&mut file)?
            }
            (None, Some(Input::Reader(reader))) => read_text(reader)?,
            (None, Some(Input::Seekable(stream))) => {
                if let Err(e) = stream.seek(SeekFrom::Start(0)) {
                    debug!("Could not rewind PKGBUILD stream: {}", e);
                }
                read_text(stream)?
            }
            (None, None) => {
                return Err(Error::InvalidArgument(
                    "nothing to open: supply a PKGBUILD path or a stream".to_string(),
                ));
            }
            (Some(_), Some(_)) => {
                return Err(Error::InvalidArgument(
                    "supply either a PKGBUILD path or a stream, not both".to_string(),
                ));
            }
        };

        Pkgbuild::parse_str_with(&content, &self.options)
    }
}

fn read_text<R: Read + ?Sized>(reader: &mut R) -> Result<String> {
    let mut content = String::new();
    reader
        .read_to_string(&mut content)
        .map_err(|e| Error::IoError(format!("Failed to read PKGBUILD: {}", e)))?;
    Ok(content)
}
