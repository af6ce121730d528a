// src/recipe/mod.rs

//! PKGBUILD recipe parsing
//!
//! A PKGBUILD is read in four stages:
//!
//! - **Lexer**: shell-style word splitting, quoting and escapes
//! - **Tokenizer**: top-level assignments, with array literals collected
//!   and function bodies skipped
//! - **Symbols**: raw values by name, then `$name` expansion over the table
//! - **Mapper**: symbols copied into a `Pkgbuild` record
//!
//! # Example
//!
//! ```
//! use parched::recipe::Pkgbuild;
//!
//! let pkg = Pkgbuild::parse_str("pkgname=foo\npkgver=1.0\nsource=(\"$pkgname-$pkgver.tar.gz\")")?;
//! assert_eq!(pkg.sources, vec!["foo-1.0.tar.gz"]);
//! # Ok::<(), parched::Error>(())
//! ```

pub mod lexer;
mod mapper;
pub mod pkgbuild;
mod symbols;
pub mod tokenizer;

pub use pkgbuild::{ChecksumAlgorithm, Pkgbuild, PkgbuildReader, SeekRead};
pub use symbols::SymbolValue;
pub use tokenizer::{AssignedValue, Assignment, Tokenizer};
