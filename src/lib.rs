// src/lib.rs

//! Parched: pacman package and PKGBUILD metadata
//!
//! Extracts package metadata from the two text formats of the pacman
//! ecosystem into one canonical record shape:
//!
//! - **`.PKGINFO`**: the flat `key = value` file inside a built package
//!   archive, read by [`PacmanPackage`]
//! - **PKGBUILD**: the Bash build recipe, read by [`Pkgbuild`] without
//!   executing anything
//!
//! Both records embed [`Package`] for the fields they share.
//!
//! ```no_run
//! use parched::{PacmanPackage, Pkgbuild};
//!
//! let built = PacmanPackage::open("nano-8.5-2-x86_64.pkg.tar.zst")?;
//! println!("{} built by {:?}", built, built.packager);
//!
//! let recipe = Pkgbuild::open("PKGBUILD")?;
//! for source in &recipe.sources {
//!     println!("{}", source);
//! }
//! # Ok::<(), parched::Error>(())
//! ```

pub mod archive;
pub mod config;
mod error;
pub mod packages;
pub mod recipe;

pub use archive::{MemoryArchive, PackageArchive, TarArchive};
pub use config::ParseOptions;
pub use error::{Error, Result};
pub use packages::{Package, PacmanPackage, PacmanPackageReader};
pub use recipe::{ChecksumAlgorithm, Pkgbuild, PkgbuildReader};
