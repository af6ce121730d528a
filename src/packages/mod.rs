// src/packages/mod.rs

//! Package records and the pacman `.PKGINFO` reader
//!
//! `Package` is the canonical record shared with the PKGBUILD parser;
//! `PacmanPackage` extends it with the fields only a built package has.

pub mod common;
pub mod pacman;

pub use common::Package;
pub use pacman::{PacmanPackage, PacmanPackageReader};
