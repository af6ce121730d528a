// src/cli.rs
//! Command-line definitions for the `parched` inspection tool

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "parched")]
#[command(version)]
#[command(about = "Inspect pacman packages and PKGBUILD recipes", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the .PKGINFO metadata of a built package
    Pkginfo {
        /// Path to the package file (.pkg.tar.zst, .pkg.tar.xz, ...)
        path: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show the metadata declared by a PKGBUILD
    Pkgbuild {
        /// Path to the PKGBUILD
        path: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },
}

/// Options shared by every subcommand
#[derive(Args)]
pub struct OutputArgs {
    /// Print the record as JSON
    #[arg(long)]
    pub json: bool,

    /// Parse options file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
