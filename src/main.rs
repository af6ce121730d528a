// src/main.rs

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, OutputArgs};
use parched::{
    ChecksumAlgorithm, PacmanPackage, PacmanPackageReader, ParseOptions, Pkgbuild, PkgbuildReader,
};
use serde::Serialize;
use strum::IntoEnumIterator;
use tracing::debug;

fn main() -> Result<()> {
    // Logs go to stderr so --json output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Pkginfo { path, output } => {
            let options = load_options(&output)?;
            let pkg = PacmanPackageReader::new()
                .path(&path)
                .options(options)
                .read()
                .with_context(|| format!("Failed to read package {}", path.display()))?;

            if output.json {
                print_json(&pkg)
            } else {
                print_pkginfo(&pkg);
                Ok(())
            }
        }
        Commands::Pkgbuild { path, output } => {
            let options = load_options(&output)?;
            let pkg = PkgbuildReader::new()
                .path(&path)
                .options(options)
                .read()
                .with_context(|| format!("Failed to parse PKGBUILD {}", path.display()))?;

            if output.json {
                print_json(&pkg)
            } else {
                print_pkgbuild(&pkg);
                Ok(())
            }
        }
    }
}

fn load_options(output: &OutputArgs) -> Result<ParseOptions> {
    match &output.config {
        Some(path) => {
            debug!("Loading parse options from {}", path.display());
            Ok(ParseOptions::load(path)?)
        }
        None => Ok(ParseOptions::default()),
    }
}

fn print_json<T: Serialize>(record: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(record).context("Failed to serialize record")?;
    println!("{}", json);
    Ok(())
}

fn print_field(label: &str, value: &str) {
    if !value.is_empty() {
        println!("{:<14}: {}", label, value);
    }
}

fn print_list(label: &str, values: &[String]) {
    if !values.is_empty() {
        println!("{:<14}: {}", label, values.join("  "));
    }
}

fn print_pkginfo(pkg: &PacmanPackage) {
    println!("{}", pkg);
    print_field("Description", &pkg.package.description);
    print_field("URL", &pkg.package.url);
    print_list("Licenses", &pkg.package.licenses);
    print_list("Architecture", &pkg.package.architectures);
    print_list("Groups", &pkg.package.groups);
    print_list("Provides", &pkg.package.provides);
    print_list("Depends On", &pkg.package.depends);
    print_list("Optional Deps", &pkg.package.optdepends);
    print_list("Conflicts With", &pkg.package.conflicts);
    print_list("Replaces", &pkg.package.replaces);
    print_list("Make Deps", &pkg.makedepends);
    print_list("Check Deps", &pkg.checkdepends);
    if let Some(size) = pkg.size {
        print_field("Installed Size", &format!("{} bytes", size));
    }
    print_field("Packager", pkg.packager.as_deref().unwrap_or(""));
    if let Some(builddate) = pkg.builddate {
        print_field("Build Date", &builddate.to_rfc2822());
    }
    println!("{:<14}: {}", "Files", pkg.files.len());
}

fn print_pkgbuild(pkg: &Pkgbuild) {
    println!("{}", pkg);
    print_field("Description", &pkg.package.description);
    print_field("URL", &pkg.package.url);
    print_list("Licenses", &pkg.package.licenses);
    print_list("Architecture", &pkg.package.architectures);
    print_list("Depends On", &pkg.package.depends);
    print_list("Make Deps", &pkg.makedepends);
    print_list("Check Deps", &pkg.checkdepends);
    print_list("Optional Deps", &pkg.package.optdepends);
    print_field("Install", &pkg.install);

    let algorithms: Vec<ChecksumAlgorithm> = ChecksumAlgorithm::iter()
        .filter(|alg| pkg.checksums.contains_key(alg))
        .collect();
    // Prefer the strongest declared algorithm for the source listing
    let shown = algorithms.last().copied();

    for (source, sum) in pkg.source_checksums(shown.unwrap_or(ChecksumAlgorithm::Sha256)) {
        match (shown, sum) {
            (Some(alg), Some(sum)) => println!("  {}  {}:{}", source, alg, sum),
            _ => println!("  {}", source),
        }
    }
}
