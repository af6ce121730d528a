// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use flate2::Compression as GzLevel;
use flate2::write::GzEncoder;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Builds `.PKGINFO` text the way makepkg writes it
pub struct PkginfoGenerator {
    pub name: String,
    pub version: String,
    pub release: u64,
    pub description: String,
    pub url: String,
    pub builddate: i64,
    pub packager: String,
    pub size: u64,
    pub is_forced: bool,
    pub architectures: Vec<String>,
    pub licenses: Vec<String>,
    pub replaces: Vec<String>,
    pub groups: Vec<String>,
    pub depends: Vec<String>,
    pub optdepends: Vec<String>,
    pub conflicts: Vec<String>,
    pub provides: Vec<String>,
    pub backup: Vec<String>,
    pub options: Vec<String>,
}

impl PkginfoGenerator {
    pub fn new(name: &str, version: &str, release: u64) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            release,
            description: "Test package".to_string(),
            url: String::new(),
            builddate: 0,
            packager: "Unknown Packager".to_string(),
            size: 0,
            is_forced: false,
            architectures: Vec::new(),
            licenses: Vec::new(),
            replaces: Vec::new(),
            groups: Vec::new(),
            depends: Vec::new(),
            optdepends: Vec::new(),
            conflicts: Vec::new(),
            provides: Vec::new(),
            backup: Vec::new(),
            options: Vec::new(),
        }
    }

    pub fn render(&self) -> String {
        let mut lines = vec![
            "# Generated by makepkg".to_string(),
            format!("pkgname = {}", self.name),
            format!("pkgver = {}-{}", self.version, self.release),
            format!("pkgdesc = {}", self.description),
            format!("url = {}", self.url),
            format!("builddate = {}", self.builddate),
            format!("packager = {}", self.packager),
            format!("size = {}", self.size),
            format!("force = {}", if self.is_forced { "True" } else { "False" }),
        ];

        let repeated: [(&str, &Vec<String>); 10] = [
            ("arch", &self.architectures),
            ("license", &self.licenses),
            ("replaces", &self.replaces),
            ("group", &self.groups),
            ("depend", &self.depends),
            ("optdepend", &self.optdepends),
            ("conflict", &self.conflicts),
            ("provides", &self.provides),
            ("backup", &self.backup),
            ("makepkgopt", &self.options),
        ];
        for (key, values) in repeated {
            lines.extend(values.iter().map(|v| format!("{} = {}", key, v)));
        }

        lines.join("\n")
    }
}

/// Builds PKGBUILD text with every standard variable set
pub struct PkgbuildGenerator {
    pub name: String,
    pub version: String,
    pub release: u64,
    pub description: String,
    pub url: String,
    pub architectures: Vec<String>,
    pub licenses: Vec<String>,
    pub groups: Vec<String>,
    pub depends: Vec<String>,
    pub makedepends: Vec<String>,
    pub optdepends: Vec<String>,
    pub provides: Vec<String>,
    pub conflicts: Vec<String>,
    pub replaces: Vec<String>,
    pub backup: Vec<String>,
    pub options: Vec<String>,
    pub install: String,
    pub sources: Vec<String>,
    pub noextract: Vec<String>,
    pub md5sums: Vec<String>,
}

impl PkgbuildGenerator {
    pub fn new(name: &str, version: &str, release: u64) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            release,
            description: "Test package".to_string(),
            url: "http://www.test.com".to_string(),
            architectures: Vec::new(),
            licenses: Vec::new(),
            groups: Vec::new(),
            depends: Vec::new(),
            makedepends: Vec::new(),
            optdepends: Vec::new(),
            provides: Vec::new(),
            conflicts: Vec::new(),
            replaces: Vec::new(),
            backup: Vec::new(),
            options: Vec::new(),
            install: String::new(),
            sources: Vec::new(),
            noextract: Vec::new(),
            md5sums: Vec::new(),
        }
    }

    pub fn render(&self) -> String {
        let bare = |values: &[String]| values.join(" ");
        let quoted = |values: &[String]| {
            values
                .iter()
                .map(|v| format!("\"{}\"", v))
                .collect::<Vec<_>>()
                .join(" ")
        };

        [
            format!("pkgname={}", self.name),
            format!("pkgver={}", self.version),
            format!("pkgrel={}", self.release),
            format!("pkgdesc=\"{}\"", self.description),
            format!("arch=({})", bare(&self.architectures)),
            format!("url={}", self.url),
            format!("license=({})", bare(&self.licenses)),
            format!("groups=({})", bare(&self.groups)),
            format!("depends=({})", bare(&self.depends)),
            format!("makedepends=({})", bare(&self.makedepends)),
            format!("optdepends=({})", bare(&self.optdepends)),
            format!("provides=({})", bare(&self.provides)),
            format!("conflicts=({})", bare(&self.conflicts)),
            format!("replaces=({})", bare(&self.replaces)),
            format!("backup=({})", quoted(&self.backup)),
            format!("options=({})", bare(&self.options)),
            format!("install=\"{}\"", self.install),
            format!("source=({})", quoted(&self.sources)),
            format!("noextract=({})", bare(&self.noextract)),
            format!("md5sums=({})", bare(&self.md5sums)),
            "sha1sums=()".to_string(),
            "sha256sums=()".to_string(),
            "sha384sums=()".to_string(),
            "sha512sums=()".to_string(),
            String::new(),
            "build() {".to_string(),
            "    cd \"$srcdir/$pkgname-$pkgver\"".to_string(),
            "    make".to_string(),
            "}".to_string(),
        ]
        .join("\n")
    }
}

/// Uncompressed tar stream holding `members` in order
pub fn tar_bytes(members: &[(&str, &str)]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (name, content) in members {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, name, content.as_bytes())
            .unwrap();
    }
    builder.into_inner().unwrap()
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), GzLevel::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

pub fn xz(data: &[u8]) -> Vec<u8> {
    let mut encoder = xz2::write::XzEncoder::new(Vec::new(), 6);
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

pub fn zstd(data: &[u8]) -> Vec<u8> {
    zstd::encode_all(data, 3).unwrap()
}

/// Write `data` to `name` inside `dir` and return the full path
pub fn write_file(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, data).unwrap();
    path
}
