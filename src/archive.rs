// src/archive.rs

//! Package archive access
//!
//! The `.PKGINFO` reader only needs two things from a package archive: the
//! ordered list of member names and a way to read one member by name. Those
//! are expressed by the `PackageArchive` trait so callers can hand in an
//! archive they already hold open. `TarArchive` covers real pacman packages
//! (`.pkg.tar.zst`, `.pkg.tar.xz`, `.pkg.tar.gz` or plain tar) and
//! `MemoryArchive` covers members that are already in memory.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use tar::Archive;
use tracing::debug;

/// Name of the metadata member inside a pacman package
pub const PKGINFO: &str = ".PKGINFO";

/// Read access to the members of a package archive
pub trait PackageArchive {
    /// Names of all members, in archive order
    fn member_names(&mut self) -> Result<Vec<String>>;

    /// Open the named member positioned at its start, or `None` if absent
    fn open_member(&mut self, name: &str) -> Result<Option<Box<dyn Read + '_>>>;
}

/// Compression applied to a tar stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Plain tar
    None,
    /// Gzip (.gz)
    Gzip,
    /// XZ/LZMA (.xz)
    Xz,
    /// Zstandard (.zst)
    Zstd,
}

impl Compression {
    /// Detect compression from magic bytes
    ///
    /// - Gzip: `1f 8b`
    /// - XZ: `fd 37 7a 58 5a 00`
    /// - Zstd: `28 b5 2f fd`
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x1f, 0x8b]) {
            Some(Self::Gzip)
        } else if data.starts_with(&[0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00]) {
            Some(Self::Xz)
        } else if data.starts_with(&[0x28, 0xb5, 0x2f, 0xfd]) {
            Some(Self::Zstd)
        } else {
            None
        }
    }

    /// Detect compression from the file name
    pub fn from_extension(path: &str) -> Self {
        if path.ends_with(".gz") || path.ends_with(".tgz") {
            Self::Gzip
        } else if path.ends_with(".xz") {
            Self::Xz
        } else if path.ends_with(".zst") || path.ends_with(".zstd") {
            Self::Zstd
        } else {
            Self::None
        }
    }

    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Gzip => "gzip",
            Self::Xz => "xz",
            Self::Zstd => "zstd",
        }
    }

    fn decoder<'a, R: Read + 'a>(self, reader: R) -> Result<Box<dyn Read + 'a>> {
        match self {
            Self::None => Ok(Box::new(reader)),
            Self::Gzip => Ok(Box::new(flate2::read::GzDecoder::new(reader))),
            Self::Xz => Ok(Box::new(xz2::read::XzDecoder::new(reader))),
            Self::Zstd => {
                let decoder = zstd::Decoder::new(reader).map_err(|e| {
                    Error::ArchiveError(format!("Failed to create zstd decoder: {}", e))
                })?;
                Ok(Box::new(decoder))
            }
        }
    }
}

impl std::fmt::Display for Compression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

enum TarSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// A (possibly compressed) tar archive
///
/// Tar streams are sequential, so every listing or member lookup re-opens
/// the underlying file and decodes from the start. No file handle is held
/// between calls.
pub struct TarArchive {
    source: TarSource,
    compression: Compression,
}

impl TarArchive {
    /// Open a package file, detecting compression from its magic bytes and
    /// falling back to the file extension
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|e| {
            Error::IoError(format!("Failed to open package file {}: {}", path.display(), e))
        })?;

        let mut magic = [0u8; 6];
        let mut filled = 0;
        while filled < magic.len() {
            let n = file.read(&mut magic[filled..]).map_err(|e| {
                Error::IoError(format!("Failed to read package file {}: {}", path.display(), e))
            })?;
            if n == 0 {
                break;
            }
            filled += n;
        }

        let compression = Compression::from_magic_bytes(&magic[..filled])
            .unwrap_or_else(|| Compression::from_extension(&path.to_string_lossy()));
        debug!("Opened package archive {} ({})", path.display(), compression);

        Ok(Self {
            source: TarSource::Path(path.to_path_buf()),
            compression,
        })
    }

    /// Wrap an archive already held in memory
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let compression = Compression::from_magic_bytes(&data).unwrap_or(Compression::None);
        Self {
            source: TarSource::Bytes(data),
            compression,
        }
    }

    /// Compression detected for this archive
    pub fn compression(&self) -> Compression {
        self.compression
    }

    fn archive(&self) -> Result<Archive<Box<dyn Read + '_>>> {
        let reader: Box<dyn Read + '_> = match &self.source {
            TarSource::Path(path) => {
                let file = File::open(path).map_err(|e| {
                    Error::IoError(format!(
                        "Failed to open package file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                self.compression.decoder(file)?
            }
            TarSource::Bytes(data) => self.compression.decoder(Cursor::new(data.as_slice()))?,
        };

        Ok(Archive::new(reader))
    }
}

/// Strip the `./` prefix some tar writers put on member names
fn normalize_member_name(name: &str) -> &str {
    name.strip_prefix("./").unwrap_or(name)
}

impl PackageArchive for TarArchive {
    fn member_names(&mut self) -> Result<Vec<String>> {
        let mut archive = self.archive()?;
        let mut names = Vec::new();

        for entry in archive
            .entries()
            .map_err(|e| Error::ArchiveError(format!("Failed to read archive entries: {}", e)))?
        {
            let entry = entry
                .map_err(|e| Error::ArchiveError(format!("Failed to read archive entry: {}", e)))?;
            let entry_path = entry
                .path()
                .map_err(|e| Error::ArchiveError(format!("Failed to get entry path: {}", e)))?
                .to_string_lossy()
                .to_string();

            let name = normalize_member_name(&entry_path);
            if !name.is_empty() && name != "." {
                names.push(name.to_string());
            }
        }

        Ok(names)
    }

    fn open_member(&mut self, name: &str) -> Result<Option<Box<dyn Read + '_>>> {
        let wanted = normalize_member_name(name);
        let mut archive = self.archive()?;

        for entry in archive
            .entries()
            .map_err(|e| Error::ArchiveError(format!("Failed to read archive entries: {}", e)))?
        {
            let mut entry = entry
                .map_err(|e| Error::ArchiveError(format!("Failed to read archive entry: {}", e)))?;
            let entry_path = entry
                .path()
                .map_err(|e| Error::ArchiveError(format!("Failed to get entry path: {}", e)))?
                .to_string_lossy()
                .to_string();

            if normalize_member_name(&entry_path) == wanted {
                let mut content = Vec::new();
                entry.read_to_end(&mut content).map_err(|e| {
                    Error::ArchiveError(format!("Failed to read member {}: {}", wanted, e))
                })?;
                return Ok(Some(Box::new(Cursor::new(content))));
            }
        }

        Ok(None)
    }
}

/// An archive whose members are already in memory, kept in insertion order
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    members: Vec<(String, Vec<u8>)>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member; a later member with the same name replaces the earlier one
    pub fn add(&mut self, name: impl Into<String>, content: impl Into<Vec<u8>>) {
        let name = name.into();
        let content = content.into();
        match self.members.iter_mut().find(|(n, _)| *n == name) {
            Some(member) => member.1 = content,
            None => self.members.push((name, content)),
        }
    }

    /// Builder-style `add`
    pub fn with_member(mut self, name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.add(name, content);
        self
    }
}

impl PackageArchive for MemoryArchive {
    fn member_names(&mut self) -> Result<Vec<String>> {
        Ok(self.members.iter().map(|(name, _)| name.clone()).collect())
    }

    fn open_member(&mut self, name: &str) -> Result<Option<Box<dyn Read + '_>>> {
        Ok(self
            .members
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, content)| Box::new(content.as_slice()) as Box<dyn Read + '_>))
    }
}
