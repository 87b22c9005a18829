//! Binary introspection: reading link metadata and dynamic symbols.
//!
//! The [`BinaryIntrospector`] trait is the seam between the engine and the
//! tools that actually read ELF files. Production code uses
//! [`BinutilsIntrospector`], which shells out to `objdump` and `nm`; tests
//! substitute scripted implementations.

mod binutils;

pub use binutils::BinutilsIntrospector;

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;

/// The four magic bytes every ELF file starts with.
const ELF_MAGIC: [u8; 4] = [0x7f, 0x45, 0x4c, 0x46];

/// Link metadata extracted from one ELF binary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkInfo {
    /// Sonames of the shared libraries the binary needs, in link order,
    /// duplicates dropped.
    pub needed: Vec<String>,
    /// The soname the binary itself advertises, if any.
    pub soname: Option<String>,
}

/// Reads link metadata and dynamic symbols out of ELF binaries.
#[async_trait]
pub trait BinaryIntrospector: Send + Sync {
    /// Extracts the needed libraries and advertised soname of `path`.
    ///
    /// # Errors
    ///
    /// Fails when the underlying tool cannot be spawned or exits
    /// abnormally. The error names the operation and the path.
    async fn read_links(&self, path: &Path) -> Result<LinkInfo>;

    /// Extracts the names of every dynamic symbol of `path`, defined and
    /// undefined alike.
    ///
    /// # Errors
    ///
    /// Fails when the underlying tool cannot be spawned or exits
    /// abnormally. The error names the operation and the path.
    async fn read_symbols(&self, path: &Path) -> Result<HashSet<String>>;
}

/// Checks whether `path` starts with the ELF magic bytes. Files shorter
/// than the magic are simply not ELF files.
pub fn is_elf_file(path: &Path) -> io::Result<bool> {
    let mut file = File::open(path)?;
    let mut magic = [0u8; 4];
    match file.read_exact(&mut magic) {
        Ok(()) => Ok(magic == ELF_MAGIC),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_detects_elf_magic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("binary");
        fs::write(&path, b"\x7fELF\x02\x01\x01\0 more header bytes").unwrap();
        assert!(is_elf_file(&path).unwrap());
    }

    #[test]
    fn test_rejects_other_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script");
        fs::write(&path, b"#!/bin/sh\necho hello\n").unwrap();
        assert!(!is_elf_file(&path).unwrap());
    }

    #[test]
    fn test_short_and_empty_files_are_not_elf() {
        let dir = tempfile::tempdir().unwrap();
        let short = dir.path().join("short");
        fs::write(&short, b"\x7fEL").unwrap();
        assert!(!is_elf_file(&short).unwrap());

        let empty = dir.path().join("empty");
        fs::write(&empty, b"").unwrap();
        assert!(!is_elf_file(&empty).unwrap());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(is_elf_file(&dir.path().join("absent")).is_err());
    }
}
