//! Filesystem scanning: finding ELF binaries and building the soname
//! dependency graph.
//!
//! [`BinaryScanner`] walks the requested paths, probes files for the ELF
//! magic, and records two things in [`ScanState`]: which sonames the
//! scanned set provides itself, and which sonames each scanned binary
//! needs. The resolver later turns that state into package dependencies.
//!
//! # Example
//!
//! ```no_run
//! use std::path::PathBuf;
//!
//! use debdeps::introspect::BinutilsIntrospector;
//! use debdeps::scanner::BinaryScanner;
//!
//! #[tokio::main]
//! async fn main() -> debdeps::Result<()> {
//!     let introspector = BinutilsIntrospector::new();
//!     let mut scanner = BinaryScanner::new(&introspector);
//!     scanner.scan(&[PathBuf::from("target/release")]).await?;
//!
//!     let state = scanner.into_state();
//!     println!("scanned {} binaries", state.scanned_count());
//!     Ok(())
//! }
//! ```

use std::collections::HashSet;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::Result;
use crate::introspect::{self, BinaryIntrospector};

/// Everything learned from scanning a set of binaries.
///
/// Needed sonames are kept in first-seen order, and each soname's dependent
/// paths in first-seen order without duplicates; that order determines the
/// order of the resolved dependency list.
#[derive(Debug, Default)]
pub struct ScanState {
    scanned_paths: HashSet<PathBuf>,
    scanned_sonames: HashSet<String>,
    dependency_edges: IndexMap<String, Vec<PathBuf>>,
}

impl ScanState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `soname` is provided by one of the scanned binaries itself.
    pub fn provides(&self, soname: &str) -> bool {
        self.scanned_sonames.contains(soname)
    }

    /// The needed sonames mapped to the binaries that need them, in
    /// first-seen order.
    pub fn dependency_edges(&self) -> impl Iterator<Item = (&str, &[PathBuf])> {
        self.dependency_edges
            .iter()
            .map(|(soname, paths)| (soname.as_str(), paths.as_slice()))
    }

    /// Number of ELF binaries that were introspected.
    pub fn scanned_count(&self) -> usize {
        self.scanned_paths.len()
    }

    /// Records that `path` was introspected; false if it already had been.
    pub(crate) fn mark_scanned(&mut self, path: &Path) -> bool {
        self.scanned_paths.insert(path.to_path_buf())
    }

    pub(crate) fn add_provided_soname(&mut self, soname: String) {
        self.scanned_sonames.insert(soname);
    }

    pub(crate) fn add_edge(&mut self, soname: String, dependent: &Path) {
        let dependents = self.dependency_edges.entry(soname).or_default();
        if !dependents.iter().any(|existing| existing == dependent) {
            dependents.push(dependent.to_path_buf());
        }
    }
}

/// Walks paths, probes files for the ELF magic, and accumulates a
/// [`ScanState`] through the given introspector.
pub struct BinaryScanner<'a> {
    introspector: &'a dyn BinaryIntrospector,
    state: ScanState,
}

impl<'a> BinaryScanner<'a> {
    pub fn new(introspector: &'a dyn BinaryIntrospector) -> Self {
        Self {
            introspector,
            state: ScanState::new(),
        }
    }

    /// Scans every path in argument order. Directory arguments are walked
    /// recursively, visiting executable regular files and skipping
    /// symbolic links; file arguments are probed directly. Non-ELF files
    /// are silently skipped, and no path is introspected twice.
    ///
    /// # Errors
    ///
    /// The first introspection or I/O failure aborts the scan.
    pub async fn scan(&mut self, paths: &[PathBuf]) -> Result<()> {
        for path in paths {
            if path.is_dir() {
                self.scan_directory(path).await?;
            } else {
                self.scan_file(path).await?;
            }
        }
        Ok(())
    }

    /// Consumes the scanner, returning the accumulated state.
    pub fn into_state(self) -> ScanState {
        self.state
    }

    async fn scan_directory(&mut self, dir: &Path) -> Result<()> {
        // sorted walk, so output order is stable across filesystems
        let walker = WalkDir::new(dir).follow_links(false).sort_by_file_name();
        for entry in walker {
            let entry = entry?;
            if entry.path_is_symlink() {
                debug!("skipping symlink: {}", entry.path().display());
                continue;
            }
            if !entry.file_type().is_file() {
                continue;
            }
            if entry.metadata()?.permissions().mode() & 0o111 == 0 {
                continue;
            }
            self.scan_file(entry.path()).await?;
        }
        Ok(())
    }

    async fn scan_file(&mut self, path: &Path) -> Result<()> {
        if !introspect::is_elf_file(path)? {
            debug!("skipping non-ELF file: {}", path.display());
            return Ok(());
        }
        if !self.state.mark_scanned(path) {
            return Ok(());
        }
        debug!("scanning ELF file: {}", path.display());

        let links = self.introspector.read_links(path).await?;
        let soname = links.soname.or_else(|| fallback_soname(path));
        if let Some(soname) = soname {
            debug!("detected library soname: {}", soname);
            self.state.add_provided_soname(soname);
        }
        for needed in links.needed {
            self.state.add_edge(needed, path);
        }
        Ok(())
    }
}

/// Falls back to the file name for libraries that advertise no soname of
/// their own. Purely a naming heuristic: it catches `libfoo.so` and
/// versioned names like `libfoo.so.1.2`, not libraries renamed to
/// something else entirely.
fn fallback_soname(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    if resembles_shared_library(name) {
        Some(name.to_string())
    } else {
        None
    }
}

/// True when the name contains `.so` followed by either the end of the
/// name or a dot and a digit.
fn resembles_shared_library(name: &str) -> bool {
    let mut rest = name;
    while let Some(pos) = rest.find(".so") {
        rest = &rest[pos + 3..];
        if rest.is_empty() {
            return true;
        }
        if let Some(suffix) = rest.strip_prefix('.') {
            if suffix.starts_with(|c: char| c.is_ascii_digit()) {
                return true;
            }
        }
    }
    false
}
