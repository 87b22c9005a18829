//! Dependency resolution: turning scanned state into package dependencies.
//!
//! [`DependencyResolver`] walks the scanned soname graph in first-seen
//! order, asks the package locator which package provides each soname, and
//! derives a minimum-version constraint by intersecting the symbols the
//! dependent binaries actually reference with the provider's symbols file.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::introspect::BinaryIntrospector;
use crate::locator::PackageLocator;
use crate::model::{PackageDependency, PackageVersion, VersionConstraint};
use crate::scanner::ScanState;
use crate::symbols;

/// Resolves the needed sonames of scanned binaries into package
/// dependencies with version lower-bounds.
pub struct DependencyResolver<'a> {
    locator: &'a dyn PackageLocator,
    introspector: &'a dyn BinaryIntrospector,
    symbol_cache: Mutex<HashMap<PathBuf, Arc<HashSet<String>>>>,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(locator: &'a dyn PackageLocator, introspector: &'a dyn BinaryIntrospector) -> Self {
        Self {
            locator,
            introspector,
            symbol_cache: Mutex::new(HashMap::new()),
        }
    }

    /// Pre-loads the per-path symbol cache, so the introspector is never
    /// consulted for `path`. Mostly useful in tests.
    pub async fn seed_symbols(&self, path: impl Into<PathBuf>, symbols: HashSet<String>) {
        self.symbol_cache
            .lock()
            .await
            .insert(path.into(), Arc::new(symbols));
    }

    /// Resolves every needed soname in first-seen order, skipping the ones
    /// the scanned set provides itself. The result is structurally
    /// de-duplicated, keeping first occurrences; the same package can
    /// legitimately appear twice with different constraints.
    ///
    /// # Errors
    ///
    /// Fails on the first soname no package provides, and on any
    /// introspection or package-database failure. There is no partial
    /// result.
    pub async fn resolve(&self, state: &ScanState) -> Result<Vec<PackageDependency>> {
        let architecture = self.locator.target_architecture().await?;
        let mut dependencies = Vec::new();
        for (soname, dependents) in state.dependency_edges() {
            if state.provides(soname) {
                debug!("skipping self-provided library: {}", soname);
                continue;
            }
            debug!("resolving package name for library: {}", soname);
            let package = self
                .locator
                .provider_for(soname, &architecture)
                .await?
                .ok_or_else(|| Error::UnresolvableSoname(soname.to_string()))?;
            info!("package providing {}: {}", soname, package);

            let constraints = self
                .version_constraints(&package, soname, dependents, &architecture)
                .await?;
            dependencies.push(PackageDependency::new(package, constraints));
        }

        let mut seen = HashSet::new();
        dependencies.retain(|dependency| seen.insert(dependency.clone()));
        Ok(dependencies)
    }

    /// Derives the `>= version` constraint for `package`: the newest
    /// version attached to any symbol of the soname's section that the
    /// dependent binaries reference. `None` when the package ships no
    /// symbols file, the binaries reference nothing, or nothing matches.
    async fn version_constraints(
        &self,
        package: &str,
        soname: &str,
        dependents: &[PathBuf],
        architecture: &str,
    ) -> Result<Option<Vec<VersionConstraint>>> {
        let Some(reader) = self.locator.symbol_table_for(package, architecture).await? else {
            debug!("package {} has no symbols file", package);
            return Ok(None);
        };

        let referenced = self.referenced_symbols(dependents).await?;
        if referenced.is_empty() {
            return Ok(None);
        }

        let mut min_version: Option<PackageVersion> = None;
        for entry in symbols::list_symbols(reader, soname) {
            let (symbol, version) = entry?;
            if !referenced.contains(&symbol) {
                continue;
            }
            debug!("found in-use symbol {} (appeared in {})", symbol, version);
            if min_version.as_ref().map_or(true, |current| version > *current) {
                min_version = Some(version);
            }
        }
        Ok(min_version.map(|version| vec![VersionConstraint::new(">=", version.as_str())]))
    }

    /// Union of the dynamic symbols referenced by the dependent binaries.
    /// Extractions run concurrently and are cached per path for the
    /// session.
    async fn referenced_symbols(&self, dependents: &[PathBuf]) -> Result<HashSet<String>> {
        let per_path = future::try_join_all(
            dependents
                .iter()
                .map(|path| self.referenced_symbols_for(path)),
        )
        .await?;

        let mut union = HashSet::new();
        for extracted in per_path {
            union.extend(extracted.iter().cloned());
        }
        Ok(union)
    }

    async fn referenced_symbols_for(&self, path: &Path) -> Result<Arc<HashSet<String>>> {
        if let Some(cached) = self.symbol_cache.lock().await.get(path) {
            return Ok(Arc::clone(cached));
        }
        let extracted = Arc::new(self.introspector.read_symbols(path).await?);
        self.symbol_cache
            .lock()
            .await
            .insert(path.to_path_buf(), Arc::clone(&extracted));
        Ok(extracted)
    }
}
