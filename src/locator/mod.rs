//! Package database lookups.
//!
//! The [`PackageLocator`] trait is the seam between the resolver and the
//! system package database. Production code uses [`DpkgLocator`], which
//! shells out to the dpkg toolchain; tests substitute scripted
//! implementations.

mod dpkg;

pub use dpkg::DpkgLocator;

use std::io::BufRead;

use async_trait::async_trait;

use crate::error::Result;

/// Answers provider and symbols questions against a package database.
#[async_trait]
pub trait PackageLocator: Send + Sync {
    /// The architecture dependency resolution targets, resolved once per
    /// session.
    async fn target_architecture(&self) -> Result<String>;

    /// The name of the package providing `soname`, preferring a provider
    /// built for `architecture`. `None` when no installed package
    /// provides it.
    async fn provider_for(&self, soname: &str, architecture: &str) -> Result<Option<String>>;

    /// A reader over the symbols resource for `package` on
    /// `architecture`, or `None` when the package ships no symbols
    /// information.
    async fn symbol_table_for(
        &self,
        package: &str,
        architecture: &str,
    ) -> Result<Option<Box<dyn BufRead + Send>>>;
}
