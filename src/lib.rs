pub mod config;
pub mod error;
pub mod introspect;
pub mod locator;
pub mod model;
pub mod output;
pub mod resolver;
pub mod scanner;
pub mod symbols;

pub use config::Config;
pub use error::{Error, Result};
pub use introspect::{BinaryIntrospector, BinutilsIntrospector, LinkInfo};
pub use locator::{DpkgLocator, PackageLocator};
pub use model::{PackageDependency, PackageVersion, VersionConstraint};
pub use output::OutputFormat;
pub use resolver::DependencyResolver;
pub use scanner::{BinaryScanner, ScanState};
