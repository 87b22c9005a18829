//! Core data types for package dependencies and Debian versions.
//!
//! This module contains the fundamental types used throughout debdeps:
//!
//! - [`PackageDependency`] - A resolved dependency on a system package
//! - [`VersionConstraint`] - A version bound attached to a dependency
//! - [`PackageVersion`] - A Debian version string with dpkg's total order
//!
//! # Example
//!
//! ```
//! use debdeps::{PackageDependency, PackageVersion, VersionConstraint};
//!
//! let constraint = VersionConstraint::new(">=", "2.28");
//! let dependency = PackageDependency::new("libc6", Some(vec![constraint]));
//!
//! assert_eq!(dependency.to_string(), "libc6 (>= 2.28)");
//! assert!(PackageVersion::new("2.28") < PackageVersion::new("2.31"));
//! ```

mod dependency;
mod version;

pub use dependency::*;
pub use version::*;
