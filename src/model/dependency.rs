//! Dependency types rendered in Debian `Depends` syntax.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single version bound attached to a dependency, such as `>= 2.28`.
///
/// The resolver only ever emits `>=` bounds, but the operator is kept as
/// data so the rendered output stays valid Debian syntax for any relation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionConstraint {
    pub operator: String,
    pub version: String,
}

impl VersionConstraint {
    pub fn new(operator: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            operator: operator.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.operator, self.version)
    }
}

/// A resolved dependency on a system package.
///
/// Displays in Debian control-file form: `libc6` when unconstrained, or
/// `libc6 (>= 2.28)` with the constraints joined by `", "` inside the
/// parentheses. `version_constraints` is `None` when no minimum version
/// could be derived; when present, the list is non-empty.
///
/// Equality and hashing are structural over the name and constraints,
/// which lets the resolver drop exact duplicates while keeping two
/// differently-constrained entries for the same package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageDependency {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_constraints: Option<Vec<VersionConstraint>>,
}

impl PackageDependency {
    pub fn new(
        name: impl Into<String>,
        version_constraints: Option<Vec<VersionConstraint>>,
    ) -> Self {
        Self {
            name: name.into(),
            version_constraints,
        }
    }
}

impl fmt::Display for PackageDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(constraints) = &self.version_constraints {
            let joined: Vec<String> = constraints.iter().map(ToString::to_string).collect();
            write!(f, " ({})", joined.join(", "))?;
        }
        Ok(())
    }
}
