//! Error types shared across the crate.

use std::io;

use thiserror::Error;

/// Convenience alias used by every fallible operation in this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// An external tool could not be started at all.
    #[error("{context}: cannot spawn '{tool}': {source}")]
    ToolSpawn {
        tool: &'static str,
        context: String,
        #[source]
        source: io::Error,
    },

    /// An external tool started but exited abnormally.
    #[error("{context}: '{tool}' failed: {detail}")]
    ToolFailed {
        tool: &'static str,
        context: String,
        detail: String,
    },

    /// A needed soname is not provided by any installed package.
    #[error("no package provides {0}")]
    UnresolvableSoname(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolvable_soname_names_the_soname() {
        let err = Error::UnresolvableSoname("libfoo.so.1".to_string());
        assert_eq!(err.to_string(), "no package provides libfoo.so.1");
    }

    #[test]
    fn test_tool_failure_names_tool_and_context() {
        let err = Error::ToolFailed {
            tool: "objdump",
            context: "scanning dependencies of /bin/ls".to_string(),
            detail: "exit status: 1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "scanning dependencies of /bin/ls: 'objdump' failed: exit status: 1"
        );
    }
}
