use std::env;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::error::{Error, Result};

use super::PackageLocator;

const DEFAULT_SYMBOLS_DIR: &str = "/var/lib/dpkg/info";

/// The stderr text dpkg-query prints when a search pattern matches no
/// installed file. Distinguishes "nothing provides this" from real
/// failures.
const NO_MATCH_MARKER: &str = "no path found matching pattern";

/// [`PackageLocator`] backed by the dpkg toolchain: `dpkg-query -S` for
/// provider lookups, `dpkg --print-architecture` for the native
/// architecture, and the dpkg info directory for symbols files.
#[derive(Debug, Default)]
pub struct DpkgLocator {
    symbols_dir: Option<PathBuf>,
    architecture_override: Option<String>,
    native_arch: OnceCell<String>,
}

impl DpkgLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the directory symbols files are read from. Defaults to
    /// `/var/lib/dpkg/info`.
    pub fn with_symbols_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.symbols_dir = Some(dir.into());
        self
    }

    /// Overrides the target architecture so `dpkg` is never queried. The
    /// `DEB_HOST_ARCH` and `DEB_BUILD_ARCH` environment variables still
    /// take precedence.
    pub fn with_architecture(mut self, architecture: impl Into<String>) -> Self {
        self.architecture_override = Some(architecture.into());
        self
    }

    async fn native_architecture(&self) -> Result<String> {
        self.native_arch
            .get_or_try_init(|| async {
                let context = "getting dpkg architecture".to_string();
                let output = Command::new("dpkg")
                    .arg("--print-architecture")
                    .output()
                    .await
                    .map_err(|source| Error::ToolSpawn {
                        tool: "dpkg",
                        context: context.clone(),
                        source,
                    })?;
                if !output.status.success() {
                    return Err(Error::ToolFailed {
                        tool: "dpkg",
                        context,
                        detail: output.status.to_string(),
                    });
                }
                Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
            })
            .await
            .map(|architecture| architecture.clone())
    }
}

#[async_trait]
impl PackageLocator for DpkgLocator {
    async fn target_architecture(&self) -> Result<String> {
        for var in ["DEB_HOST_ARCH", "DEB_BUILD_ARCH"] {
            if let Ok(value) = env::var(var) {
                if !value.is_empty() {
                    return Ok(value);
                }
            }
        }
        if let Some(architecture) = &self.architecture_override {
            return Ok(architecture.clone());
        }
        self.native_architecture().await
    }

    async fn provider_for(&self, soname: &str, architecture: &str) -> Result<Option<String>> {
        let context = format!("finding packages that provide {soname}");
        let output = Command::new("dpkg-query")
            .arg("-S")
            .arg(format!("*/{soname}"))
            .output()
            .await
            .map_err(|source| Error::ToolSpawn {
                tool: "dpkg-query",
                context: context.clone(),
                source,
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if output.status.code().is_some() && stderr.contains(NO_MATCH_MARKER) {
                return Ok(None);
            }
            return Err(Error::ToolFailed {
                tool: "dpkg-query",
                context,
                detail: format!("{}: {}", output.status, stderr.trim()),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let entries = parse_query_output(&stdout);
        debug!("packages providing {}: {:?}", soname, entries);
        Ok(pick_provider(&entries, architecture).map(str::to_string))
    }

    async fn symbol_table_for(
        &self,
        package: &str,
        architecture: &str,
    ) -> Result<Option<Box<dyn BufRead + Send>>> {
        let dir = self
            .symbols_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SYMBOLS_DIR));
        let path = dir.join(format!("{package}:{architecture}.symbols"));
        match File::open(&path) {
            Ok(file) => Ok(Some(Box::new(BufReader::new(file)))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("no symbols file at {}", path.display());
                Ok(None)
            }
            Err(e) => Err(Error::Io(e)),
        }
    }
}

/// Parses `dpkg-query -S` output lines of the form
/// `<package>[:<architecture>]: <path>` into `(package, architecture)`
/// pairs. Lines that do not fit, like diversion notices, are dropped.
fn parse_query_output(output: &str) -> Vec<(String, Option<String>)> {
    output.lines().filter_map(parse_query_line).collect()
}

fn parse_query_line(line: &str) -> Option<(String, Option<String>)> {
    let (head, _path) = line.split_once(": ")?;
    if head.is_empty() || head.chars().any(char::is_whitespace) {
        return None;
    }
    match head.split_once(':') {
        Some((package, architecture)) if !package.is_empty() && !architecture.is_empty() => {
            Some((package.to_string(), Some(architecture.to_string())))
        }
        Some(_) => None,
        None => Some((head.to_string(), None)),
    }
}

/// Prefers the entry built for `architecture`, falling back to the first
/// entry when none matches exactly.
fn pick_provider<'a>(
    entries: &'a [(String, Option<String>)],
    architecture: &str,
) -> Option<&'a str> {
    entries
        .iter()
        .find(|(_, arch)| arch.as_deref() == Some(architecture))
        .or_else(|| entries.first())
        .map(|(package, _)| package.as_str())
}
