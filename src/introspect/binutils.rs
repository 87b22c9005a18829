use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{Error, Result};

use super::{BinaryIntrospector, LinkInfo};

/// [`BinaryIntrospector`] backed by the binutils command-line tools:
/// `objdump -p` for link metadata, `nm -D` for dynamic symbols.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinutilsIntrospector;

impl BinutilsIntrospector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BinaryIntrospector for BinutilsIntrospector {
    async fn read_links(&self, path: &Path) -> Result<LinkInfo> {
        let context = format!("scanning dependencies of {}", path.display());
        let stdout = run_tool("objdump", "-p", path, context).await?;
        Ok(parse_link_lines(&stdout))
    }

    async fn read_symbols(&self, path: &Path) -> Result<HashSet<String>> {
        let context = format!("extracting dynamic symbols from {}", path.display());
        let stdout = run_tool("nm", "-D", path, context).await?;
        Ok(parse_symbol_lines(&stdout))
    }
}

async fn run_tool(tool: &'static str, flag: &str, path: &Path, context: String) -> Result<String> {
    let output = Command::new(tool)
        .arg(flag)
        .arg(path)
        .output()
        .await
        .map_err(|source| Error::ToolSpawn {
            tool,
            context: context.clone(),
            source,
        })?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = if stderr.trim().is_empty() {
            output.status.to_string()
        } else {
            format!("{}: {}", output.status, stderr.trim())
        };
        return Err(Error::ToolFailed {
            tool,
            context,
            detail,
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn parse_link_lines(output: &str) -> LinkInfo {
    let mut info = LinkInfo::default();
    for line in output.lines() {
        let line = line.trim_start();
        if let Some(value) = tagged_value(line, "NEEDED") {
            if !info.needed.iter().any(|existing| existing == value) {
                info.needed.push(value.to_string());
            }
        } else if let Some(value) = tagged_value(line, "SONAME") {
            // repeated SONAME entries: last one wins
            info.soname = Some(value.to_string());
        }
    }
    info
}

/// Matches dynamic-section lines of the form `TAG   value`, returning the
/// trimmed value. `TAG` must be followed by whitespace so that e.g.
/// `SONAMEX` does not match.
fn tagged_value<'a>(line: &'a str, tag: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(tag)?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let value = rest.trim();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn parse_symbol_lines(output: &str) -> HashSet<String> {
    let mut symbols = HashSet::new();
    for line in output.lines() {
        if let Some(name) = symbol_name(line) {
            symbols.insert(name.to_string());
        }
    }
    symbols
}

/// Matches `nm -D` lines of the form `[address] TYPE name`: an optional
/// address column, whitespace, a one-letter symbol type, whitespace, and
/// the symbol name. Both defined and undefined symbols count.
fn symbol_name(line: &str) -> Option<&str> {
    let rest = line.trim_start_matches(|c: char| !c.is_whitespace());
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let mut chars = rest.trim_start().chars();
    if !chars.next()?.is_ascii_alphabetic() {
        return None;
    }
    let rest = chars.as_str();
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let name = rest.trim();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OBJDUMP_OUTPUT: &str = "\
/usr/lib/libdemo.so.5.1:     file format elf64-x86-64

Dynamic Section:
  NEEDED               libselinux.so.1
  NEEDED               libc.so.6
  NEEDED               libc.so.6
  SONAME               libdemo.so.4
  SONAME               libdemo.so.5
  INIT                 0x0000000000004c18
  RUNPATH              $ORIGIN/../lib

Version References:
  required from libc.so.6:
    0x09691a75 0x00 05 GLIBC_2.2.5
";

    #[test]
    fn test_parse_needed_and_soname() {
        let info = parse_link_lines(OBJDUMP_OUTPUT);
        assert_eq!(info.needed, vec!["libselinux.so.1", "libc.so.6"]);
        assert_eq!(info.soname.as_deref(), Some("libdemo.so.5"));
    }

    #[test]
    fn test_parse_executable_without_soname() {
        let output = "Dynamic Section:\n  NEEDED               libc.so.6\n";
        let info = parse_link_lines(output);
        assert_eq!(info.needed, vec!["libc.so.6"]);
        assert_eq!(info.soname, None);
    }

    #[test]
    fn test_tag_must_be_a_whole_token() {
        assert_eq!(tagged_value("NEEDEDX  libc.so.6", "NEEDED"), None);
        assert_eq!(tagged_value("NEEDED", "NEEDED"), None);
        assert_eq!(tagged_value("NEEDED   libc.so.6", "NEEDED"), Some("libc.so.6"));
    }

    #[test]
    fn test_parse_symbol_lines() {
        let output = "\
0000000000004f60 T demo_init
                 U malloc
                 U pow@GLIBC_2.29
                 w __gmon_start__
0000000000008a20 B demo_state
";
        let symbols = parse_symbol_lines(output);
        assert!(symbols.contains("demo_init"));
        assert!(symbols.contains("malloc"));
        assert!(symbols.contains("pow@GLIBC_2.29"));
        assert!(symbols.contains("__gmon_start__"));
        assert!(symbols.contains("demo_state"));
        assert_eq!(symbols.len(), 5);
    }

    #[test]
    fn test_symbol_lines_reject_other_text() {
        assert_eq!(symbol_name(""), None);
        assert_eq!(symbol_name("libdemo.so.5:"), None);
        assert_eq!(symbol_name("                 w"), None);
        assert_eq!(symbol_name("nm: warning: something"), None);
    }
}
