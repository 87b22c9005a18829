//! Streaming parser for Debian symbols files.
//!
//! A symbols file describes, per library soname, which symbol first
//! appeared in which upstream version of the owning package:
//!
//! ```text
//! libdemo.so.5 libdemo5 #MINVER#
//!  demo_init@Base 1.0
//!  demo_frob@Base 1.4-2
//! libother.so.2 libother2 #MINVER#
//!  other_sym@Base 0.9
//! ```
//!
//! [`list_symbols`] seeks one soname's section and yields its
//! `(symbol, version)` pairs lazily, so a large file is only read up to
//! the end of the interesting section.

use std::io::{self, BufRead};

use crate::model::PackageVersion;

/// Lazy iterator over the `(symbol name, version)` pairs of one soname's
/// section. Created by [`list_symbols`].
pub struct SymbolList<R> {
    lines: io::Lines<R>,
    header: String,
    state: State,
}

#[derive(Clone, Copy)]
enum State {
    Seeking,
    InSection,
    Done,
}

enum LineKind {
    Symbol(String, PackageVersion),
    Skip,
    SectionEnd,
}

/// Returns a lazy iterator over the symbols-file section for `soname`.
///
/// The section starts at the line beginning with `<soname> ` (the trailing
/// space keeps `libfoo.so.1` from matching the `libfoo.so.10` section) and
/// ends at the first line that is not an indented two-token symbol line.
/// Template and metadata lines whose first non-blank character is `|` or
/// `*` are skipped. A trailing `@Base` marker is stripped from symbol
/// names; other `@version` suffixes are kept verbatim. Versions are
/// yielded parsed, so callers compare them under Debian ordering rather
/// than as text.
pub fn list_symbols<R: BufRead>(reader: R, soname: &str) -> SymbolList<R> {
    SymbolList {
        lines: reader.lines(),
        header: format!("{soname} "),
        state: State::Seeking,
    }
}

impl<R: BufRead> Iterator for SymbolList<R> {
    type Item = io::Result<(String, PackageVersion)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let State::Done = self.state {
                return None;
            }
            let line = match self.lines.next() {
                None => {
                    self.state = State::Done;
                    return None;
                }
                Some(Err(e)) => {
                    self.state = State::Done;
                    return Some(Err(e));
                }
                Some(Ok(line)) => line,
            };
            match self.state {
                State::Seeking => {
                    if line.starts_with(&self.header) {
                        self.state = State::InSection;
                    }
                }
                State::InSection => match parse_symbol_line(&line) {
                    LineKind::Symbol(symbol, version) => return Some(Ok((symbol, version))),
                    LineKind::Skip => {}
                    LineKind::SectionEnd => {
                        self.state = State::Done;
                        return None;
                    }
                },
                State::Done => return None,
            }
        }
    }
}

fn parse_symbol_line(line: &str) -> LineKind {
    let trimmed = line.trim_start();
    if trimmed.starts_with('|') || trimmed.starts_with('*') {
        return LineKind::Skip;
    }
    // symbol lines are indented; anything else ends the section
    if !line.starts_with(char::is_whitespace) {
        return LineKind::SectionEnd;
    }
    let mut tokens = line.split_whitespace();
    match (tokens.next(), tokens.next()) {
        (Some(symbol), Some(version)) => {
            let symbol = symbol.strip_suffix("@Base").unwrap_or(symbol);
            LineKind::Symbol(symbol.to_string(), PackageVersion::new(version))
        }
        _ => LineKind::SectionEnd,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    const SYMBOLS_FILE: &str = "\
libfirst.so.1 libfirst1 #MINVER#
 first_sym@Base 1.0
libdemo.so.5 libdemo5 #MINVER#
| libdemo5 (>= 5.2), libdemo5-extra
* Build-Depends-Package: libdemo-dev
 demo_init@Base 5.0
 demo_frob@Base 5.3-1
 demo_versioned@DEMO_5.4 5.4
liblast.so.2 liblast2 #MINVER#
 last_sym@Base 2.0
";

    fn collect(content: &str, soname: &str) -> Vec<(String, String)> {
        list_symbols(Cursor::new(content.to_string()), soname)
            .map(|item| {
                let (symbol, version) = item.unwrap();
                (symbol, version.as_str().to_string())
            })
            .collect()
    }

    #[test]
    fn test_lists_only_the_requested_section() {
        assert_eq!(
            collect(SYMBOLS_FILE, "libdemo.so.5"),
            vec![
                ("demo_init".to_string(), "5.0".to_string()),
                ("demo_frob".to_string(), "5.3-1".to_string()),
                ("demo_versioned@DEMO_5.4".to_string(), "5.4".to_string()),
            ]
        );
    }

    #[test]
    fn test_first_and_last_sections() {
        assert_eq!(
            collect(SYMBOLS_FILE, "libfirst.so.1"),
            vec![("first_sym".to_string(), "1.0".to_string())]
        );
        assert_eq!(
            collect(SYMBOLS_FILE, "liblast.so.2"),
            vec![("last_sym".to_string(), "2.0".to_string())]
        );
    }

    #[test]
    fn test_missing_section_yields_nothing() {
        assert!(collect(SYMBOLS_FILE, "libabsent.so.9").is_empty());
    }

    #[test]
    fn test_soname_match_requires_the_trailing_space() {
        let content = "\
libfoo.so.10 libfoo10 #MINVER#
 ten_only@Base 10.1
libfoo.so.1 libfoo1 #MINVER#
 one_only@Base 1.1
";
        assert_eq!(
            collect(content, "libfoo.so.1"),
            vec![("one_only".to_string(), "1.1".to_string())]
        );
        assert_eq!(
            collect(content, "libfoo.so.10"),
            vec![("ten_only".to_string(), "10.1".to_string())]
        );
    }

    #[test]
    fn test_blank_line_ends_the_section() {
        let content = "\
libdemo.so.5 libdemo5 #MINVER#
 kept@Base 1.0

 lost@Base 2.0
";
        assert_eq!(
            collect(content, "libdemo.so.5"),
            vec![("kept".to_string(), "1.0".to_string())]
        );
    }

    #[test]
    fn test_indented_line_without_version_ends_the_section() {
        let content = "\
libdemo.so.5 libdemo5 #MINVER#
 kept@Base 1.0
 dangling
 lost@Base 2.0
";
        assert_eq!(
            collect(content, "libdemo.so.5"),
            vec![("kept".to_string(), "1.0".to_string())]
        );
    }

    #[test]
    fn test_versions_come_back_parsed() {
        let content = "\
libdemo.so.5 libdemo5 #MINVER#
 newer@Base 1.10
 older@Base 1.9
";
        let pairs: Vec<(String, PackageVersion)> =
            list_symbols(Cursor::new(content.to_string()), "libdemo.so.5")
                .map(|item| item.unwrap())
                .collect();
        // 1.10 is newer than 1.9 under Debian rules, unlike string order
        assert!(pairs[0].1 > pairs[1].1);
    }
}
