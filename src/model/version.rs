//! Debian package version parsing and comparison.

use std::cmp::Ordering;
use std::fmt;

/// A Debian package version, ordered by the comparison rules dpkg uses.
///
/// A version string has the shape `[epoch:]upstream[-revision]`:
///
/// - `epoch` is the integer before the first `:`; a missing epoch is 0.
/// - `revision` is everything after the *last* `-`; a missing revision
///   compares like `0`, so `1.2` and `1.2-0` are equal.
/// - `upstream` is everything in between.
///
/// Upstream and revision compare piecewise: each is split into maximal runs
/// of digits, runs of ASCII letters, single `~` characters, and runs of any
/// other characters. Digit runs compare as integers, other runs compare as
/// strings, and `~` sorts before everything else including the end of the
/// string, so `1.2~rc1` precedes `1.2`.
///
/// # Example
///
/// ```
/// use debdeps::PackageVersion;
///
/// assert!(PackageVersion::new("1:1.2") > PackageVersion::new("2.9"));
/// assert!(PackageVersion::new("2.28~rc1") < PackageVersion::new("2.28"));
/// assert_eq!(PackageVersion::new("1.2"), PackageVersion::new("1.2-0"));
/// ```
#[derive(Debug, Clone)]
pub struct PackageVersion {
    original: String,
    epoch: u64,
    upstream: String,
    revision: String,
}

impl PackageVersion {
    /// Parses a version string. Parsing never fails: input without a valid
    /// numeric epoch is treated as having epoch 0, and a missing revision
    /// compares like `0`.
    pub fn new(version: impl Into<String>) -> Self {
        let original = version.into();
        let (epoch, rest) = match original.split_once(':') {
            Some((epoch, rest)) if is_numeric(epoch) => {
                (epoch.parse().unwrap_or(0), rest)
            }
            _ => (0, original.as_str()),
        };
        let (upstream, revision) = match rest.rsplit_once('-') {
            Some((upstream, revision)) => (upstream.to_string(), revision.to_string()),
            None => (rest.to_string(), String::new()),
        };
        Self {
            original,
            epoch,
            upstream,
            revision,
        }
    }

    /// The version text exactly as it appeared in the input.
    pub fn as_str(&self) -> &str {
        &self.original
    }

    fn effective_revision(&self) -> &str {
        if self.revision.is_empty() {
            "0"
        } else {
            &self.revision
        }
    }
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl Ord for PackageVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| compare_part(&self.upstream, &other.upstream))
            .then_with(|| compare_part(self.effective_revision(), other.effective_revision()))
    }
}

impl PartialOrd for PackageVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for PackageVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PackageVersion {}

/// Compares one upstream or revision part token by token. The shorter token
/// list is padded with empty tokens so the comparison stays symmetric; `~`
/// sorts before the empty token, which is what makes `1.0~rc1` precede `1.0`.
fn compare_part(a: &str, b: &str) -> Ordering {
    let a_tokens = tokenize(a);
    let b_tokens = tokenize(b);
    for i in 0..a_tokens.len().max(b_tokens.len()) {
        let x = a_tokens.get(i).copied().unwrap_or("");
        let y = b_tokens.get(i).copied().unwrap_or("");
        let ordering = compare_tokens(x, y);
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn compare_tokens(x: &str, y: &str) -> Ordering {
    if is_numeric(x) && is_numeric(y) {
        return compare_numeric(x, y);
    }
    match (x == "~", y == "~") {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => x.cmp(y),
    }
}

/// Splits a version part into maximal runs of digits, runs of ASCII letters,
/// single `~` characters, and runs of everything else.
fn tokenize(part: &str) -> Vec<&str> {
    let bytes = part.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let start = i;
        if bytes[i] == b'~' {
            i += 1;
        } else if bytes[i].is_ascii_digit() {
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
        } else if bytes[i].is_ascii_alphabetic() {
            while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
                i += 1;
            }
        } else {
            while i < bytes.len()
                && bytes[i] != b'~'
                && !bytes[i].is_ascii_digit()
                && !bytes[i].is_ascii_alphabetic()
            {
                i += 1;
            }
        }
        tokens.push(&part[start..i]);
    }
    tokens
}

fn is_numeric(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

/// Integer comparison on digit runs of any length. Leading zeros are
/// insignificant; after trimming them, a longer run is the larger number.
fn compare_numeric(x: &str, y: &str) -> Ordering {
    let x = x.trim_start_matches('0');
    let y = y.trim_start_matches('0');
    x.len().cmp(&y.len()).then_with(|| x.cmp(y))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(s: &str) -> PackageVersion {
        PackageVersion::new(s)
    }

    #[test]
    fn test_equal_versions() {
        assert_eq!(version("1.2.3"), version("1.2.3"));
        assert_eq!(version("1.2"), version("1.2-0"));
        assert_eq!(version("0:1.2"), version("1.2"));
        assert_eq!(version("1.09"), version("1.9"));
    }

    #[test]
    fn test_simple_ordering() {
        assert!(version("1.2") < version("1.3"));
        assert!(version("1.2") < version("1.2.3"));
        assert!(version("1.9") < version("1.10"));
        assert!(version("2.9") < version("10.0"));
    }

    #[test]
    fn test_epoch_dominates() {
        assert!(version("1:1.2") < version("2:1.1"));
        assert!(version("1.2.3-1") < version("2:1.2.3"));
        assert!(version("2:1.2.3") > version("1.2.3-1"));
    }

    #[test]
    fn test_revision_ordering() {
        assert!(version("1.2-1") < version("1.2-2"));
        assert!(version("1.2.3") < version("1.2.3-1"));
        assert!(version("1.2.3-1") > version("1.2.3"));
    }

    #[test]
    fn test_tilde_sorts_first() {
        assert!(version("1.2~alpha") < version("1.2"));
        assert!(version("1.0~rc1") < version("1.0"));
        assert!(version("1.0~rc1") < version("1.0~rc2"));
        assert!(version("1.4-5+deb10u1~bpo9u1") < version("1.4-5+deb10u1"));
    }

    #[test]
    fn test_debian_suffix_conventions() {
        assert!(version("2.3-3+really2.2") > version("2.3-3"));
        assert!(version("1.0-alpha-1") > version("1.0-1"));
        assert!(version("1.0-1+b1") > version("1.0-1"));
    }

    #[test]
    fn test_letters_against_separators() {
        // upstream "1.0-alpha" tokenizes with a "-" run where the other side ends
        assert!(version("1.0-1") < version("1.0-alpha-1"));
        assert!(version("1.2a") > version("1.2"));
    }

    #[test]
    fn test_comparison_is_symmetric() {
        let pairs = [
            ("1", "1~"),
            ("1.0", "1.0+b1"),
            ("1.2~alpha", "1.2"),
            ("2.3-3+really2.2", "2.3-3"),
            ("1:0.9", "2.0"),
        ];
        for (a, b) in pairs {
            assert_eq!(
                version(a).cmp(&version(b)),
                version(b).cmp(&version(a)).reverse(),
                "cmp({a:?}, {b:?}) must mirror cmp({b:?}, {a:?})"
            );
        }
    }

    #[test]
    fn test_trailing_tilde_precedes_bare_version() {
        assert!(version("1~") < version("1"));
        assert!(version("1.0~") < version("1.0"));
    }

    #[test]
    fn test_digit_runs_longer_than_u64() {
        assert!(
            version("1.18446744073709551615") < version("1.18446744073709551616")
        );
        assert_eq!(
            version("1.00018446744073709551616"),
            version("1.18446744073709551616")
        );
    }

    #[test]
    fn test_epoch_parsing() {
        assert_eq!(version("3:1.0").epoch, 3);
        assert_eq!(version("1.0").epoch, 0);
        // only an all-digit prefix before the first colon is an epoch
        assert_eq!(version("abc:1.0").epoch, 0);
        assert_eq!(version("abc:1.0").upstream, "abc:1.0");
    }

    #[test]
    fn test_revision_splits_on_last_dash() {
        let v = version("1.0-alpha-1");
        assert_eq!(v.upstream, "1.0-alpha");
        assert_eq!(v.revision, "1");
        assert_eq!(version("1.0").revision, "");
    }

    #[test]
    fn test_tokenize_classes() {
        assert_eq!(tokenize("1.2~rc3"), vec!["1", ".", "2", "~", "rc", "3"]);
        assert_eq!(tokenize("12abc"), vec!["12", "abc"]);
        assert_eq!(tokenize("+~~"), vec!["+", "~", "~"]);
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_display_preserves_original_text() {
        assert_eq!(version("1:2.3-4").to_string(), "1:2.3-4");
        assert_eq!(version("1:2.3-4").as_str(), "1:2.3-4");
    }

    #[test]
    fn test_sorting_a_list() {
        let mut versions = vec![
            version("1.2"),
            version("1.2~rc1"),
            version("1:0.1"),
            version("1.2-1"),
            version("1.10"),
        ];
        versions.sort();
        let sorted: Vec<&str> = versions.iter().map(PackageVersion::as_str).collect();
        assert_eq!(sorted, vec!["1.2~rc1", "1.2", "1.2-1", "1.10", "1:0.1"]);
    }
}
