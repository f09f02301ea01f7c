//! Public Suffix List (PSL) domain decomposition
//!
//! Splits a hostname into subdomain, registrable root and TLD through an
//! injected [`SuffixClassifier`]. No suffix data is bundled: callers either
//! load a list file into a [`PslClassifier`] or fall back to the
//! [`HeuristicClassifier`].
//!
//! # Examples
//!
//! ```
//! use uf_core::psl::{decompose, HeuristicClassifier};
//!
//! let parts = decompose("sub.example.co.uk:8443", &HeuristicClassifier);
//! assert_eq!(parts.subdomain, "sub");
//! assert_eq!(parts.root, "example");
//! assert_eq!(parts.tld, "co.uk");
//! assert_eq!(parts.apex, "example.co.uk");
//! ```

use std::fs;
use std::net::IpAddr;
use std::path::Path;

use publicsuffix::{List, Psl};

use crate::types::DomainParts;

/// Error type for classifier construction.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("Failed to read suffix list '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid suffix list: {0}")]
    List(String),
}

// =============================================================================
// Classifier Capability
// =============================================================================

/// Maps a hostname (port already removed) to its domain components.
///
/// All lookups are total: anything that cannot be classified yields an
/// empty string.
pub trait SuffixClassifier: Send + Sync {
    /// Labels left of the registrable root.
    fn subdomain_of(&self, host: &str) -> String;
    /// The single label directly left of the public suffix.
    fn registrable_root_of(&self, host: &str) -> String;
    /// The public suffix.
    fn tld_of(&self, host: &str) -> String;

    /// All three components at once. Override when one lookup can serve
    /// every component.
    fn classify(&self, host: &str) -> DomainParts {
        DomainParts::new(
            self.subdomain_of(host),
            self.registrable_root_of(host),
            self.tld_of(host),
        )
    }
}

impl<T: SuffixClassifier + ?Sized> SuffixClassifier for Box<T> {
    fn subdomain_of(&self, host: &str) -> String {
        (**self).subdomain_of(host)
    }

    fn registrable_root_of(&self, host: &str) -> String {
        (**self).registrable_root_of(host)
    }

    fn tld_of(&self, host: &str) -> String {
        (**self).tld_of(host)
    }

    fn classify(&self, host: &str) -> DomainParts {
        (**self).classify(host)
    }
}

impl<T: SuffixClassifier + ?Sized> SuffixClassifier for &T {
    fn subdomain_of(&self, host: &str) -> String {
        (**self).subdomain_of(host)
    }

    fn registrable_root_of(&self, host: &str) -> String {
        (**self).registrable_root_of(host)
    }

    fn tld_of(&self, host: &str) -> String {
        (**self).tld_of(host)
    }

    fn classify(&self, host: &str) -> DomainParts {
        (**self).classify(host)
    }
}

// =============================================================================
// Decomposition
// =============================================================================

/// Decompose a `host[:port]` string into [`DomainParts`].
pub fn decompose<C: SuffixClassifier + ?Sized>(host: &str, classifier: &C) -> DomainParts {
    classifier.classify(strip_port(host))
}

/// Remove a trailing `:<digits>` suffix. Anything else is left untouched.
#[inline]
pub fn strip_port(host: &str) -> &str {
    let digits = host.bytes().rev().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return host;
    }
    host[..host.len() - digits].strip_suffix(':').unwrap_or(host)
}

/// Lowercase and drop a trailing root dot.
fn normalize_host(host: &str) -> String {
    host.trim_end_matches('.').to_ascii_lowercase()
}

/// IP literals never carry domain parts.
#[inline]
fn is_ip_literal(host: &str) -> bool {
    host.starts_with('[') || host.parse::<IpAddr>().is_ok()
}

/// Components of a classified host.
#[derive(Debug, Default, PartialEq, Eq)]
struct Split {
    subdomain: String,
    root: String,
    tld: String,
}

impl Split {
    fn from_labels(labels: &[&str], suffix_labels: usize) -> Self {
        let n = labels.len();
        if suffix_labels == 0 || suffix_labels > n {
            return Self::default();
        }
        let tld = labels[n - suffix_labels..].join(".");
        if suffix_labels == n {
            return Self {
                tld,
                ..Self::default()
            };
        }
        Self {
            subdomain: labels[..n - suffix_labels - 1].join("."),
            root: labels[n - suffix_labels - 1].to_string(),
            tld,
        }
    }

    fn into_parts(self) -> DomainParts {
        DomainParts::new(self.subdomain, self.root, self.tld)
    }
}

// =============================================================================
// PSL-backed Classifier
// =============================================================================

/// Classifier backed by a Public Suffix List.
///
/// Hosts whose suffix only matches the implicit `*` rule are treated as
/// unknown and yield empty parts.
pub struct PslClassifier {
    list: List,
}

impl PslClassifier {
    /// Build from list text in the standard `public_suffix_list.dat` format.
    pub fn from_list_text(text: &str) -> Result<Self, ClassifierError> {
        let list = text
            .parse::<List>()
            .map_err(|e| ClassifierError::List(e.to_string()))?;
        Ok(Self { list })
    }

    /// Load a list file from disk.
    pub fn from_path(path: &Path) -> Result<Self, ClassifierError> {
        let text = fs::read_to_string(path).map_err(|source| ClassifierError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let classifier = Self::from_list_text(&text)?;
        log::debug!("loaded suffix list from {}", path.display());
        Ok(classifier)
    }

    fn split(&self, host: &str) -> Split {
        let host = normalize_host(host);
        if host.is_empty() || is_ip_literal(&host) {
            return Split::default();
        }

        let labels: Vec<&str> = host.split('.').collect();
        if labels.iter().any(|label| label.is_empty()) {
            return Split::default();
        }

        let suffix = match self.list.suffix(host.as_bytes()) {
            Some(suffix) if suffix.is_known() => suffix,
            _ => {
                log::debug!("no known public suffix for {:?}", host);
                return Split::default();
            }
        };
        let suffix_labels = suffix.as_bytes().split(|&b| b == b'.').count();
        Split::from_labels(&labels, suffix_labels)
    }
}

impl SuffixClassifier for PslClassifier {
    fn subdomain_of(&self, host: &str) -> String {
        self.split(host).subdomain
    }

    fn registrable_root_of(&self, host: &str) -> String {
        self.split(host).root
    }

    fn tld_of(&self, host: &str) -> String {
        self.split(host).tld
    }

    fn classify(&self, host: &str) -> DomainParts {
        self.split(host).into_parts()
    }
}

// =============================================================================
// Heuristic Classifier
// =============================================================================

/// Common two-part suffixes recognised without a list.
const COMMON_TWO_PART_TLDS: &[&str] = &[
    "co.uk", "co.jp", "co.nz", "co.za", "co.in", "co.kr",
    "com.au", "com.br", "com.cn", "com.mx", "com.tw", "com.hk",
    "net.au", "net.nz",
    "org.uk", "org.au",
    "gov.uk", "gov.au",
    "ac.uk", "ac.jp",
    "ne.jp", "or.jp",
];

/// List-free classifier: the last label is the TLD unless the last two
/// labels form a common two-part suffix.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicClassifier;

impl HeuristicClassifier {
    fn split(&self, host: &str) -> Split {
        let host = normalize_host(host);
        if is_ip_literal(&host) {
            return Split::default();
        }

        let labels: Vec<&str> = host.split('.').collect();
        let n = labels.len();
        if n < 2 || labels.iter().any(|label| label.is_empty()) {
            return Split::default();
        }

        let last_two = format!("{}.{}", labels[n - 2], labels[n - 1]);
        let suffix_labels = if COMMON_TWO_PART_TLDS.contains(&last_two.as_str()) { 2 } else { 1 };
        Split::from_labels(&labels, suffix_labels)
    }
}

impl SuffixClassifier for HeuristicClassifier {
    fn subdomain_of(&self, host: &str) -> String {
        self.split(host).subdomain
    }

    fn registrable_root_of(&self, host: &str) -> String {
        self.split(host).root
    }

    fn tld_of(&self, host: &str) -> String {
        self.split(host).tld
    }

    fn classify(&self, host: &str) -> DomainParts {
        self.split(host).into_parts()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_LIST: &str = "\
// ===BEGIN ICANN DOMAINS===
com
uk
co.uk
*.ck
!www.ck
// ===END ICANN DOMAINS===
";

    #[test]
    fn test_strip_port() {
        assert_eq!(strip_port("example.com:8080"), "example.com");
        assert_eq!(strip_port("example.com"), "example.com");
        assert_eq!(strip_port("example.com:"), "example.com:");
        assert_eq!(strip_port("[::1]:443"), "[::1]");
        assert_eq!(strip_port("[::1]"), "[::1]");
        assert_eq!(strip_port("host123"), "host123");
    }

    #[test]
    fn test_heuristic_simple() {
        let parts = decompose("sub.example.com", &HeuristicClassifier);
        assert_eq!(parts.subdomain, "sub");
        assert_eq!(parts.root, "example");
        assert_eq!(parts.tld, "com");
        assert_eq!(parts.apex, "example.com");
    }

    #[test]
    fn test_heuristic_two_part() {
        let parts = decompose("a.b.example.co.uk", &HeuristicClassifier);
        assert_eq!(parts.subdomain, "a.b");
        assert_eq!(parts.root, "example");
        assert_eq!(parts.tld, "co.uk");
    }

    #[test]
    fn test_heuristic_unclassifiable() {
        assert!(decompose("localhost", &HeuristicClassifier).is_empty());
        assert!(decompose("127.0.0.1:8080", &HeuristicClassifier).is_empty());
        assert!(decompose("[::1]:8080", &HeuristicClassifier).is_empty());
        assert!(decompose("", &HeuristicClassifier).is_empty());
    }

    #[test]
    fn test_heuristic_case_and_trailing_dot() {
        let parts = decompose("WWW.Example.COM.", &HeuristicClassifier);
        assert_eq!(parts.subdomain, "www");
        assert_eq!(parts.root, "example");
        assert_eq!(parts.tld, "com");
    }

    #[test]
    fn test_psl_classifier() {
        let psl = PslClassifier::from_list_text(TEST_LIST).unwrap();

        let parts = decompose("sub.example.co.uk", &psl);
        assert_eq!(parts.subdomain, "sub");
        assert_eq!(parts.root, "example");
        assert_eq!(parts.tld, "co.uk");
        assert_eq!(parts.apex, "example.co.uk");

        let parts = decompose("example.com:443", &psl);
        assert_eq!(parts.subdomain, "");
        assert_eq!(parts.root, "example");
        assert_eq!(parts.tld, "com");
    }

    #[test]
    fn test_psl_bare_suffix() {
        let psl = PslClassifier::from_list_text(TEST_LIST).unwrap();
        let parts = decompose("co.uk", &psl);
        assert_eq!(parts.tld, "co.uk");
        assert_eq!(parts.root, "");
        assert_eq!(parts.apex, "");
    }

    #[test]
    fn test_psl_unknown_suffix() {
        let psl = PslClassifier::from_list_text(TEST_LIST).unwrap();
        assert!(decompose("example.invalidtld", &psl).is_empty());
        assert!(decompose("10.0.0.1", &psl).is_empty());
    }

    #[test]
    fn test_psl_empty_labels() {
        let psl = PslClassifier::from_list_text(TEST_LIST).unwrap();
        assert!(decompose("a..example.com", &psl).is_empty());
        assert!(decompose(".com", &psl).is_empty());
        assert!(decompose("a..example.com", &HeuristicClassifier).is_empty());
        assert!(decompose(".com", &HeuristicClassifier).is_empty());
    }

    #[test]
    fn test_classify_matches_component_lookups() {
        let psl = PslClassifier::from_list_text(TEST_LIST).unwrap();
        for host in ["a.b.example.co.uk", "example.com", "co.uk", "x.example.invalidtld", "10.0.0.1"] {
            let expected = DomainParts::new(psl.subdomain_of(host), psl.registrable_root_of(host), psl.tld_of(host));
            assert_eq!(psl.classify(host), expected, "{}", host);
        }
    }

    /// Only the three required lookups; relies on the provided `classify`.
    struct FixedClassifier;

    impl SuffixClassifier for FixedClassifier {
        fn subdomain_of(&self, _host: &str) -> String {
            "www".to_string()
        }

        fn registrable_root_of(&self, _host: &str) -> String {
            "example".to_string()
        }

        fn tld_of(&self, _host: &str) -> String {
            "org".to_string()
        }
    }

    #[test]
    fn test_default_classify() {
        let parts = decompose("anything:80", &FixedClassifier);
        assert_eq!(parts.subdomain, "www");
        assert_eq!(parts.apex, "example.org");
    }

    #[test]
    fn test_boxed_classifier() {
        let boxed: Box<dyn SuffixClassifier> = Box::new(HeuristicClassifier);
        assert_eq!(decompose("api.example.org", &boxed).apex, "example.org");
    }

    #[test]
    fn test_missing_list_file() {
        let err = PslClassifier::from_path(Path::new("/nonexistent/public_suffix_list.dat"));
        assert!(matches!(err, Err(ClassifierError::Io { .. })));
    }
}
