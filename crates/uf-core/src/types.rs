//! Shared value types
//!
//! Plain values passed between the decomposer, the format engine and the
//! record builder.

use serde::{Deserialize, Serialize};

// =============================================================================
// Domain Parts
// =============================================================================

/// A hostname split around its public suffix.
///
/// Every field is empty when it cannot be determined (IP literals,
/// single-label hosts, unknown suffixes).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainParts {
    pub subdomain: String,
    pub root: String,
    pub tld: String,
    /// `root.tld`, only when both are known
    pub apex: String,
}

impl DomainParts {
    /// Build parts from classifier output, deriving the apex.
    pub fn new(subdomain: String, root: String, tld: String) -> Self {
        let apex = if root.is_empty() || tld.is_empty() {
            String::new()
        } else {
            format!("{}.{}", root, tld)
        };
        Self {
            subdomain,
            root,
            tld,
            apex,
        }
    }

    /// True when the classifier recognised nothing at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.subdomain.is_empty() && self.root.is_empty() && self.tld.is_empty()
    }
}

// =============================================================================
// Query Parameters
// =============================================================================

/// One decoded query parameter occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}
