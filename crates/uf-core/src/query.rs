//! Query string extraction
//!
//! Values sharing a key are grouped, so the flattened views follow key
//! grouping rather than the order of the original query string. The order
//! across keys is unspecified; compare results as sets.

use std::collections::BTreeMap;

use crate::types::KeyValue;
use crate::url::{query_unescape, ParsedUrl};

/// Decoded query parameters, key -> values in order of appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryValues {
    entries: BTreeMap<String, Vec<String>>,
}

impl QueryValues {
    /// Decode a raw query string (without the `?`).
    ///
    /// Pairs containing `;`, empty pairs and pairs with invalid escapes are
    /// skipped.
    pub fn parse(raw_query: &str) -> Self {
        let mut entries: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for pair in raw_query.split('&') {
            if pair.is_empty() {
                continue;
            }
            if pair.contains(';') {
                log::debug!("skipping query pair with semicolon: {:?}", pair);
                continue;
            }

            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let (Ok(key), Ok(value)) = (query_unescape(key), query_unescape(value)) else {
                log::debug!("skipping undecodable query pair: {:?}", pair);
                continue;
            };
            entries.entry(key).or_default().push(value);
        }

        Self { entries }
    }

    /// Values for `key` in order of appearance.
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Iterate `(key, values)`. Cross-key order is unspecified.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no pair survived decoding.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ParsedUrl {
    /// Decoded query parameters of this URL.
    pub fn query(&self) -> QueryValues {
        QueryValues::parse(&self.raw_query)
    }
}

// =============================================================================
// Flattened Views
// =============================================================================

/// Every key with at least one value, once per key.
pub fn keys(url: &ParsedUrl) -> Vec<String> {
    url.query()
        .iter()
        .filter(|(_, values)| !values.is_empty())
        .map(|(key, _)| key.to_string())
        .collect()
}

/// Every value across every key.
pub fn values(url: &ParsedUrl) -> Vec<String> {
    url.query()
        .iter()
        .flat_map(|(_, values)| values.iter().cloned())
        .collect()
}

/// `key=value` for every occurrence.
pub fn key_pairs(url: &ParsedUrl) -> Vec<String> {
    parameters(url)
        .into_iter()
        .map(|kv| format!("{}={}", kv.key, kv.value))
        .collect()
}

/// Every occurrence as a [`KeyValue`].
pub fn parameters(url: &ParsedUrl) -> Vec<KeyValue> {
    url.query()
        .iter()
        .flat_map(|(key, values)| values.iter().map(move |value| KeyValue::new(key, value.as_str())))
        .collect()
}
