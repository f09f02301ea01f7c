//! Extraction record builder
//!
//! One flat, serializable summary of everything extracted from a URL. Field
//! names and order are part of the output contract.

use serde::{Deserialize, Serialize};

use crate::format::format;
use crate::psl::{decompose, SuffixClassifier};
use crate::query;
use crate::types::{DomainParts, KeyValue};
use crate::url::ParsedUrl;

/// Error type for record serialization.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Canonical extraction output for a single URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    pub scheme: String,
    pub opaque: String,
    pub user: String,
    pub host: String,
    pub path: String,
    pub raw_path: String,
    pub raw_query: String,
    pub fragment: String,

    pub parameters: Vec<KeyValue>,
    pub url: String,
    pub domain: String,
    pub subdomain: String,
    pub root: String,
    pub tld: String,
    pub apex: String,
    pub port: String,
    pub extension: String,
}

/// Assemble a record from a parsed URL, its domain parts and query pairs.
///
/// Scalar convenience fields go through the format engine, so they agree
/// with what the matching directives print.
pub fn build(url: &ParsedUrl, parts: &DomainParts, parameters: Vec<KeyValue>) -> ExtractionRecord {
    ExtractionRecord {
        scheme: url.scheme.clone(),
        opaque: url.opaque.clone(),
        user: url.user.as_ref().map(ToString::to_string).unwrap_or_default(),
        host: url.host.clone(),
        path: url.path.clone(),
        raw_path: url.raw_path.clone(),
        raw_query: url.raw_query.clone(),
        fragment: url.fragment.clone(),
        parameters,
        url: url.to_string(),
        domain: format(url, parts, "%d"),
        subdomain: format(url, parts, "%S"),
        root: format(url, parts, "%r"),
        tld: format(url, parts, "%t"),
        apex: parts.apex.clone(),
        port: format(url, parts, "%P"),
        extension: format(url, parts, "%e"),
    }
}

/// Serialize a record as compact JSON.
pub fn to_json(record: &ExtractionRecord) -> Result<String, RecordError> {
    Ok(serde_json::to_string(record)?)
}

/// Decompose, build and serialize in one step.
pub fn extract_json<C: SuffixClassifier + ?Sized>(
    url: &ParsedUrl,
    classifier: &C,
) -> Result<String, RecordError> {
    let parts = decompose(&url.host, classifier);
    to_json(&build(url, &parts, query::parameters(url)))
}
