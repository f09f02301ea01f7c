//! Extraction pipeline
//!
//! Binds a suffix classifier to the parse / decompose / format / record
//! steps and exposes the per-URL projections used by the CLI.

use crate::format::{format, needs_domain};
use crate::psl::{decompose, SuffixClassifier};
use crate::query;
use crate::record::{self, ExtractionRecord, RecordError};
use crate::types::DomainParts;
use crate::url::{parse, ParseError, ParsedUrl};

/// What to print for each URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    Keys,
    Values,
    KeyPairs,
    Domains,
    Apexes,
    Paths,
    Format(String),
    Json,
}

/// Stateless extraction engine over a classifier.
///
/// Safe to share across threads; every call is independent.
#[derive(Debug, Clone, Default)]
pub struct Extractor<C> {
    classifier: C,
}

impl<C: SuffixClassifier> Extractor<C> {
    /// Wrap a classifier.
    pub fn new(classifier: C) -> Self {
        Self { classifier }
    }

    /// Parse one input URL, defaulting a missing scheme to `http`.
    pub fn parse(&self, raw: &str) -> Result<ParsedUrl, ParseError> {
        parse(raw)
    }

    /// Domain parts of the URL's host (port ignored).
    pub fn domain_parts(&self, url: &ParsedUrl) -> DomainParts {
        decompose(&url.host, &self.classifier)
    }

    /// Format a template, decomposing the host only when the template needs it.
    pub fn format(&self, url: &ParsedUrl, template: &str) -> String {
        if needs_domain(template) {
            format(url, &self.domain_parts(url), template)
        } else {
            format(url, &DomainParts::default(), template)
        }
    }

    /// Full extraction record for the URL.
    pub fn record(&self, url: &ParsedUrl) -> ExtractionRecord {
        record::build(url, &self.domain_parts(url), query::parameters(url))
    }

    /// The record as compact JSON.
    pub fn json(&self, url: &ParsedUrl) -> Result<String, RecordError> {
        record::extract_json(url, &self.classifier)
    }

    /// Output lines for one URL. Only `Json` can fail.
    pub fn project(&self, url: &ParsedUrl, projection: &Projection) -> Result<Vec<String>, RecordError> {
        let lines = match projection {
            Projection::Keys => query::keys(url),
            Projection::Values => query::values(url),
            Projection::KeyPairs => query::key_pairs(url),
            Projection::Domains => vec![self.format(url, "%d")],
            Projection::Apexes => vec![self.domain_parts(url).apex],
            Projection::Paths => vec![self.format(url, "%p")],
            Projection::Format(template) => vec![self.format(url, template)],
            Projection::Json => vec![self.json(url)?],
        };
        Ok(lines)
    }
}
