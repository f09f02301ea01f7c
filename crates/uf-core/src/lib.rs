//! unfurl core library
//!
//! URL decomposition and templated extraction. Everything here works on
//! strings and in-memory values only: no DNS, no network, no bundled suffix
//! list.
//!
//! # Pipeline
//!
//! A raw string is parsed into a [`ParsedUrl`] (scheme defaults to `http`),
//! its host is split into [`DomainParts`] by an injected
//! [`SuffixClassifier`], and the result is either projected through the
//! `%`-directive format language or assembled into an [`ExtractionRecord`].
//!
//! # Modules
//!
//! - `url`: URL normalizer and percent-encoding rules
//! - `psl`: Domain decomposition and suffix classifiers
//! - `format`: Directive format engine
//! - `query`: Query key/value extraction
//! - `record`: Serializable extraction record
//! - `extract`: Classifier-bound pipeline and CLI projections
//! - `types`: Shared value types

pub mod extract;
pub mod format;
pub mod psl;
pub mod query;
pub mod record;
pub mod types;
pub mod url;

// Re-export commonly used types
pub use extract::{Extractor, Projection};
pub use psl::{decompose, ClassifierError, HeuristicClassifier, PslClassifier, SuffixClassifier};
pub use record::{extract_json, ExtractionRecord, RecordError};
pub use types::{DomainParts, KeyValue};
pub use url::{parse, ParseError, ParsedUrl, Userinfo};
