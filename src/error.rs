//! # Error Taxonomy
//!
//! Error types shared by every component of the crate. Each variant carries a
//! machine-readable kind plus the context a caller needs to point at the
//! offending input: byte offsets for VLQ failures, 0-based frame and segment
//! indices for mapping-stream failures.
//!
//! Query misses are not errors: lookups that find nothing return `None`.
//! Errors are reserved for malformed input and misuse of the API.

use thiserror::Error;

/// Errors produced by the codec, the mapping engine, and the service
#[derive(Error, Debug)]
pub enum MapError {
    #[error("source map envelope is missing required key '{key}'")]
    MissingRequiredKey { key: String },

    #[error("invalid VLQ character '{ch}' at offset {offset}")]
    InvalidVlqChar { ch: char, offset: usize },

    #[error("mappings contain bytes outside the base64 VLQ character set")]
    InvalidMappingsCharset,

    #[error("segment {segment} in frame {frame} decodes to {len} fields, expected 1, 4, or 5")]
    InvalidSegmentLen {
        frame: usize,
        segment: usize,
        len: usize,
    },

    #[error("'{field}' drops below zero at frame {frame}, segment {segment}")]
    NegativeCoordinate {
        field: &'static str,
        frame: usize,
        segment: usize,
    },

    #[error("invalid value {received} for segment field '{field}'")]
    InvalidSegmentField { field: &'static str, received: i64 },

    #[error("expected a JSON array for '{context}'")]
    NotAnArray { context: String },

    #[error("concat requires at least one source map")]
    EmptyConcat,

    #[error("no source matches '{query}'")]
    SourceNotFound { query: String },

    #[error("unsupported source map version: {version}")]
    UnsupportedVersion { version: u64 },

    #[error("invalid source map JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for source map operations
pub type MapResult<T> = Result<T, MapError>;
