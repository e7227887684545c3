//! # srcmap
//!
//! A Source Map v3 codec and lookup engine. Ingests the standard source-map
//! JSON artifact, decodes the compact `mappings` field into an indexable
//! in-memory structure, answers bidirectional position queries, merges
//! independent maps into one combined map, and re-encodes back to the v3
//! wire format.
//!
//! ## Components
//!
//! - [`vlq`]: the base64 VLQ integer codec
//! - [`mappings`]: segment model, delta stream codec, and biased lookup
//! - [`service`]: envelope arrays, position resolution, snippets, concat,
//!   serialization
//! - [`error`]: the shared error taxonomy
//!
//! ## Usage
//!
//! ```rust
//! use srcmap::{Bias, SourceMapService};
//!
//! let json = br#"{
//!     "version": 3,
//!     "file": "out.js",
//!     "sources": ["input.ts"],
//!     "names": [],
//!     "mappings": "AAAA;AACA"
//! }"#;
//!
//! let service = SourceMapService::from_json(json, None).unwrap();
//! let position = service.position_by_generated(2, 1, Bias::Exact).unwrap();
//! assert_eq!(position.source, "input.ts");
//! assert_eq!(position.original_line, 2);
//! ```
//!
//! The library performs no I/O, spawns no background work, and keeps no
//! global state beyond the fixed VLQ alphabet. A service instance is not
//! safe for concurrent mutation; wrap it in a lock if concatenation must
//! race with queries.

pub mod error;
pub mod mappings;
pub mod service;
pub mod vlq;

pub use error::{MapError, MapResult};
pub use mappings::{Bias, Frame, MappingEngine, Segment, SourceOrigin};
pub use service::{
    Position, PositionWithCode, PositionWithContent, SnippetConfig, SourceMapBuilder,
    SourceMapEnvelope, SourceMapService, SourceQuery,
};
