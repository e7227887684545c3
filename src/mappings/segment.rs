//! Data types for the in-memory mapping model: segments, frames, lookup
//! bias, and the offset accumulator shared by the stream codec.
//!
//! Coordinates are 1-based in memory and 0-based on the wire; the stream
//! codec applies the adjustment uniformly in both directions.

use serde::{Deserialize, Serialize};

use crate::error::{MapError, MapResult};

/// Tie-break policy for column lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bias {
    /// Return only an exact column match
    Exact,
    /// Return the greatest segment with `column <= target`
    Floor,
    /// Return the least segment with `column >= target`
    Ceiling,
}

/// Source attribution of a segment.
///
/// Wire segments of length 4 or 5 carry all three fields; length-1 segments
/// carry none, so the attribution is grouped into one optional record and
/// the all-or-none rule holds by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceOrigin {
    /// Index into the envelope's `sources` array
    pub source_index: u32,
    /// Line in the original file (1-based)
    pub line: u32,
    /// Column in the original file (1-based)
    pub column: u32,
}

/// One positional mapping record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// Line in the emitted output (1-based)
    pub generated_line: u32,
    /// Column in the emitted output (1-based)
    pub generated_column: u32,
    /// Original-file attribution; absent for length-1 wire segments
    pub origin: Option<SourceOrigin>,
    /// Index into the envelope's `names` array; absent iff no name was associated
    pub name_index: Option<u32>,
}

/// The ordered segments of one generated line; an empty frame is a generated
/// line with no mappings
pub type Frame = Vec<Segment>;

/// Range-check one programmatic field into the u32 model.
fn checked_field(field: &'static str, received: i64, min: i64) -> MapResult<u32> {
    if received < min || received > i64::from(u32::MAX) {
        return Err(MapError::InvalidSegmentField { field, received });
    }
    Ok(received as u32)
}

impl Segment {
    /// Create a positional segment with no source attribution.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvalidSegmentField`] when a coordinate is below 1
    /// or outside the u32 range.
    pub fn new(generated_line: i64, generated_column: i64) -> MapResult<Self> {
        Ok(Self {
            generated_line: checked_field("generatedLine", generated_line, 1)?,
            generated_column: checked_field("generatedColumn", generated_column, 1)?,
            origin: None,
            name_index: None,
        })
    }

    /// Attach source attribution.
    pub fn with_origin(mut self, source_index: i64, line: i64, column: i64) -> MapResult<Self> {
        self.origin = Some(SourceOrigin {
            source_index: checked_field("sourceIndex", source_index, 0)?,
            line: checked_field("line", line, 1)?,
            column: checked_field("column", column, 1)?,
        });
        Ok(self)
    }

    /// Attach a name index. Requires source attribution: a named segment has
    /// wire length 5, which subsumes length 4.
    pub fn with_name(mut self, name_index: i64) -> MapResult<Self> {
        if self.origin.is_none() {
            return Err(MapError::InvalidSegmentField {
                field: "nameIndex",
                received: name_index,
            });
        }
        self.name_index = Some(checked_field("nameIndex", name_index, 0)?);
        Ok(self)
    }
}

/// Running accumulator of absolute 0-based coordinates used to interpret
/// per-segment deltas during streaming encode and decode.
///
/// `generated_column` resets at every line boundary; `generated_line` is
/// advanced by the line loop, never by a delta; the remaining fields persist
/// across lines and segments. Base offsets seed `name_index` and
/// `source_index` on the concatenation path.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct SegmentOffset {
    pub line: i64,
    pub column: i64,
    pub name_index: i64,
    pub source_index: i64,
    pub generated_line: i64,
    pub generated_column: i64,
}

impl SegmentOffset {
    /// Accumulator seeded for appending after existing `names`/`sources`.
    pub fn with_bases(names_base: u32, sources_base: u32) -> Self {
        Self {
            name_index: i64::from(names_base),
            source_index: i64::from(sources_base),
            ..Self::default()
        }
    }
}
