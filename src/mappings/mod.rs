//! # Mapping Engine
//!
//! The stream codec and lookup core: decodes the delta-encoded `mappings`
//! blob into line-indexed frames, answers bidirectional position queries
//! with bias, and re-encodes frames back to the wire form.
//!
//! ## Components
//!
//! - **Segment model**: segments, frames, bias, and the offset accumulator
//! - **Decoder**: blob → frames with per-boundary reset rules and base offsets
//! - **Encoder**: frames → blob, the decoder's exact inverse
//! - **Lookup**: biased binary search (generated axis) and frame scan
//!   (original axis)
//!
//! ## Usage
//!
//! ```rust
//! use srcmap::{Bias, MappingEngine};
//!
//! let engine = MappingEngine::from_string("AAAA", 0, 0).unwrap();
//! let segment = engine.get_by_generated(1, 1, Bias::Exact).unwrap();
//! assert_eq!(segment.origin.unwrap().line, 1);
//! assert_eq!(engine.encode(), "AAAA");
//! ```

use crate::error::{MapError, MapResult};

mod decoder;
mod encoder;
mod lookup;
mod segment;


pub use segment::{Bias, Frame, Segment, SourceOrigin};

/// Line-indexed mapping store with bidirectional lookup.
///
/// Frames are dense: frame `i` holds the segments of generated line `i + 1`,
/// and a generated line without mappings is an empty frame, so indexing by
/// line is O(1).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingEngine {
    frames: Vec<Frame>,
}

impl MappingEngine {
    /// Decode a mappings blob into a fresh engine.
    ///
    /// `names_base` and `sources_base` seed the offset accumulator, which is
    /// what makes a blob lifted out of another map resolve to the correct
    /// absolute indices. Pass 0 for a standalone map.
    ///
    /// # Errors
    ///
    /// [`MapError::InvalidVlqChar`], [`MapError::InvalidSegmentLen`], or
    /// [`MapError::NegativeCoordinate`] as defined by the stream format; on
    /// error no engine is produced (the decode is atomic).
    pub fn from_string(blob: &str, names_base: u32, sources_base: u32) -> MapResult<Self> {
        let frames = decoder::decode_blob(blob, names_base, sources_base, 0)?;
        Ok(Self { frames })
    }

    /// Build an engine from already-materialized frames.
    ///
    /// Programmatic construction is validated: every segment's
    /// `generated_line` must equal its frame position + 1, a name index
    /// requires source attribution, and the `names_base`/`sources_base`
    /// shifts must not overflow the index space.
    pub fn from_frames(frames: Vec<Frame>, names_base: u32, sources_base: u32) -> MapResult<Self> {
        let mut shifted = frames;
        for (frame_index, frame) in shifted.iter_mut().enumerate() {
            for segment in frame.iter_mut() {
                if segment.generated_line as usize != frame_index + 1 {
                    return Err(MapError::InvalidSegmentField {
                        field: "generatedLine",
                        received: i64::from(segment.generated_line),
                    });
                }
                if segment.name_index.is_some() && segment.origin.is_none() {
                    return Err(MapError::InvalidSegmentField {
                        field: "nameIndex",
                        received: segment.name_index.map_or(-1, i64::from),
                    });
                }
                if let Some(origin) = segment.origin.as_mut() {
                    origin.source_index = origin
                        .source_index
                        .checked_add(sources_base)
                        .ok_or(MapError::InvalidSegmentField {
                            field: "sourceIndex",
                            received: i64::from(origin.source_index) + i64::from(sources_base),
                        })?;
                }
                if let Some(name_index) = segment.name_index {
                    segment.name_index = Some(name_index.checked_add(names_base).ok_or(
                        MapError::InvalidSegmentField {
                            field: "nameIndex",
                            received: i64::from(name_index) + i64::from(names_base),
                        },
                    )?);
                }
            }
        }
        Ok(Self { frames: shifted })
    }

    /// Wrap frames the crate itself decoded; no re-validation.
    pub(crate) fn from_decoded(frames: Vec<Frame>) -> Self {
        Self { frames }
    }

    /// Decode `blob` behind the existing frames, with the engine's current
    /// frame count as the generated-line base. The decode is staged: on
    /// error the engine is left untouched.
    pub(crate) fn append_string(
        &mut self,
        blob: &str,
        names_base: u32,
        sources_base: u32,
    ) -> MapResult<()> {
        let appended =
            decoder::decode_blob(blob, names_base, sources_base, self.frames.len() as u32)?;
        self.frames.extend(appended);
        Ok(())
    }

    /// Re-encode the frames to the wire form.
    pub fn encode(&self) -> String {
        encoder::encode_frames(&self.frames)
    }

    /// Look up a segment by generated position.
    ///
    /// Returns `None` for a line outside the map, an empty frame, or a miss
    /// under the given bias.
    pub fn get_by_generated(&self, line: u32, column: u32, bias: Bias) -> Option<&Segment> {
        if line < 1 {
            return None;
        }
        let frame = self.frames.get(line as usize - 1)?;
        lookup::find_in_frame(frame, column, bias)
    }

    /// Look up a segment by original position within one source.
    pub fn get_by_original(
        &self,
        source_index: u32,
        line: u32,
        column: u32,
        bias: Bias,
    ) -> Option<&Segment> {
        lookup::find_by_original(&self.frames, source_index, line, column, bias)
    }

    /// The dense frame store, indexed by `generated_line - 1`.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Number of generated lines the map covers.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
