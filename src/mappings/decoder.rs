//! Delta decode of the `mappings` blob into line-indexed frames.
//!
//! Lines are separated by `;`, segments within a line by `,`. Every VLQ
//! field is a signed delta against the running [`SegmentOffset`]; the
//! boundary reset rules live here and nowhere else.

use crate::error::{MapError, MapResult};
use crate::vlq;

use super::segment::{Frame, Segment, SegmentOffset, SourceOrigin};

/// Largest 0-based coordinate the in-memory model can hold once the 1-based
/// adjustment is applied.
const FIELD_MAX: i64 = (u32::MAX - 1) as i64;

/// Check one accumulated coordinate after a delta was applied.
fn checked_coordinate(
    field: &'static str,
    value: i64,
    frame: usize,
    segment: usize,
) -> MapResult<i64> {
    if value < 0 {
        return Err(MapError::NegativeCoordinate {
            field,
            frame,
            segment,
        });
    }
    if value > FIELD_MAX {
        return Err(MapError::InvalidSegmentField {
            field,
            received: value,
        });
    }
    Ok(value)
}

/// Decode a mappings blob into frames.
///
/// `names_base` and `sources_base` seed the offset accumulator so a blob
/// appended behind an existing map resolves to the correct absolute indices;
/// `lines_base` shifts the generated line each new frame is assigned to.
/// Frame `i` of the blob becomes generated line `lines_base + i + 1`
/// (1-based).
///
/// The decode is atomic: any error leaves no partial output behind.
pub(super) fn decode_blob(
    blob: &str,
    names_base: u32,
    sources_base: u32,
    lines_base: u32,
) -> MapResult<Vec<Frame>> {
    let mut frames: Vec<Frame> = Vec::new();
    let mut offset = SegmentOffset::with_bases(names_base, sources_base);
    let mut segment_total = 0usize;

    // Running byte offset of the current line within the blob, so VLQ errors
    // point at the blob rather than an isolated segment string.
    let mut line_start = 0usize;

    for (frame_index, line) in blob.split(';').enumerate() {
        offset.generated_line = i64::from(lines_base) + frame_index as i64 + 1;

        if line.is_empty() {
            frames.push(Vec::new());
            line_start += 1;
            continue;
        }

        offset.generated_column = 0;
        let mut frame: Frame = Vec::new();
        let mut segment_start = line_start;

        for (segment_index, raw) in line.split(',').enumerate() {
            if raw.is_empty() {
                segment_start += 1;
                continue;
            }

            let deltas = vlq::decode_with_base_offset(raw, segment_start)?;
            if !matches!(deltas.len(), 1 | 4 | 5) {
                return Err(MapError::InvalidSegmentLen {
                    frame: frame_index,
                    segment: segment_index,
                    len: deltas.len(),
                });
            }

            offset.generated_column = checked_coordinate(
                "generatedColumn",
                offset.generated_column + deltas[0],
                frame_index,
                segment_index,
            )?;

            let origin = if deltas.len() >= 4 {
                offset.source_index = checked_coordinate(
                    "sourceIndex",
                    offset.source_index + deltas[1],
                    frame_index,
                    segment_index,
                )?;
                offset.line = checked_coordinate(
                    "line",
                    offset.line + deltas[2],
                    frame_index,
                    segment_index,
                )?;
                offset.column = checked_coordinate(
                    "column",
                    offset.column + deltas[3],
                    frame_index,
                    segment_index,
                )?;
                Some(SourceOrigin {
                    source_index: offset.source_index as u32,
                    line: (offset.line + 1) as u32,
                    column: (offset.column + 1) as u32,
                })
            } else {
                None
            };

            let name_index = if deltas.len() == 5 {
                offset.name_index = checked_coordinate(
                    "nameIndex",
                    offset.name_index + deltas[4],
                    frame_index,
                    segment_index,
                )?;
                Some(offset.name_index as u32)
            } else {
                None
            };

            frame.push(Segment {
                generated_line: offset.generated_line as u32,
                generated_column: (offset.generated_column + 1) as u32,
                origin,
                name_index,
            });
            segment_total += 1;
            segment_start += raw.len() + 1;
        }

        frames.push(frame);
        line_start += line.len() + 1;
    }

    tracing::debug!(
        frames = frames.len(),
        segments = segment_total,
        "decoded mappings blob"
    );

    Ok(frames)
}
