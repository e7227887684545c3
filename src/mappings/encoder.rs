//! Delta encode of line-indexed frames back to the `mappings` wire form.
//!
//! The inverse of the decoder: 1-based in-memory coordinates are reduced to
//! 0-based absolutes, differenced against the running [`SegmentOffset`], and
//! serialized as base64 VLQ. An empty frame contributes no segment text, so
//! a run of empty frames collapses to consecutive `;` separators and an
//! empty final frame leaves a trailing `;`.

use crate::vlq;

use super::segment::{Frame, SegmentOffset};

/// Encode frames into a mappings blob.
pub(super) fn encode_frames(frames: &[Frame]) -> String {
    let mut offset = SegmentOffset::default();
    let mut out = String::new();

    for (frame_index, frame) in frames.iter().enumerate() {
        if frame_index > 0 {
            out.push(';');
        }
        offset.generated_column = 0;

        for (segment_index, segment) in frame.iter().enumerate() {
            if segment_index > 0 {
                out.push(',');
            }

            let generated_column = i64::from(segment.generated_column) - 1;
            vlq::encode_into(generated_column - offset.generated_column, &mut out);
            offset.generated_column = generated_column;

            if let Some(origin) = segment.origin {
                let source_index = i64::from(origin.source_index);
                vlq::encode_into(source_index - offset.source_index, &mut out);
                offset.source_index = source_index;

                let line = i64::from(origin.line) - 1;
                vlq::encode_into(line - offset.line, &mut out);
                offset.line = line;

                let column = i64::from(origin.column) - 1;
                vlq::encode_into(column - offset.column, &mut out);
                offset.column = column;

                if let Some(name_index) = segment.name_index {
                    let name_index = i64::from(name_index);
                    vlq::encode_into(name_index - offset.name_index, &mut out);
                    offset.name_index = name_index;
                }
            }
        }
    }

    out
}
