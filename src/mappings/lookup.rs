//! Column search with bias over decoded frames.
//!
//! The generated axis is the indexed one: the map is already partitioned by
//! generated line, so a lookup is a binary search within a single frame. The
//! original axis carries no index; it is a linear scan that keeps the best
//! candidate.

use super::segment::{Bias, Frame, Segment};

/// Binary search one frame by generated column.
///
/// An exact hit is returned regardless of bias. On a miss the candidate
/// tracked while narrowing the range is returned for `Floor`/`Ceiling`, and
/// `Exact` yields `None`.
pub(super) fn find_in_frame(frame: &[Segment], column: u32, bias: Bias) -> Option<&Segment> {
    let mut lo = 0usize;
    let mut hi = frame.len();
    let mut candidate: Option<&Segment> = None;

    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        let segment = &frame[mid];

        if segment.generated_column == column {
            return Some(segment);
        }
        if segment.generated_column < column {
            if bias == Bias::Floor {
                candidate = Some(segment);
            }
            lo = mid + 1;
        } else {
            if bias == Bias::Ceiling {
                candidate = Some(segment);
            }
            hi = mid;
        }
    }

    candidate
}

/// Scan every frame for the segment closest to an original position.
///
/// Only segments attributed to `source_index` on exactly `line` compete;
/// bias tie-breaking runs along the original column axis. When duplicates
/// qualify, `Floor` keeps the latest in scan order and `Ceiling` the
/// earliest, matching the candidate updates of the binary search.
pub(super) fn find_by_original(
    frames: &[Frame],
    source_index: u32,
    line: u32,
    column: u32,
    bias: Bias,
) -> Option<&Segment> {
    let mut candidate: Option<(&Segment, u32)> = None;

    for frame in frames {
        for segment in frame {
            let Some(origin) = segment.origin else {
                continue;
            };
            if origin.source_index != source_index || origin.line != line {
                continue;
            }
            if origin.column == column {
                return Some(segment);
            }
            match bias {
                Bias::Exact => {}
                Bias::Floor => {
                    if origin.column < column
                        && candidate.is_none_or(|(_, best)| origin.column >= best)
                    {
                        candidate = Some((segment, origin.column));
                    }
                }
                Bias::Ceiling => {
                    if origin.column > column
                        && candidate.is_none_or(|(_, best)| origin.column < best)
                    {
                        candidate = Some((segment, origin.column));
                    }
                }
            }
        }
    }

    candidate.map(|(segment, _)| segment)
}
