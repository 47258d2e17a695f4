// Domain rules - Segment planning policy

use std::fmt;
use std::path::Path;

use rand::Rng;

use crate::domain::model::*;
use crate::utils::path::SegmentNamer;


/// Footage that must remain after the start offset for a file to be usable
const MIN_USABLE_SECONDS: f64 = 1.0;

/// Why a source contributed no segments
#[derive(Debug, Clone, PartialEq)]
pub enum PlanSkip {
    /// Source ends before (or barely after) the start offset
    TooShort { duration: f64, offset: f64 },
    /// Randomized mode needs room for at least one maximal segment
    NoRoom { available: f64, segment_max: f64 },
}

impl fmt::Display for PlanSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanSkip::TooShort { duration, offset } => write!(
                f,
                "too short ({:.1}s, start offset {:.1}s)",
                duration, offset
            ),
            PlanSkip::NoRoom {
                available,
                segment_max,
            } => write!(
                f,
                "not enough room for a {:.1}s segment ({:.1}s available)",
                segment_max, available
            ),
        }
    }
}

/// A time interval chosen inside one source, before naming
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannedSpan {
    pub start: f64,
    pub duration: f64,
}

/// Turns a job configuration and a probed duration into segment spans.
///
/// Sequential mode packs `n` contiguous spans of the mean segment length
/// after the start offset. Randomized mode draws each span independently,
/// so spans of the same file may overlap.
pub struct SegmentPlanner<'a> {
    config: &'a JobConfig,
}

impl<'a> SegmentPlanner<'a> {
    pub fn new(config: &'a JobConfig) -> Self {
        Self { config }
    }

    /// Plan the spans for one source of `duration` seconds
    pub fn plan_spans<R: Rng + ?Sized>(
        &self,
        duration: f64,
        rng: &mut R,
    ) -> Result<Vec<PlannedSpan>, PlanSkip> {
        let offset = self.config.min_start_offset_seconds();
        if duration <= offset + MIN_USABLE_SECONDS {
            return Err(PlanSkip::TooShort { duration, offset });
        }

        let count = rng.gen_range(self.config.count_min..=self.config.count_max);

        if self.config.random_time {
            self.randomized(duration, offset, count, rng)
        } else {
            Ok(self.sequential(duration, offset, count))
        }
    }

    /// Plan and name the segment requests for one source
    pub fn plan_file<R: Rng + ?Sized>(
        &self,
        source: &Path,
        duration: f64,
        rng: &mut R,
        namer: &mut SegmentNamer,
    ) -> Result<Vec<SegmentRequest>, PlanSkip> {
        let spans = self.plan_spans(duration, rng)?;
        Ok(spans
            .into_iter()
            .enumerate()
            .map(|(index, span)| SegmentRequest {
                source_path: source.to_path_buf(),
                start_seconds: span.start,
                duration_seconds: span.duration,
                output_path: namer.next_path(source, index),
            })
            .collect())
    }

    fn sequential(&self, duration: f64, offset: f64, count: u32) -> Vec<PlannedSpan> {
        let seg_len =
            (f64::from(self.config.segment_min) + f64::from(self.config.segment_max)) / 2.0;
        let mut spans = Vec::new();
        let mut cursor = offset;

        for _ in 0..count {
            if cursor + seg_len > duration {
                break;
            }
            spans.push(PlannedSpan {
                start: cursor,
                duration: seg_len,
            });
            cursor += seg_len;
        }

        spans
    }

    fn randomized<R: Rng + ?Sized>(
        &self,
        duration: f64,
        offset: f64,
        count: u32,
        rng: &mut R,
    ) -> Result<Vec<PlannedSpan>, PlanSkip> {
        let segment_min = f64::from(self.config.segment_min);
        let segment_max = f64::from(self.config.segment_max);
        let available = duration - offset;
        if available < segment_max {
            return Err(PlanSkip::NoRoom {
                available,
                segment_max,
            });
        }

        let mut spans = Vec::new();
        for _ in 0..count {
            let seg_len = rng.gen_range(segment_min..=segment_max);
            if available < seg_len {
                break;
            }
            let start = rng.gen_range(offset..=duration - seg_len);
            spans.push(PlannedSpan {
                start,
                duration: seg_len,
            });
        }

        Ok(spans)
    }
}
