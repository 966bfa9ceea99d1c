use std::collections::HashMap;

use crate::foundation::core::{Fps, FrameIndex, FrameRange};
use crate::foundation::error::{ShortsError, ShortsResult};

use super::{FrameRun, SegmentWindow, Timeline, TimingPolicy, VisualState};

impl Timeline {
    /// Resolve the frame sequence for `segment_count` segments narrated for `narration_secs`.
    ///
    /// Uniform timing covers exactly `round(narration_secs * fps)` frames: every segment gets
    /// `floor(narration_secs / segment_count * fps)` frames and the last one also takes the
    /// remainder. Explicit timing lasts `max(narration_secs, max end)` and frame `k` shows every
    /// segment whose window contains `k / fps`.
    #[tracing::instrument(skip(policy), fields(policy = policy.name()))]
    pub fn schedule(
        policy: &TimingPolicy,
        segment_count: usize,
        narration_secs: f64,
        fps: Fps,
    ) -> ShortsResult<Self> {
        if segment_count == 0 {
            return Err(ShortsError::validation("at least one segment is required"));
        }
        if !narration_secs.is_finite() || narration_secs <= 0.0 {
            return Err(ShortsError::validation(format!(
                "narration duration must be finite and > 0, got {narration_secs}"
            )));
        }

        let timeline = match policy {
            TimingPolicy::Uniform => uniform(segment_count, narration_secs, fps)?,
            TimingPolicy::Explicit(windows) => {
                policy.validate(segment_count)?;
                explicit(windows, narration_secs, fps)
            }
        };

        if timeline.total_frames == 0 {
            return Err(ShortsError::render(format!(
                "{:.3}s at {} fps yields no frames",
                timeline.duration_secs,
                fps.as_f64()
            )));
        }
        tracing::debug!(
            frames = timeline.total_frames,
            states = timeline.states.len(),
            runs = timeline.runs.len(),
            "timeline scheduled"
        );
        Ok(timeline)
    }
}

impl TimingPolicy {
    /// Check the policy against the number of segments it schedules.
    pub fn validate(&self, segment_count: usize) -> ShortsResult<()> {
        let Self::Explicit(windows) = self else {
            return Ok(());
        };
        if windows.len() != segment_count {
            return Err(ShortsError::validation(format!(
                "expected {segment_count} timing windows, got {}",
                windows.len()
            )));
        }
        for (i, w) in windows.iter().enumerate() {
            if !w.start.is_finite() || w.start < 0.0 {
                return Err(ShortsError::validation(format!(
                    "segment {i}: start must be finite and >= 0"
                )));
            }
            if !w.duration.is_finite() || w.duration <= 0.0 {
                return Err(ShortsError::validation(format!(
                    "segment {i}: duration must be finite and > 0"
                )));
            }
        }
        Ok(())
    }

    /// Reject explicit windows that end after `max_secs`.
    pub fn validate_length(&self, max_secs: f64) -> ShortsResult<()> {
        let Self::Explicit(windows) = self else {
            return Ok(());
        };
        let max_end = windows.iter().map(SegmentWindow::end).fold(0.0, f64::max);
        if max_end > max_secs {
            return Err(ShortsError::validation(format!(
                "segments end at {max_end:.3}s, longer than the {max_secs}s limit"
            )));
        }
        Ok(())
    }
}

/// Every visual state an explicit schedule can show, independent of narration length.
///
/// The set is a superset of [`Timeline::states`] for any narration duration, so it can be
/// composed before synthesis finishes.
pub fn explicit_states(windows: &[SegmentWindow], fps: Fps) -> Vec<VisualState> {
    let max_end = windows.iter().map(SegmentWindow::end).fold(0.0, f64::max);
    let last = fps.secs_to_frames_floor(max_end);

    let mut seen = vec![VisualState::empty()];
    for k in 0..=last {
        let state = active_at(windows, fps.frame_time_secs(FrameIndex(k)));
        if !seen.contains(&state) {
            seen.push(state);
        }
    }
    seen
}

fn uniform(segment_count: usize, narration_secs: f64, fps: Fps) -> ShortsResult<Timeline> {
    let total = fps.secs_to_frames_round(narration_secs);
    let per = fps.secs_to_frames_floor(narration_secs / segment_count as f64);
    if per == 0 {
        return Err(ShortsError::render(format!(
            "{narration_secs:.3}s of narration is too short to show {segment_count} segments at {} fps",
            fps.as_f64()
        )));
    }

    let mut builder = RunBuilder::default();
    let mut cursor = 0u64;
    for i in 0..segment_count {
        let end = if i + 1 == segment_count {
            total
        } else {
            (cursor + per).min(total)
        };
        builder.push(cursor, end, VisualState::single(i));
        cursor = end;
    }

    Ok(builder.finish(fps, narration_secs, total))
}

fn explicit(windows: &[SegmentWindow], narration_secs: f64, fps: Fps) -> Timeline {
    let max_end = windows.iter().map(SegmentWindow::end).fold(0.0, f64::max);
    let duration = narration_secs.max(max_end);
    let total = fps.secs_to_frames_round(duration);

    let mut builder = RunBuilder::default();
    for k in 0..total {
        let state = active_at(windows, fps.frame_time_secs(FrameIndex(k)));
        builder.push(k, k + 1, state);
    }

    builder.finish(fps, duration, total)
}

fn active_at(windows: &[SegmentWindow], t: f64) -> VisualState {
    VisualState::new(
        windows
            .iter()
            .enumerate()
            .filter(|(_, w)| w.contains(t))
            .map(|(i, _)| i)
            .collect(),
    )
}

/// Accumulates runs, merging adjacent frames with equal state.
#[derive(Default)]
struct RunBuilder {
    states: Vec<VisualState>,
    index: HashMap<VisualState, usize>,
    runs: Vec<FrameRun>,
}

impl RunBuilder {
    fn push(&mut self, start: u64, end: u64, state: VisualState) {
        if start >= end {
            return;
        }
        let next = self.states.len();
        let idx = *self.index.entry(state.clone()).or_insert(next);
        if idx == next {
            self.states.push(state);
        }

        if let Some(last) = self.runs.last_mut()
            && last.state == idx
            && last.range.end.0 == start
        {
            last.range.end = FrameIndex(end);
            return;
        }
        self.runs.push(FrameRun {
            range: FrameRange {
                start: FrameIndex(start),
                end: FrameIndex(end),
            },
            state: idx,
        });
    }

    fn finish(self, fps: Fps, duration_secs: f64, total_frames: u64) -> Timeline {
        Timeline {
            fps,
            duration_secs,
            total_frames,
            states: self.states,
            runs: self.runs,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/scheduler.rs"]
mod tests;
