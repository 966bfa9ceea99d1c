//! Timeline Scheduler: maps output frames to the set of segments they show.
//!
//! Frames are grouped into runs of identical [`VisualState`] so the composer renders each
//! distinct state once and the encoder repeats it for every frame of its runs.

mod scheduler;

pub use scheduler::explicit_states;

use crate::foundation::core::{Fps, FrameIndex, FrameRange};

/// Indices of the segments visible in a frame, ascending. Empty means backdrop and labels only.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VisualState(Vec<usize>);

impl VisualState {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// State showing exactly one segment.
    pub fn single(segment: usize) -> Self {
        Self(vec![segment])
    }

    pub fn new(mut active: Vec<usize>) -> Self {
        active.sort_unstable();
        active.dedup();
        Self(active)
    }

    pub fn active(&self) -> &[usize] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn shows(&self, segment: usize) -> bool {
        self.0.binary_search(&segment).is_ok()
    }
}

/// Caller-supplied display interval `[start, start + duration)` in seconds.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SegmentWindow {
    pub start: f64,
    pub duration: f64,
}

impl SegmentWindow {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    pub fn contains(&self, t: f64) -> bool {
        self.start <= t && t < self.end()
    }
}

/// How segment display time is derived.
#[derive(Clone, Debug, PartialEq)]
pub enum TimingPolicy {
    /// Segments split the narration evenly, in input order, without overlap.
    Uniform,
    /// One window per segment; windows may overlap or leave gaps.
    Explicit(Vec<SegmentWindow>),
}

impl TimingPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Uniform => "uniform",
            Self::Explicit(_) => "explicit",
        }
    }
}

/// Consecutive frames sharing one visual state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameRun {
    pub range: FrameRange,
    /// Index into [`Timeline::states`].
    pub state: usize,
}

/// Fully resolved frame sequence of one render.
#[derive(Clone, Debug)]
pub struct Timeline {
    pub fps: Fps,
    /// Wall-clock duration of the output in seconds.
    pub duration_secs: f64,
    pub total_frames: u64,
    /// Distinct states in order of first appearance.
    pub states: Vec<VisualState>,
    /// Runs covering `0..total_frames` without gaps, ascending.
    pub runs: Vec<FrameRun>,
}

impl Timeline {
    /// State displayed at frame `f`, or `None` past the end.
    pub fn state_at(&self, f: FrameIndex) -> Option<&VisualState> {
        let i = self.runs.partition_point(|r| r.range.end.0 <= f.0);
        let run = self.runs.get(i)?;
        run.range
            .contains(f)
            .then(|| &self.states[run.state])
    }

    /// Frame ranges during which `segment` is visible.
    pub fn frames_for_segment(&self, segment: usize) -> Vec<FrameRange> {
        let mut out: Vec<FrameRange> = Vec::new();
        for run in &self.runs {
            if !self.states[run.state].shows(segment) {
                continue;
            }
            match out.last_mut() {
                Some(last) if last.end == run.range.start => last.end = run.range.end,
                _ => out.push(run.range),
            }
        }
        out
    }

    /// Number of frames during which `segment` is visible.
    pub fn frame_count_for_segment(&self, segment: usize) -> u64 {
        self.frames_for_segment(segment)
            .iter()
            .map(|r| r.len_frames())
            .sum()
    }

    /// Every frame in order with the state it shows.
    pub fn frames(&self) -> impl Iterator<Item = (FrameIndex, &VisualState)> + '_ {
        self.runs.iter().flat_map(move |run| {
            let state = &self.states[run.state];
            (run.range.start.0..run.range.end.0).map(move |f| (FrameIndex(f), state))
        })
    }
}
