use crate::assets::decode::PreparedImage;
use crate::compose::frame::{FrameLayers, TextBlock};
use crate::timeline::VisualState;

/// Per-segment visual content.
#[derive(Clone, Debug)]
pub struct SegmentVisual {
    pub overlay: Option<PreparedImage>,
    pub caption: TextBlock,
    pub title: Option<TextBlock>,
}

/// All prepared inputs of one render: the backdrop, the global labels, and every segment.
#[derive(Clone, Debug)]
pub struct Scene {
    pub backdrop: PreparedImage,
    pub labels: Vec<TextBlock>,
    pub segments: Vec<SegmentVisual>,
}

impl Scene {
    /// Layers for a visual state.
    ///
    /// Z-order: labels, then overlays, then captions, then titles; within each group
    /// segments stack in input order.
    pub fn layers(&self, state: &VisualState) -> FrameLayers<'_> {
        let active: Vec<&SegmentVisual> = state
            .active()
            .iter()
            .filter_map(|&i| self.segments.get(i))
            .collect();

        FrameLayers {
            under: self.labels.iter().collect(),
            overlays: active.iter().filter_map(|s| s.overlay.as_ref()).collect(),
            over: active
                .iter()
                .map(|s| &s.caption)
                .chain(active.iter().filter_map(|s| s.title.as_ref()))
                .collect(),
        }
    }
}
