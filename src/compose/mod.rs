//! Frame composition: backdrop, overlay images, and text blocks rasterized into opaque frames.

pub(crate) mod frame;
pub(crate) mod scene;

use std::collections::HashMap;
use std::sync::Arc;

use rayon::prelude::*;

use crate::assets::font::FontBook;
use crate::foundation::error::ShortsResult;
use crate::timeline::VisualState;

use frame::{ComposeSettings, FrameComposer, FrameRGBA, image_paint};
use scene::Scene;

/// Composed frames keyed by the visual state they show.
pub type FrameCache = HashMap<VisualState, Arc<FrameRGBA>>;

/// Compose each distinct state exactly once, in parallel.
#[tracing::instrument(skip_all, fields(states = states.len()))]
pub fn compose_states(
    scene: &Scene,
    states: &[VisualState],
    settings: ComposeSettings,
    fonts: &FontBook,
) -> ShortsResult<FrameCache> {
    settings.validate()?;
    let backdrop = image_paint(&scene.backdrop)?;

    let rendered = states
        .par_iter()
        .map_init(
            || FrameComposer::new(settings, backdrop.clone(), fonts),
            |composer, state| -> ShortsResult<(VisualState, Arc<FrameRGBA>)> {
                let frame = composer.compose(&scene.layers(state))?;
                Ok((state.clone(), Arc::new(frame)))
            },
        )
        .collect::<Vec<_>>();

    let mut out = FrameCache::with_capacity(rendered.len());
    for item in rendered {
        let (state, frame) = item?;
        out.insert(state, frame);
    }
    Ok(out)
}
