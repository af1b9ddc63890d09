use std::path::Path;

use tracing::debug;

use crate::assets::resolve::{LayerStack, ResolvedLayer};
use crate::encode::job::{MediaInput, VideoFilter};
use crate::foundation::config::{OverlayConfig, VideoConfig};
use crate::foundation::error::{ScenecutError, ScenecutResult};
use crate::scene::model::{AnchorPosition, LayerKind, Scene};

/// Inputs, filter and stream selection for one scene composite.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompositionPlan {
    pub inputs: Vec<MediaInput>,
    pub filter: VideoFilter,
    pub maps: Vec<String>,
}

/// Fit any source into the canvas without distortion: letterbox/pillarbox, square pixels,
/// fixed frame rate.
pub fn normalize_chain(video: &VideoConfig) -> String {
    let (w, h) = (video.width, video.height);
    format!(
        "scale={w}:{h}:force_original_aspect_ratio=decrease,pad={w}:{h}:(ow-iw)/2:(oh-ih)/2,setsar=1,fps={}",
        video.fps
    )
}

/// Overlay coordinates placing the overlay at `position`, `margin` pixels from the edges.
pub fn anchor_expr(position: AnchorPosition, margin: u32) -> String {
    let m = margin;
    match position {
        AnchorPosition::BottomRight => format!("main_w-overlay_w-{m}:main_h-overlay_h-{m}"),
        AnchorPosition::BottomLeft => format!("{m}:main_h-overlay_h-{m}"),
        AnchorPosition::TopRight => format!("main_w-overlay_w-{m}:{m}"),
        AnchorPosition::TopLeft => format!("{m}:{m}"),
        AnchorPosition::Center => "(main_w-overlay_w)/2:(main_h-overlay_h)/2".to_string(),
    }
}

/// Avatar width for `percent` of the frame width, rounded down to an even pixel count.
pub fn avatar_width(frame_width: u32, percent: u32) -> u32 {
    let w = u64::from(frame_width) * u64::from(percent.min(100)) / 100;
    (w as u32 & !1).max(2)
}

fn input_for(layer: &ResolvedLayer) -> MediaInput {
    match layer.kind {
        LayerKind::Stock => MediaInput::looped(&layer.path),
        LayerKind::Infographic | LayerKind::Avatar => MediaInput::plain(&layer.path),
    }
}

/// Base layer chain. Non-looping bases hold their last frame for the rest of the narration.
fn base_chain(base: &ResolvedLayer, video: &VideoConfig, duration: f64) -> String {
    let norm = normalize_chain(video);
    if base.kind == LayerKind::Stock {
        norm
    } else {
        format!("{norm},tpad=stop_mode=clone:stop_duration={duration:.3}")
    }
}

fn avatar_chain(width: u32) -> String {
    format!("scale={width}:-2,setsar=1")
}

/// Build the composition for a resolved layer stack.
///
/// One layer is a plain `-vf` chain. Two layers overlay the top on the base: an avatar is
/// scaled and anchored, anything else covers the full frame. Three layers put the infographic
/// full-frame over stock and the avatar bottom-right on top. The narration track is always the
/// last input and the only audio mapped.
pub fn plan_composition(
    scene: &Scene,
    stack: &LayerStack,
    audio: &Path,
    duration: f64,
    video: &VideoConfig,
    overlay: &OverlayConfig,
) -> ScenecutResult<CompositionPlan> {
    let mut inputs: Vec<MediaInput> = stack.layers.iter().map(input_for).collect();
    let audio_idx = inputs.len();
    inputs.push(MediaInput::plain(audio));
    let audio_map = format!("{audio_idx}:a:0");

    let placement = &scene.visual.avatar;
    let margin = overlay.margin_px;

    match stack.layers.as_slice() {
        [base] => Ok(CompositionPlan {
            inputs,
            filter: VideoFilter::Chain(base_chain(base, video, duration)),
            maps: vec!["0:v:0".to_string(), audio_map],
        }),
        [base, top] => {
            let (top_chain, position) = if top.kind == LayerKind::Avatar {
                let pct = placement
                    .size_percent
                    .unwrap_or(overlay.two_layer_scale_percent);
                let position = placement.position.unwrap_or_default();
                (
                    avatar_chain(avatar_width(video.width, pct)),
                    anchor_expr(position, margin),
                )
            } else {
                (normalize_chain(video), "0:0".to_string())
            };
            let graph = format!(
                "[0:v]{}[base];[1:v]{top_chain}[top];[base][top]overlay={position}[v]",
                base_chain(base, video, duration)
            );
            Ok(CompositionPlan {
                inputs,
                filter: VideoFilter::Graph(graph),
                maps: vec!["[v]".to_string(), audio_map],
            })
        }
        [base, _, _] => {
            if placement.position.is_some_and(|p| p != AnchorPosition::BottomRight) {
                debug!(scene_id = scene.id, "three-layer avatar is always bottom-right");
            }
            let pct = placement
                .size_percent
                .unwrap_or(overlay.three_layer_scale_percent);
            let graph = format!(
                "[0:v]{}[base];[1:v]{}[info];[base][info]overlay=0:0[mid];\
                 [2:v]{}[av];[mid][av]overlay={}[v]",
                base_chain(base, video, duration),
                normalize_chain(video),
                avatar_chain(avatar_width(video.width, pct)),
                anchor_expr(AnchorPosition::BottomRight, margin),
            );
            Ok(CompositionPlan {
                inputs,
                filter: VideoFilter::Graph(graph),
                maps: vec!["[v]".to_string(), audio_map],
            })
        }
        other => Err(ScenecutError::composition(
            scene.id,
            format!("cannot composite {} layers", other.len()),
        )),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/graph.rs"]
mod tests;
