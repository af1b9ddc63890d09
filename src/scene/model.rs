use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use crate::foundation::error::{ScenecutError, ScenecutResult};

/// One visual source composited into a scene frame, bottom to top in declaration order.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Stock,
    Infographic,
    Avatar,
}

impl LayerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stock => "stock",
            Self::Infographic => "infographic",
            Self::Avatar => "avatar",
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of composition modes downstream stages understand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SceneKind {
    StockOnly,
    InfographicOnly,
    FullComposite,
}

impl SceneKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StockOnly => "STOCK_ONLY",
            Self::InfographicOnly => "INFOGRAPHIC_ONLY",
            Self::FullComposite => "FULL_COMPOSITE",
        }
    }

    /// Layers required before any avatar overlay, bottom to top.
    pub fn base_layers(self) -> &'static [LayerKind] {
        match self {
            Self::StockOnly => &[LayerKind::Stock],
            Self::InfographicOnly => &[LayerKind::Infographic],
            Self::FullComposite => &[LayerKind::Stock, LayerKind::Infographic],
        }
    }
}

impl fmt::Display for SceneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Marker types kept for old scripts; the parser rewrites them to [`SceneKind::StockOnly`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LegacyKind {
    AvatarOnly,
    AvatarOverStock,
}

impl LegacyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AvatarOnly => "AVATAR_ONLY",
            Self::AvatarOverStock => "AVATAR_OVER_STOCK",
        }
    }

    pub fn normalized(self) -> SceneKind {
        SceneKind::StockOnly
    }
}

/// Named overlay anchor for the avatar layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnchorPosition {
    #[default]
    BottomRight,
    BottomLeft,
    TopRight,
    TopLeft,
    Center,
}

impl AnchorPosition {
    pub const ALL: [AnchorPosition; 5] = [
        Self::BottomRight,
        Self::BottomLeft,
        Self::TopRight,
        Self::TopLeft,
        Self::Center,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::BottomRight => "bottom-right",
            Self::BottomLeft => "bottom-left",
            Self::TopRight => "top-right",
            Self::TopLeft => "top-left",
            Self::Center => "center",
        }
    }

    /// Accepts `bottom-right`, `bottom_right` and `Bottom Right` spellings.
    pub fn parse(raw: &str) -> Option<Self> {
        let norm: String = raw
            .trim()
            .chars()
            .map(|c| match c {
                '_' | ' ' => '-',
                c => c.to_ascii_lowercase(),
            })
            .collect();
        Self::ALL.into_iter().find(|p| p.as_str() == norm)
    }
}

impl fmt::Display for AnchorPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source identifiers per composition mode. Each variant carries only the fields its layers
/// need; `None` falls back to the scene-id default name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayerSources {
    StockOnly {
        stock_file: Option<String>,
    },
    InfographicOnly {
        infographic_id: Option<String>,
    },
    FullComposite {
        stock_file: Option<String>,
        infographic_id: Option<String>,
    },
}

impl LayerSources {
    pub fn empty(kind: SceneKind) -> Self {
        match kind {
            SceneKind::StockOnly => Self::StockOnly { stock_file: None },
            SceneKind::InfographicOnly => Self::InfographicOnly {
                infographic_id: None,
            },
            SceneKind::FullComposite => Self::FullComposite {
                stock_file: None,
                infographic_id: None,
            },
        }
    }

    pub fn kind(&self) -> SceneKind {
        match self {
            Self::StockOnly { .. } => SceneKind::StockOnly,
            Self::InfographicOnly { .. } => SceneKind::InfographicOnly,
            Self::FullComposite { .. } => SceneKind::FullComposite,
        }
    }

    pub fn stock_file(&self) -> Option<&str> {
        match self {
            Self::StockOnly { stock_file } | Self::FullComposite { stock_file, .. } => {
                stock_file.as_deref()
            }
            Self::InfographicOnly { .. } => None,
        }
    }

    pub fn infographic_id(&self) -> Option<&str> {
        match self {
            Self::InfographicOnly { infographic_id }
            | Self::FullComposite { infographic_id, .. } => infographic_id.as_deref(),
            Self::StockOnly { .. } => None,
        }
    }

    /// Slot for the stock identifier, or `None` when this mode has no stock layer.
    pub fn stock_slot(&mut self) -> Option<&mut Option<String>> {
        match self {
            Self::StockOnly { stock_file } | Self::FullComposite { stock_file, .. } => {
                Some(stock_file)
            }
            Self::InfographicOnly { .. } => None,
        }
    }

    /// Slot for the infographic identifier, or `None` when this mode has no infographic layer.
    pub fn infographic_slot(&mut self) -> Option<&mut Option<String>> {
        match self {
            Self::InfographicOnly { infographic_id }
            | Self::FullComposite { infographic_id, .. } => Some(infographic_id),
            Self::StockOnly { .. } => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AvatarPlacement {
    /// Set by the `avatar` flag or any `position`/`size` marker parameter.
    pub requested: bool,
    pub position: Option<AnchorPosition>,
    /// Percentage of frame width; `None` uses the configured default for the layer count.
    pub size_percent: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisualRequirements {
    pub sources: LayerSources,
    pub avatar: AvatarPlacement,
    pub layout: Option<String>,
    pub flags: BTreeSet<String>,
}

impl VisualRequirements {
    pub fn new(kind: SceneKind) -> Self {
        Self {
            sources: LayerSources::empty(kind),
            avatar: AvatarPlacement::default(),
            layout: None,
            flags: BTreeSet::new(),
        }
    }
}

/// One narrated segment of the output video.
///
/// Created by the parser with timing and audio fields empty, then enriched in place by each
/// stage. Serialized through [`SceneRecord`] so the state file keeps a flat, stable layout.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "SceneRecord", into = "SceneRecord")]
pub struct Scene {
    pub id: u32,
    pub original_type: Option<LegacyKind>,
    pub narration_text: String,
    pub visual: VisualRequirements,
    pub duration_estimate: f64,
    pub audio_file: Option<PathBuf>,
    pub audio_duration: Option<f64>,
    pub start_time: Option<f64>,
    pub end_time: Option<f64>,
    pub avatar_video: Option<PathBuf>,
    pub video_file: Option<PathBuf>,
    /// Video codec `video_file` was encoded with, when this pipeline encoded it.
    pub video_codec: Option<String>,
}

impl Scene {
    pub fn new(id: u32, visual: VisualRequirements, narration_text: impl Into<String>) -> Self {
        Self {
            id,
            original_type: None,
            narration_text: narration_text.into(),
            visual,
            duration_estimate: 0.0,
            audio_file: None,
            audio_duration: None,
            start_time: None,
            end_time: None,
            avatar_video: None,
            video_file: None,
            video_codec: None,
        }
    }

    pub fn kind(&self) -> SceneKind {
        self.visual.sources.kind()
    }

    /// `true` once synthesis produced an audio file with a measured duration.
    pub fn has_audio(&self) -> bool {
        self.audio_file.is_some() && self.audio_duration.is_some()
    }

    pub fn wants_avatar(&self) -> bool {
        self.visual.avatar.requested || self.avatar_video.is_some()
    }

    /// Required layers, bottom to top.
    pub fn required_layers(&self) -> Vec<LayerKind> {
        let mut layers = self.kind().base_layers().to_vec();
        if self.wants_avatar() {
            layers.push(LayerKind::Avatar);
        }
        layers
    }

    pub fn clear_audio(&mut self) {
        self.audio_file = None;
        self.audio_duration = None;
        self.start_time = None;
        self.end_time = None;
    }
}

/// Flat on-disk form of a [`Scene`].
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SceneRecord {
    scene_id: u32,
    #[serde(rename = "type")]
    kind: SceneKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    original_type: Option<LegacyKind>,
    #[serde(default)]
    narration_text: String,
    #[serde(default)]
    visual_requirements: RequirementsRecord,
    #[serde(default)]
    duration_estimate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    audio_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    audio_duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    start_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    avatar_video: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    video_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    video_codec: Option<String>,
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct RequirementsRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    stock_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    infographic_id: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    avatar: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    avatar_position: Option<AnchorPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    avatar_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    layout: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    flags: BTreeSet<String>,
}

impl From<Scene> for SceneRecord {
    fn from(s: Scene) -> Self {
        let kind = s.kind();
        let VisualRequirements {
            sources,
            avatar,
            layout,
            flags,
        } = s.visual;
        let (stock_file, infographic_id) = match sources {
            LayerSources::StockOnly { stock_file } => (stock_file, None),
            LayerSources::InfographicOnly { infographic_id } => (None, infographic_id),
            LayerSources::FullComposite {
                stock_file,
                infographic_id,
            } => (stock_file, infographic_id),
        };

        Self {
            scene_id: s.id,
            kind,
            original_type: s.original_type,
            narration_text: s.narration_text,
            visual_requirements: RequirementsRecord {
                stock_file,
                infographic_id,
                avatar: avatar.requested,
                avatar_position: avatar.position,
                avatar_size: avatar.size_percent,
                layout,
                flags,
            },
            duration_estimate: s.duration_estimate,
            audio_file: s.audio_file,
            audio_duration: s.audio_duration,
            start_time: s.start_time,
            end_time: s.end_time,
            avatar_video: s.avatar_video,
            video_file: s.video_file,
            video_codec: s.video_codec,
        }
    }
}

impl TryFrom<SceneRecord> for Scene {
    type Error = ScenecutError;

    fn try_from(r: SceneRecord) -> ScenecutResult<Self> {
        if r.scene_id == 0 {
            return Err(ScenecutError::validation("scene_id must be positive"));
        }
        let id = r.scene_id;
        let req = r.visual_requirements;

        let mut sources = LayerSources::empty(r.kind);
        if let Some(stock) = req.stock_file {
            let slot = sources.stock_slot().ok_or_else(|| {
                ScenecutError::validation(format!(
                    "scene {id}: stock_file is not valid for {}",
                    r.kind
                ))
            })?;
            *slot = Some(stock);
        }
        if let Some(info) = req.infographic_id {
            let slot = sources.infographic_slot().ok_or_else(|| {
                ScenecutError::validation(format!(
                    "scene {id}: infographic_id is not valid for {}",
                    r.kind
                ))
            })?;
            *slot = Some(info);
        }

        if let Some(size) = req.avatar_size
            && !(1..=100).contains(&size)
        {
            return Err(ScenecutError::validation(format!(
                "scene {id}: avatar_size must be in 1..=100, got {size}"
            )));
        }
        if let Some(d) = r.audio_duration
            && !(d.is_finite() && d >= 0.0)
        {
            return Err(ScenecutError::validation(format!(
                "scene {id}: audio_duration must be a non-negative number"
            )));
        }

        Ok(Self {
            id,
            original_type: r.original_type,
            narration_text: r.narration_text,
            visual: VisualRequirements {
                sources,
                avatar: AvatarPlacement {
                    requested: req.avatar,
                    position: req.avatar_position,
                    size_percent: req.avatar_size,
                },
                layout: req.layout,
                flags: req.flags,
            },
            duration_estimate: r.duration_estimate,
            audio_file: r.audio_file,
            audio_duration: r.audio_duration,
            start_time: r.start_time,
            end_time: r.end_time,
            avatar_video: r.avatar_video,
            video_file: r.video_file,
            video_codec: r.video_codec,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
