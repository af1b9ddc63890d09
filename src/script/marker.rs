use tracing::debug;

use crate::foundation::error::{ScenecutError, ScenecutResult};
use crate::scene::model::{AnchorPosition, LegacyKind, SceneKind, VisualRequirements};

/// Type named by a scene marker, before legacy normalization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerType {
    Current(SceneKind),
    Legacy(LegacyKind),
}

impl MarkerType {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "STOCK_ONLY" => Self::Current(SceneKind::StockOnly),
            "INFOGRAPHIC_ONLY" => Self::Current(SceneKind::InfographicOnly),
            "FULL_COMPOSITE" => Self::Current(SceneKind::FullComposite),
            "AVATAR_ONLY" => Self::Legacy(LegacyKind::AvatarOnly),
            "AVATAR_OVER_STOCK" => Self::Legacy(LegacyKind::AvatarOverStock),
            _ => return None,
        })
    }

    /// Normalized kind; legacy types collapse to their current replacement here and nowhere else.
    pub fn kind(self) -> SceneKind {
        match self {
            Self::Current(kind) => kind,
            Self::Legacy(legacy) => legacy.normalized(),
        }
    }

    pub fn legacy(self) -> Option<LegacyKind> {
        match self {
            Self::Current(_) => None,
            Self::Legacy(legacy) => Some(legacy),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MarkerParam {
    Value { key: String, value: String },
    Flag(String),
}

/// A parsed `[TYPE | key:value | flag]` line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Marker {
    pub marker_type: MarkerType,
    pub params: Vec<MarkerParam>,
}

/// Parse one trimmed script line.
///
/// Returns `Ok(None)` when the line is not marker-shaped (it is narration), and a parse error
/// when it is marker-shaped but names a type outside the closed set.
pub fn parse_marker(line: &str, line_no: usize) -> ScenecutResult<Option<Marker>> {
    let Some(inner) = line
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
    else {
        return Ok(None);
    };

    let mut segments = inner.split('|');
    let head = segments.next().unwrap_or_default().trim();
    if head.is_empty() || !head.chars().all(|c| c.is_ascii_uppercase() || c == '_') {
        return Ok(None);
    }

    let marker_type = MarkerType::from_name(head).ok_or_else(|| {
        ScenecutError::parse(line_no, format!("unrecognized scene type '{head}'"))
    })?;

    let mut params = Vec::new();
    for segment in segments {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        match segment.split_once(':') {
            Some((key, value)) => {
                let (key, value) = (key.trim(), value.trim());
                if key.is_empty() {
                    return Err(ScenecutError::parse(
                        line_no,
                        format!("marker parameter '{segment}' has an empty key"),
                    ));
                }
                if value.is_empty() {
                    return Err(ScenecutError::parse(
                        line_no,
                        format!("marker parameter '{key}' has an empty value"),
                    ));
                }
                params.push(MarkerParam::Value {
                    key: key.to_string(),
                    value: value.to_string(),
                });
            }
            None => params.push(MarkerParam::Flag(segment.to_string())),
        }
    }

    Ok(Some(Marker {
        marker_type,
        params,
    }))
}

impl Marker {
    /// Build the typed visual requirements for this marker.
    pub fn visual_requirements(&self, line_no: usize) -> ScenecutResult<VisualRequirements> {
        let kind = self.marker_type.kind();
        let mut visual = VisualRequirements::new(kind);

        for param in &self.params {
            match param {
                MarkerParam::Flag(flag) if flag == "avatar" => visual.avatar.requested = true,
                MarkerParam::Flag(flag) => {
                    visual.flags.insert(flag.clone());
                }
                MarkerParam::Value { key, value } => match key.as_str() {
                    "stock" => match visual.sources.stock_slot() {
                        Some(slot) => *slot = Some(value.clone()),
                        None => debug!(line = line_no, %kind, "ignoring stock parameter"),
                    },
                    "infographic" => match visual.sources.infographic_slot() {
                        Some(slot) => *slot = Some(value.clone()),
                        None => debug!(line = line_no, %kind, "ignoring infographic parameter"),
                    },
                    "position" => {
                        let position = AnchorPosition::parse(value).ok_or_else(|| {
                            ScenecutError::parse(
                                line_no,
                                format!("unknown avatar position '{value}'"),
                            )
                        })?;
                        visual.avatar.position = Some(position);
                        visual.avatar.requested = true;
                    }
                    "size" => {
                        visual.avatar.size_percent = Some(parse_percent(value, line_no)?);
                        visual.avatar.requested = true;
                    }
                    "layout" => visual.layout = Some(value.clone()),
                    other => debug!(line = line_no, key = other, "ignoring unknown marker parameter"),
                },
            }
        }

        Ok(visual)
    }
}

/// `25`, `25%` → 25. Must land in 1..=100.
fn parse_percent(raw: &str, line_no: usize) -> ScenecutResult<u32> {
    let digits = raw.trim().trim_end_matches('%').trim();
    match digits.parse::<u32>() {
        Ok(pct) if (1..=100).contains(&pct) => Ok(pct),
        _ => Err(ScenecutError::parse(
            line_no,
            format!("avatar size '{raw}' must be a percentage in 1..=100"),
        )),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/script/marker.rs"]
mod tests;
