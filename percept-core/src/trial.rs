use serde::{Deserialize, Serialize};

use crate::color::Fill;
use crate::item::{BlendMode, Pattern, Shape, StimulusItem};

/// Presentation lifecycle of one trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrialState {
    #[default]
    Pending,
    Rendered,
    Responded,
    Finished,
}

/// What the host gets back when a trial ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub trial_id: usize,
    pub response: Option<String>,
    pub rt_ms: Option<f64>,
    pub stimulus_onset_ms: Option<f64>,
    pub stimulus_offset_ms: Option<f64>,
    pub items: Vec<ItemEcho>,
}

/// Resolved item summary for downstream analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemEcho {
    pub kind: String,
    pub z: i32,
    pub x: f64,
    pub y: f64,
    pub fill: Fill,
    pub alpha: f64,
    pub blend: BlendMode,
    pub mask: String,
    /// Noise seed, so unseeded trials can be regenerated.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub seed: Option<u32>,
}

impl From<&StimulusItem> for ItemEcho {
    fn from(item: &StimulusItem) -> Self {
        Self {
            kind: item.shape.kind_name().to_string(),
            z: item.z,
            x: item.position.0,
            y: item.position.1,
            fill: item.fill,
            alpha: item.alpha,
            blend: item.blend,
            mask: item.mask.kind_name().to_string(),
            seed: match &item.shape {
                Shape::Texture {
                    pattern: Pattern::Noise { seed, .. },
                    ..
                } => Some(*seed),
                _ => None,
            },
        }
    }
}
