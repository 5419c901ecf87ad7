//! Outputs of the on-device path and of fusion.

use serde::{Deserialize, Serialize};

use crate::types::{BoundingBox, EmbeddingVector};

/// Placeholder used wherever an attribute could not be resolved.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Best-effort text read from a garment tag.
///
/// Every extracted field is optional; `raw_text` always carries the lines the
/// recognizer returned so callers can re-parse them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelReadout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(default)]
    pub care_instructions: Vec<String>,
    #[serde(default)]
    pub raw_text: Vec<String>,
    pub confidence: f32,
}

/// Snapshot produced by one instant classification.
///
/// Created once, never mutated; the caller owns it after return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstantResult {
    /// Display label of the dominant detected item, if any survived filtering
    pub category: Option<String>,
    /// Confidence of the dominant item, `0.0` when there is none
    pub category_confidence: f32,
    #[serde(rename = "box")]
    pub bbox: Option<BoundingBox>,
    pub embedding: Option<EmbeddingVector>,
    pub label_readout: Option<LabelReadout>,
    /// Wall-clock time from call entry to result assembly
    pub elapsed_ms: f64,
}

impl InstantResult {
    /// An instant result carrying nothing but a category, handy when
    /// reconstructing local state for fusion.
    pub fn from_category(category: Option<&str>, confidence: f32) -> Self {
        Self {
            category: category.map(str::to_string),
            category_confidence: crate::clamp_confidence(confidence),
            bbox: None,
            embedding: None,
            label_readout: None,
            elapsed_ms: 0.0,
        }
    }

    pub fn with_label_readout(mut self, readout: LabelReadout) -> Self {
        self.label_readout = Some(readout);
        self
    }
}

/// Final attribute set after reconciling local and remote predictions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedAttributes {
    /// Never empty; `"Unknown"` when nothing resolved
    pub category: String,
    pub colors: Vec<String>,
    pub materials: Vec<String>,
    pub condition: String,
    pub style: String,
    pub size: Option<String>,
    pub brand: Option<String>,
}

/// Merged attributes plus the scalar confidence of the merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionOutcome {
    pub attributes: MergedAttributes,
    pub confidence: f32,
}
