//! Reconciling on-device and remote predictions.
//!
//! Fusion is a pure function of its inputs: no I/O, no clock, no failure.

use modaics_common::FusionSettings;
use modaics_values::{clamp_confidence, DeepAnalysisResult, FusionOutcome, InstantResult, MergedAttributes, UNKNOWN_LABEL};

use crate::heuristics;

/// How local and remote confidences are combined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionPolicy {
    /// Weight of the local confidence; remote gets `1 - local_weight`
    pub local_weight: f32,
}

impl Default for FusionPolicy {
    fn default() -> Self {
        Self { local_weight: 0.5 }
    }
}

impl FusionPolicy {
    pub fn new(local_weight: f32) -> Self {
        Self {
            local_weight: clamp_confidence(local_weight),
        }
    }

    pub fn from_settings(settings: &FusionSettings) -> Self {
        Self::new(settings.local_weight)
    }

    fn combine(&self, local: f32, remote: f32) -> f32 {
        self.local_weight * local + (1.0 - self.local_weight) * remote
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FusionEngine {
    policy: FusionPolicy,
}

impl FusionEngine {
    pub fn new(policy: FusionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> FusionPolicy {
        self.policy
    }

    /// Merge an instant result with an optional deep analysis.
    ///
    /// Remote predictions win for category, colors, materials, style and
    /// condition. Brand and size come from the local tag read first, then
    /// from the remote suggestion text.
    pub fn merge(&self, local: &InstantResult, remote: Option<&DeepAnalysisResult>) -> FusionOutcome {
        let local_category = non_blank(local.category.as_deref());
        let local_confidence = clamp_confidence(local.category_confidence);
        let readout = local.label_readout.as_ref();
        let local_brand = readout.and_then(|r| non_blank(r.brand.as_deref()));
        let local_size = readout.and_then(|r| non_blank(r.size.as_deref()));

        let Some(remote) = remote else {
            return FusionOutcome {
                attributes: MergedAttributes {
                    category: local_category.unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
                    colors: Vec::new(),
                    materials: Vec::new(),
                    condition: UNKNOWN_LABEL.to_string(),
                    style: UNKNOWN_LABEL.to_string(),
                    size: local_size,
                    brand: local_brand,
                },
                confidence: local_confidence,
            };
        };

        let top = remote.top_category();
        let category = top
            .and_then(|p| non_blank(Some(p.label.as_str())))
            .or(local_category)
            .unwrap_or_else(|| UNKNOWN_LABEL.to_string());

        let suggestions = remote.suggestions.join("\n");
        let brand = local_brand.or_else(|| heuristics::extract_brand(&suggestions));
        let size = local_size.or_else(|| heuristics::extract_size(&suggestions));

        let confidence = match top {
            Some(p) => self.policy.combine(local_confidence, clamp_confidence(p.confidence)),
            None => local_confidence,
        };

        FusionOutcome {
            attributes: MergedAttributes {
                category,
                colors: remote.color_labels(),
                materials: remote.material_labels(),
                condition: non_blank(Some(remote.condition_grade.label.as_str()))
                    .unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
                style: remote
                    .top_style()
                    .and_then(|p| non_blank(Some(p.label.as_str())))
                    .unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
                size,
                brand,
            },
            confidence: clamp_confidence(confidence),
        }
    }
}

/// Merge with the default (unweighted mean) policy.
pub fn merge(local: &InstantResult, remote: Option<&DeepAnalysisResult>) -> FusionOutcome {
    FusionEngine::default().merge(local, remote)
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}
