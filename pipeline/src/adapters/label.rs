//! Garment tag reader: text recognition plus tag heuristics.

use async_trait::async_trait;
use image::DynamicImage;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info};

use modaics_values::{clamp_confidence, LabelReadout};

use super::{validate_image, InferenceAdapter};
use crate::error::{AdapterError, AdapterResult};
use crate::heuristics;

/// One line of recognized text.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedLine {
    pub text: String,
    pub confidence: f32,
}

impl RecognizedLine {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

/// Text-recognition capability provided by the model runtime.
#[async_trait]
pub trait TextRecognitionModel: Send + Sync {
    fn model_id(&self) -> &str;

    async fn recognize(&self, image: &DynamicImage) -> anyhow::Result<Vec<RecognizedLine>>;
}

pub struct LabelReader {
    model: RwLock<Option<Arc<dyn TextRecognitionModel>>>,
    min_line_confidence: f32,
}

impl LabelReader {
    pub fn new() -> Self {
        Self {
            model: RwLock::new(None),
            min_line_confidence: 0.3,
        }
    }

    pub fn with_model(model: Arc<dyn TextRecognitionModel>) -> Self {
        let reader = Self::new();
        reader.initialize(model);
        reader
    }

    /// Lines recognized below this confidence are ignored.
    pub fn with_min_line_confidence(mut self, min: f32) -> Self {
        self.min_line_confidence = clamp_confidence(min);
        self
    }

    pub fn initialize(&self, model: Arc<dyn TextRecognitionModel>) {
        info!("Text recognition model loaded: {}", model.model_id());
        *self.model.write() = Some(model);
    }

    pub fn is_initialized(&self) -> bool {
        self.model.read().is_some()
    }

    /// Apply the tag heuristics to already recognized lines.
    pub fn read_lines(&self, lines: &[RecognizedLine]) -> Option<LabelReadout> {
        let kept: Vec<&RecognizedLine> = lines
            .iter()
            .filter(|l| !l.text.trim().is_empty() && l.confidence >= self.min_line_confidence)
            .collect();
        if kept.is_empty() {
            return None;
        }

        let raw_text: Vec<String> = kept.iter().map(|l| l.text.trim().to_string()).collect();
        let joined = raw_text.join("\n");
        let confidence = kept.iter().map(|l| l.confidence).sum::<f32>() / kept.len() as f32;

        Some(LabelReadout {
            brand: heuristics::extract_brand(&joined),
            size: heuristics::extract_size(&joined),
            material: heuristics::extract_material(&joined),
            care_instructions: heuristics::extract_care(&raw_text),
            raw_text,
            confidence: clamp_confidence(confidence),
        })
    }
}

impl Default for LabelReader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InferenceAdapter for LabelReader {
    type Output = LabelReadout;

    fn name(&self) -> &str {
        "label-reader"
    }

    async fn infer(&self, image: &DynamicImage) -> AdapterResult<LabelReadout> {
        validate_image(self.name(), image)?;

        let model = self
            .model
            .read()
            .clone()
            .ok_or_else(|| AdapterError::ModelNotInitialized(self.name().to_string()))?;

        let lines = model
            .recognize(image)
            .await
            .map_err(|e| AdapterError::Inference(format!("{}: {:#}", model.model_id(), e)))?;

        let readout = self
            .read_lines(&lines)
            .ok_or_else(|| AdapterError::NoResults(model.model_id().to_string()))?;

        debug!(
            "Label read: brand={:?} size={:?} material={:?}",
            readout.brand, readout.size, readout.material
        );
        Ok(readout)
    }
}
