//! Garment detection adapter.

use async_trait::async_trait;
use image::DynamicImage;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info};

use modaics_values::{BoundingBox, DetectionItem, GarmentCategory};

use super::{validate_image, InferenceAdapter};
use crate::error::{AdapterError, AdapterResult};

/// Detector output in pixel space, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetection {
    pub label: String,
    pub score: f32,
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl RawDetection {
    pub fn new(label: impl Into<String>, score: f32, left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            label: label.into(),
            score,
            left,
            top,
            width,
            height,
        }
    }
}

/// Object-detection capability provided by the model runtime.
#[async_trait]
pub trait DetectionModel: Send + Sync {
    fn model_id(&self) -> &str;

    async fn detect(&self, image: &DynamicImage) -> anyhow::Result<Vec<RawDetection>>;
}

/// Turns raw detector output into normalized [`DetectionItem`]s.
///
/// The model handle can be swapped at runtime; the lock is only held long
/// enough to clone the `Arc`.
pub struct DetectionAdapter {
    model: RwLock<Option<Arc<dyn DetectionModel>>>,
}

impl Default for DetectionAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectionAdapter {
    /// Adapter with no model loaded; `infer` fails until [`initialize`](Self::initialize).
    pub fn new() -> Self {
        Self {
            model: RwLock::new(None),
        }
    }

    pub fn with_model(model: Arc<dyn DetectionModel>) -> Self {
        let adapter = Self::new();
        adapter.initialize(model);
        adapter
    }

    pub fn initialize(&self, model: Arc<dyn DetectionModel>) {
        info!("Detection model loaded: {}", model.model_id());
        *self.model.write() = Some(model);
    }

    pub fn unload(&self) {
        self.model.write().take();
    }

    pub fn is_initialized(&self) -> bool {
        self.model.read().is_some()
    }
}

#[async_trait]
impl InferenceAdapter for DetectionAdapter {
    type Output = Vec<DetectionItem>;

    fn name(&self) -> &str {
        "detection"
    }

    async fn infer(&self, image: &DynamicImage) -> AdapterResult<Vec<DetectionItem>> {
        validate_image(self.name(), image)?;

        let model = self
            .model
            .read()
            .clone()
            .ok_or_else(|| AdapterError::ModelNotInitialized(self.name().to_string()))?;

        let raw = model
            .detect(image)
            .await
            .map_err(|e| AdapterError::Inference(format!("{}: {:#}", model.model_id(), e)))?;

        let (width, height) = (image.width(), image.height());
        let items: Vec<DetectionItem> = raw
            .into_iter()
            .filter(|d| d.score.is_finite() && d.width > 0.0 && d.height > 0.0)
            .map(|d| {
                DetectionItem::new(
                    GarmentCategory::from_label(&d.label),
                    d.score,
                    BoundingBox::from_pixels(d.left, d.top, d.width, d.height, width, height),
                )
            })
            .collect();

        debug!("{} detections from {}", items.len(), model.model_id());
        Ok(items)
    }
}
