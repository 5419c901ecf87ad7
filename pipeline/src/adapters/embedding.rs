//! Image embedding adapter.

use async_trait::async_trait;
use image::DynamicImage;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

use modaics_common::PipelineSettings;
use modaics_values::{EmbeddingVector, DEFAULT_EMBEDDING_DIM};

use super::{validate_image, InferenceAdapter};
use crate::error::{AdapterError, AdapterResult};

/// Image-embedding capability provided by the model runtime.
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    fn model_id(&self) -> &str;

    async fn embed(&self, image: &DynamicImage) -> anyhow::Result<Vec<f32>>;
}

/// Checks the embedding length and returns it L2-normalized.
pub struct EmbeddingAdapter {
    model: RwLock<Option<Arc<dyn EmbeddingModel>>>,
    dimension: usize,
}

impl EmbeddingAdapter {
    pub fn new(dimension: usize) -> Self {
        Self {
            model: RwLock::new(None),
            dimension,
        }
    }

    /// Expect `[pipeline] embedding_dimension` values.
    pub fn from_settings(settings: &PipelineSettings) -> Self {
        Self::new(settings.embedding_dimension)
    }

    pub fn with_model(model: Arc<dyn EmbeddingModel>, dimension: usize) -> Self {
        let adapter = Self::new(dimension);
        adapter.initialize(model);
        adapter
    }

    pub fn initialize(&self, model: Arc<dyn EmbeddingModel>) {
        info!("Embedding model loaded: {} ({} dims)", model.model_id(), self.dimension);
        *self.model.write() = Some(model);
    }

    pub fn is_initialized(&self) -> bool {
        self.model.read().is_some()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

impl Default for EmbeddingAdapter {
    fn default() -> Self {
        Self::new(DEFAULT_EMBEDDING_DIM)
    }
}

#[async_trait]
impl InferenceAdapter for EmbeddingAdapter {
    type Output = EmbeddingVector;

    fn name(&self) -> &str {
        "embedding"
    }

    async fn infer(&self, image: &DynamicImage) -> AdapterResult<EmbeddingVector> {
        validate_image(self.name(), image)?;

        let model = self
            .model
            .read()
            .clone()
            .ok_or_else(|| AdapterError::ModelNotInitialized(self.name().to_string()))?;

        let values = model
            .embed(image)
            .await
            .map_err(|e| AdapterError::Inference(format!("{}: {:#}", model.model_id(), e)))?;

        if values.is_empty() {
            return Err(AdapterError::NoResults(model.model_id().to_string()));
        }
        if values.len() != self.dimension {
            return Err(AdapterError::DimensionMismatch {
                expected: self.dimension,
                actual: values.len(),
            });
        }

        let vector = EmbeddingVector::new(values).map_err(|e| AdapterError::Inference(e.to_string()))?;
        Ok(vector.normalized())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::MockEmbedder;
    use image::{Rgb, RgbImage};

    fn photo() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([200, 10, 10])))
    }

    #[tokio::test]
    async fn test_dimension_comes_from_settings() {
        let settings = PipelineSettings {
            embedding_dimension: 32,
            ..PipelineSettings::default()
        };
        let adapter = EmbeddingAdapter::from_settings(&settings);
        assert_eq!(adapter.dimension(), 32);
        assert!(!adapter.is_initialized());

        adapter.initialize(Arc::new(MockEmbedder::new(32)));
        let vector = adapter.infer(&photo()).await.unwrap();
        assert_eq!(vector.dimension(), 32);
        assert!((vector.l2_norm() - 1.0).abs() < 1e-4);
    }

    #[tokio::test]
    async fn test_model_disagreeing_with_settings() {
        let adapter = EmbeddingAdapter::from_settings(&PipelineSettings::default());
        adapter.initialize(Arc::new(MockEmbedder::new(16)));

        let err = adapter.infer(&photo()).await.unwrap_err();
        assert_eq!(
            err,
            AdapterError::DimensionMismatch {
                expected: PipelineSettings::default().embedding_dimension,
                actual: 16
            }
        );
    }
}
