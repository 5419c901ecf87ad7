//! On-device inference adapters.
//!
//! Each adapter wraps one model capability (detection, embedding, text
//! recognition) behind the common [`InferenceAdapter`] trait so the
//! classifier can hold them as trait objects and run them concurrently.
//! The capability traits themselves are the seam to whatever runtime hosts
//! the models; [`mock`] provides in-process stand-ins.

pub mod detection;
pub mod embedding;
pub mod label;
pub mod mock;

use async_trait::async_trait;
use image::DynamicImage;
use std::sync::Arc;

use modaics_values::{DetectionItem, EmbeddingVector, LabelReadout};

use crate::error::{AdapterError, AdapterResult};

pub use detection::{DetectionAdapter, DetectionModel, RawDetection};
pub use embedding::{EmbeddingAdapter, EmbeddingModel};
pub use label::{LabelReader, RecognizedLine, TextRecognitionModel};

/// One inference capability over a decoded image.
#[async_trait]
pub trait InferenceAdapter: Send + Sync {
    type Output: Send;

    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    async fn infer(&self, image: &DynamicImage) -> AdapterResult<Self::Output>;
}

pub type SharedDetector = Arc<dyn InferenceAdapter<Output = Vec<DetectionItem>>>;
pub type SharedEmbedder = Arc<dyn InferenceAdapter<Output = EmbeddingVector>>;
pub type SharedLabelReader = Arc<dyn InferenceAdapter<Output = LabelReadout>>;

/// Reject images no model can work with.
pub(crate) fn validate_image(adapter: &str, image: &DynamicImage) -> AdapterResult<()> {
    if image.width() == 0 || image.height() == 0 {
        return Err(AdapterError::InvalidImage(format!(
            "{} received a {}x{} image",
            adapter,
            image.width(),
            image.height()
        )));
    }
    Ok(())
}
