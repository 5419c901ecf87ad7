//! Instant classification followed by remote deep analysis and fusion.

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use modaics_client::{ApiClient, ImageUpload};
use modaics_common::{ModaicsConfig, PipelineSettings};
use modaics_values::{DeepAnalysisResult, FusionOutcome, InstantResult};

use crate::error::{PipelineError, PipelineResult};
use crate::fusion::{FusionEngine, FusionPolicy};
use crate::instant::InstantClassifier;

/// Per-call switches for [`HybridClassifier::classify_full`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisOptions {
    pub include_label_read: bool,
    pub generate_story: bool,
    pub suggest_price: bool,
    /// Fuse with local data only when the remote call fails
    pub fallback_to_local: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self::from(&PipelineSettings::default())
    }
}

impl From<&PipelineSettings> for AnalysisOptions {
    fn from(settings: &PipelineSettings) -> Self {
        Self {
            include_label_read: true,
            generate_story: settings.generate_story,
            suggest_price: settings.suggest_price,
            fallback_to_local: settings.fallback_to_local,
        }
    }
}

/// Everything produced by one full classification.
#[derive(Debug, Clone, PartialEq)]
pub struct HybridResult {
    pub instant: InstantResult,
    /// `None` when the remote call failed and local fallback was used
    pub remote: Option<DeepAnalysisResult>,
    pub outcome: FusionOutcome,
}

pub struct HybridClassifier {
    instant: InstantClassifier,
    client: Arc<ApiClient>,
    fusion: FusionEngine,
    jpeg_quality: u8,
}

impl HybridClassifier {
    pub fn new(instant: InstantClassifier, client: Arc<ApiClient>) -> Self {
        Self {
            instant,
            client,
            fusion: FusionEngine::default(),
            jpeg_quality: 85,
        }
    }

    pub fn with_config(mut self, config: &ModaicsConfig) -> Self {
        self.fusion = FusionEngine::new(FusionPolicy::from_settings(&config.fusion));
        self.jpeg_quality = config.pipeline.jpeg_quality;
        self
    }

    pub fn instant(&self) -> &InstantClassifier {
        &self.instant
    }

    /// Instant path, then deep analysis of the same photo, then fusion.
    ///
    /// The instant path and the remote call run one after the other; an
    /// instant failure never reaches the network.
    pub async fn classify_full(&self, image: &DynamicImage, options: AnalysisOptions) -> PipelineResult<HybridResult> {
        let started = Instant::now();
        let instant = self
            .instant
            .classify_instant(image, options.include_label_read)
            .await?;

        let jpeg = encode_jpeg(image, self.jpeg_quality)?;
        let photo = ImageUpload::jpeg("photo.jpg", jpeg);

        let remote = match self
            .client
            .analyze_garment(std::slice::from_ref(&photo), options.generate_story, options.suggest_price)
            .await
        {
            Ok(analysis) => Some(analysis),
            Err(e) if options.fallback_to_local => {
                warn!("Deep analysis failed, using local result only: {}", e);
                None
            }
            Err(e) => return Err(PipelineError::from(e)),
        };

        let outcome = self.fusion.merge(&instant, remote.as_ref());
        info!(
            "Classified as {} ({:.2}) in {:.0} ms",
            outcome.attributes.category,
            outcome.confidence,
            started.elapsed().as_secs_f64() * 1000.0
        );

        Ok(HybridResult {
            instant,
            remote,
            outcome,
        })
    }
}

/// Encode an image as baseline JPEG; alpha is dropped.
pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> PipelineResult<Vec<u8>> {
    if image.width() == 0 || image.height() == 0 {
        return Err(PipelineError::ImageEncodingFailed("image has no pixels".to_string()));
    }

    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
    rgb.write_with_encoder(encoder)
        .map_err(|e| PipelineError::ImageEncodingFailed(e.to_string()))?;

    Ok(buf)
}
