//! In-process model stand-ins.
//!
//! These let the pipeline run end to end without a model runtime, for tests
//! and for development builds.

use async_trait::async_trait;
use image::DynamicImage;
use std::time::Duration;

use super::detection::{DetectionModel, RawDetection};
use super::embedding::EmbeddingModel;
use super::label::{RecognizedLine, TextRecognitionModel};

/// Returns a fixed set of detections, optionally after a delay.
#[derive(Debug, Clone, Default)]
pub struct MockDetector {
    detections: Vec<RawDetection>,
    failure: Option<String>,
    delay: Option<Duration>,
}

impl MockDetector {
    pub fn new(detections: Vec<RawDetection>) -> Self {
        Self {
            detections,
            ..Default::default()
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl DetectionModel for MockDetector {
    fn model_id(&self) -> &str {
        "mock-detector"
    }

    async fn detect(&self, _image: &DynamicImage) -> anyhow::Result<Vec<RawDetection>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.failure {
            Some(message) => Err(anyhow::anyhow!("{}", message)),
            None => Ok(self.detections.clone()),
        }
    }
}

/// Deterministic embedding derived from the image's pixel statistics.
#[derive(Debug, Clone)]
pub struct MockEmbedder {
    dimension: usize,
    failure: Option<String>,
    delay: Option<Duration>,
}

impl MockEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            failure: None,
            delay: None,
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            dimension: 0,
            failure: Some(message.into()),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl EmbeddingModel for MockEmbedder {
    fn model_id(&self) -> &str {
        "mock-embedder"
    }

    async fn embed(&self, image: &DynamicImage) -> anyhow::Result<Vec<f32>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = &self.failure {
            anyhow::bail!("{}", message);
        }

        let mut values = vec![0.0f32; self.dimension];
        if self.dimension == 0 {
            return Ok(values);
        }

        // Fold the RGB bytes into the vector, with a bias so flat images are non-zero
        let rgb = image.to_rgb8();
        for (i, byte) in rgb.as_raw().iter().enumerate() {
            values[i % self.dimension] += f32::from(*byte) / 255.0;
        }
        for (i, v) in values.iter_mut().enumerate() {
            *v += 1.0 / (i as f32 + 1.0);
        }

        Ok(values)
    }
}

/// Returns fixed tag text.
#[derive(Debug, Clone, Default)]
pub struct MockLabelReader {
    lines: Vec<RecognizedLine>,
    failure: Option<String>,
}

impl MockLabelReader {
    pub fn new(lines: Vec<RecognizedLine>) -> Self {
        Self { lines, failure: None }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            lines: Vec::new(),
            failure: Some(message.into()),
        }
    }
}

#[async_trait]
impl TextRecognitionModel for MockLabelReader {
    fn model_id(&self) -> &str {
        "mock-text-recognizer"
    }

    async fn recognize(&self, _image: &DynamicImage) -> anyhow::Result<Vec<RecognizedLine>> {
        match &self.failure {
            Some(message) => Err(anyhow::anyhow!("{}", message)),
            None => Ok(self.lines.clone()),
        }
    }
}
