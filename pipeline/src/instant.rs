//! On-device instant classification.

use image::DynamicImage;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use modaics_common::PipelineSettings;
use modaics_values::{DetectionItem, InstantResult};

use crate::adapters::{SharedDetector, SharedEmbedder, SharedLabelReader};
use crate::error::PipelineResult;

pub const DEFAULT_DETECTION_THRESHOLD: f32 = 0.5;

/// Pick the item that dominates the frame.
///
/// Detections below `threshold` are ignored (a score equal to the threshold is
/// kept). Among the rest the largest box wins; on equal area the earlier item
/// wins.
pub fn select_dominant(items: &[DetectionItem], threshold: f32) -> Option<&DetectionItem> {
    let mut best: Option<&DetectionItem> = None;
    for item in items.iter().filter(|i| i.confidence >= threshold) {
        match best {
            Some(current) if item.bbox.area() <= current.bbox.area() => {}
            _ => best = Some(item),
        }
    }
    best
}

/// Runs detection and embedding concurrently, then an optional label read.
pub struct InstantClassifier {
    detector: SharedDetector,
    embedder: SharedEmbedder,
    label_reader: Option<SharedLabelReader>,
    detection_threshold: f32,
    latency_target: Duration,
}

impl InstantClassifier {
    pub fn new(detector: SharedDetector, embedder: SharedEmbedder) -> Self {
        Self {
            detector,
            embedder,
            label_reader: None,
            detection_threshold: DEFAULT_DETECTION_THRESHOLD,
            latency_target: Duration::from_millis(150),
        }
    }

    pub fn with_label_reader(mut self, reader: SharedLabelReader) -> Self {
        self.label_reader = Some(reader);
        self
    }

    pub fn with_settings(mut self, settings: &PipelineSettings) -> Self {
        self.detection_threshold = settings.detection_threshold;
        self.latency_target = Duration::from_millis(settings.latency_target_ms);
        self
    }

    pub fn detection_threshold(&self) -> f32 {
        self.detection_threshold
    }

    /// Classify one photo.
    ///
    /// Detection or embedding failure fails the whole call. A failed label
    /// read only leaves `label_readout` empty.
    pub async fn classify_instant(&self, image: &DynamicImage, include_label_read: bool) -> PipelineResult<InstantResult> {
        let started = Instant::now();

        let (detections, embedding) = tokio::try_join!(self.detector.infer(image), self.embedder.infer(image))?;

        let joined = started.elapsed();
        if joined > self.latency_target {
            debug!(
                "Detection + embedding took {:?}, over the {:?} target",
                joined, self.latency_target
            );
        }

        let dominant = select_dominant(&detections, self.detection_threshold);
        debug!(
            "{} detections, dominant: {:?}",
            detections.len(),
            dominant.map(|d| d.category.label())
        );

        let label_readout = match (&self.label_reader, include_label_read) {
            (Some(reader), true) => match reader.infer(image).await {
                Ok(readout) => Some(readout),
                Err(e) => {
                    warn!("Label read failed, continuing without it: {}", e);
                    None
                }
            },
            (None, true) => {
                debug!("Label read requested but no reader is configured");
                None
            }
            (_, false) => None,
        };

        Ok(InstantResult {
            category: dominant.map(|d| d.category.label().to_string()),
            category_confidence: dominant.map(|d| d.confidence).unwrap_or(0.0),
            bbox: dominant.map(|d| d.bbox),
            embedding: Some(embedding),
            label_readout,
            elapsed_ms: started.elapsed().as_secs_f64() * 1000.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modaics_values::{BoundingBox, GarmentCategory};

    fn item(category: GarmentCategory, confidence: f32, w: f32, h: f32) -> DetectionItem {
        DetectionItem::new(category, confidence, BoundingBox::new(0.0, 0.0, w, h))
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let items = vec![
            item(GarmentCategory::Coat, 0.49, 0.9, 0.9),
            item(GarmentCategory::Shirt, 0.50, 0.2, 0.2),
        ];
        let dominant = select_dominant(&items, 0.5).unwrap();
        assert_eq!(dominant.category, GarmentCategory::Shirt);
    }

    #[test]
    fn test_largest_area_wins_in_any_order() {
        let small = item(GarmentCategory::Hat, 0.9, 0.3, 1.0);
        let large = item(GarmentCategory::Dress, 0.6, 0.7, 1.0);

        let forward = [small.clone(), large.clone()];
        let backward = [large, small];
        assert_eq!(select_dominant(&forward, 0.5).unwrap().category, GarmentCategory::Dress);
        assert_eq!(select_dominant(&backward, 0.5).unwrap().category, GarmentCategory::Dress);
    }

    #[test]
    fn test_equal_area_keeps_first() {
        let items = vec![
            item(GarmentCategory::Jeans, 0.7, 0.5, 0.5),
            item(GarmentCategory::Skirt, 0.9, 0.5, 0.5),
        ];
        assert_eq!(select_dominant(&items, 0.5).unwrap().category, GarmentCategory::Jeans);
    }

    #[test]
    fn test_nothing_survives() {
        let items = vec![item(GarmentCategory::Belt, 0.2, 0.5, 0.5)];
        assert!(select_dominant(&items, 0.5).is_none());
        assert!(select_dominant(&[], 0.5).is_none());
    }
}
