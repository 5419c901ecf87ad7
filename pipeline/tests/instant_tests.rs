//! Instant classification through the real adapters and mock models.

use image::{DynamicImage, Rgb, RgbImage};
use std::sync::Arc;
use std::time::{Duration, Instant};

use modaics_pipeline::adapters::mock::{MockDetector, MockEmbedder, MockLabelReader};
use modaics_pipeline::{
    AdapterError, DetectionAdapter, EmbeddingAdapter, InstantClassifier, LabelReader, PipelineError, RawDetection,
    RecognizedLine, SharedDetector, SharedEmbedder,
};

const DIM: usize = 16;

fn photo() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 200, Rgb([40, 60, 120])))
}

fn detector(model: MockDetector) -> SharedDetector {
    Arc::new(DetectionAdapter::with_model(Arc::new(model)))
}

fn embedder(model: MockEmbedder) -> SharedEmbedder {
    Arc::new(EmbeddingAdapter::with_model(Arc::new(model), DIM))
}

fn jacket_and_hat() -> MockDetector {
    MockDetector::new(vec![
        RawDetection::new("hat", 0.95, 10.0, 0.0, 30.0, 20.0),
        RawDetection::new("denim jacket", 0.81, 0.0, 40.0, 100.0, 140.0),
    ])
}

#[tokio::test]
async fn test_instant_result_from_dominant_item() {
    let classifier = InstantClassifier::new(detector(jacket_and_hat()), embedder(MockEmbedder::new(DIM)));

    let result = classifier.classify_instant(&photo(), false).await.unwrap();

    assert_eq!(result.category.as_deref(), Some("denim jacket"));
    assert!((result.category_confidence - 0.81).abs() < 1e-6);
    let bbox = result.bbox.unwrap();
    assert!((bbox.y - 0.2).abs() < 1e-6);
    assert!((bbox.h - 0.7).abs() < 1e-6);

    let embedding = result.embedding.unwrap();
    assert_eq!(embedding.dimension(), DIM);
    assert!((embedding.l2_norm() - 1.0).abs() < 1e-4);
    assert!(result.elapsed_ms >= 0.0);
    assert!(result.label_readout.is_none());
}

#[tokio::test]
async fn test_no_confident_detection_still_succeeds() {
    let classifier = InstantClassifier::new(
        detector(MockDetector::new(vec![RawDetection::new("scarf", 0.2, 0.0, 0.0, 50.0, 50.0)])),
        embedder(MockEmbedder::new(DIM)),
    );

    let result = classifier.classify_instant(&photo(), false).await.unwrap();
    assert!(result.category.is_none());
    assert_eq!(result.category_confidence, 0.0);
    assert!(result.bbox.is_none());
    assert!(result.embedding.is_some());
}

#[tokio::test]
async fn test_detection_failure_aborts() {
    let classifier = InstantClassifier::new(
        detector(MockDetector::failing("accelerator lost")),
        embedder(MockEmbedder::new(DIM)),
    );

    let err = classifier.classify_instant(&photo(), true).await.unwrap_err();
    assert!(matches!(err, PipelineError::Adapter(AdapterError::Inference(ref msg)) if msg.contains("accelerator lost")));
}

#[tokio::test]
async fn test_embedding_failure_aborts() {
    let classifier = InstantClassifier::new(detector(jacket_and_hat()), embedder(MockEmbedder::failing("oom")));
    assert!(classifier.classify_instant(&photo(), false).await.is_err());
}

#[tokio::test]
async fn test_embedding_dimension_is_checked() {
    let classifier = InstantClassifier::new(detector(jacket_and_hat()), embedder(MockEmbedder::new(DIM + 1)));

    let err = classifier.classify_instant(&photo(), false).await.unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Adapter(AdapterError::DimensionMismatch { expected: DIM, actual })
            if actual == DIM + 1
    ));
}

#[tokio::test]
async fn test_uninitialized_adapter() {
    let classifier = InstantClassifier::new(Arc::new(DetectionAdapter::new()), embedder(MockEmbedder::new(DIM)));

    let err = classifier.classify_instant(&photo(), false).await.unwrap_err();
    assert!(matches!(err, PipelineError::Adapter(AdapterError::ModelNotInitialized(_))));
}

#[tokio::test]
async fn test_empty_image_is_rejected() {
    let classifier = InstantClassifier::new(detector(jacket_and_hat()), embedder(MockEmbedder::new(DIM)));

    let err = classifier
        .classify_instant(&DynamicImage::new_rgb8(0, 0), false)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Adapter(AdapterError::InvalidImage(_))));
}

#[tokio::test]
async fn test_label_read_populates_readout() {
    let reader = LabelReader::with_model(Arc::new(MockLabelReader::new(vec![
        RecognizedLine::new("PATAGONIA", 0.92),
        RecognizedLine::new("SIZE L", 0.88),
        RecognizedLine::new("100% RECYCLED POLYESTER", 0.8),
    ])));
    let classifier = InstantClassifier::new(detector(jacket_and_hat()), embedder(MockEmbedder::new(DIM)))
        .with_label_reader(Arc::new(reader));

    let result = classifier.classify_instant(&photo(), true).await.unwrap();
    let readout = result.label_readout.unwrap();
    assert_eq!(readout.brand.as_deref(), Some("Patagonia"));
    assert_eq!(readout.size.as_deref(), Some("L"));
    assert_eq!(readout.material.as_deref(), Some("100% Recycled Polyester"));
}

#[tokio::test]
async fn test_label_failure_is_absorbed() {
    let reader = LabelReader::with_model(Arc::new(MockLabelReader::failing("blurry tag")));
    let classifier = InstantClassifier::new(detector(jacket_and_hat()), embedder(MockEmbedder::new(DIM)))
        .with_label_reader(Arc::new(reader));

    let result = classifier.classify_instant(&photo(), true).await.unwrap();
    assert!(result.label_readout.is_none());
    assert_eq!(result.category.as_deref(), Some("denim jacket"));
}

#[tokio::test]
async fn test_label_read_skipped_when_not_requested() {
    let reader = LabelReader::with_model(Arc::new(MockLabelReader::new(vec![RecognizedLine::new("ZARA", 0.9)])));
    let classifier = InstantClassifier::new(detector(jacket_and_hat()), embedder(MockEmbedder::new(DIM)))
        .with_label_reader(Arc::new(reader));

    let result = classifier.classify_instant(&photo(), false).await.unwrap();
    assert!(result.label_readout.is_none());
}

#[tokio::test]
async fn test_detection_and_embedding_run_concurrently() {
    let delay = Duration::from_millis(150);
    let classifier = InstantClassifier::new(
        detector(jacket_and_hat().with_delay(delay)),
        embedder(MockEmbedder::new(DIM).with_delay(delay)),
    );

    let started = Instant::now();
    classifier.classify_instant(&photo(), false).await.unwrap();
    let elapsed = started.elapsed();

    // Sequential execution would take at least 300 ms
    assert!(elapsed >= delay);
    assert!(elapsed < delay * 2, "took {:?}", elapsed);
}

#[tokio::test]
async fn test_elapsed_covers_the_call() {
    let classifier = InstantClassifier::new(
        detector(jacket_and_hat().with_delay(Duration::from_millis(20))),
        embedder(MockEmbedder::new(DIM)),
    );

    let started = Instant::now();
    let result = classifier.classify_instant(&photo(), false).await.unwrap();
    let outer = started.elapsed().as_secs_f64() * 1000.0;

    assert!(result.elapsed_ms >= 20.0);
    assert!(result.elapsed_ms <= outer + 1.0);
}
