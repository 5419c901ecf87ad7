//! Modaics value types.
//!
//! **Type-safe data model shared by the pipeline and the API client.**
//!
//! - [`types`]: geometry, detector categories, detections, embeddings
//! - [`results`]: label readouts, instant results, fusion output
//! - [`analysis`]: the remote deep-analysis payloads
//! - [`marketplace`]: request/response shapes for garment, search and discovery endpoints
//!
//! Everything here is plain data. Behaviour that needs collaborators (models,
//! network, tokens) lives in `modaics-pipeline` and `modaics-client`.

pub mod analysis;
pub mod error;
pub mod marketplace;
pub mod results;
pub mod types;

pub use analysis::{
    AttributePrediction, BatchAggregate, BatchAnalysisResult, ConditionGrade, DeepAnalysisResult, EstimatedPrice,
    ExtractedColor,
};
pub use error::{ValueError, ValueResult};
pub use marketplace::{
    DiscoveryQuery, DiscoveryResponse, DiscoveryResult, ExchangeType, GarmentCondition,
    GarmentDraft, GarmentRecord, GarmentStatus, ImageEmbeddingResponse, StyleAttributes, VisualSearchHit,
    VisualSearchResponse,
};
pub use results::{FusionOutcome, InstantResult, LabelReadout, MergedAttributes, UNKNOWN_LABEL};
pub use types::{BoundingBox, DetectionItem, EmbeddingVector, GarmentCategory, DEFAULT_EMBEDDING_DIM};

/// Clamp a confidence score into `[0, 1]`, mapping NaN to zero.
pub fn clamp_confidence(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
