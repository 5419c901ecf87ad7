//! Modaics classification pipeline.
//!
//! **Hybrid garment classification: fast on-device answers, refined by the
//! remote analysis service.**
//!
//! ```text
//! photo ─┬─▶ detection ─┐
//!        └─▶ embedding ─┴─▶ dominant item ─▶ [label read] ─▶ InstantResult
//!                                                              │
//!           JPEG ─▶ POST analyze ─▶ DeepAnalysisResult ───────┴─▶ fusion ─▶ FusionOutcome
//! ```
//!
//! - [`instant`]: [`InstantClassifier`] joins detection and embedding, picks
//!   the dominant item, optionally reads the garment tag
//! - [`fusion`]: [`FusionEngine`], a pure merge of local and remote predictions
//! - [`hybrid`]: [`HybridClassifier`] chains the two through `modaics-client`
//! - [`adapters`]: model-capability seams and mock models
//! - [`heuristics`]: brand/size/material/care extraction from tag text

pub mod adapters;
pub mod error;
pub mod fusion;
pub mod heuristics;
pub mod hybrid;
pub mod instant;

pub use adapters::{
    DetectionAdapter, DetectionModel, EmbeddingAdapter, EmbeddingModel, InferenceAdapter, LabelReader,
    RawDetection, RecognizedLine, SharedDetector, SharedEmbedder, SharedLabelReader, TextRecognitionModel,
};
pub use error::{AdapterError, AdapterResult, PipelineError, PipelineResult};
pub use fusion::{merge, FusionEngine, FusionPolicy};
pub use hybrid::{encode_jpeg, AnalysisOptions, HybridClassifier, HybridResult};
pub use instant::{select_dominant, InstantClassifier, DEFAULT_DETECTION_THRESHOLD};
