//! Core geometric and model-output types.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::clamp_confidence;
use crate::error::{ValueError, ValueResult};

/// Default embedding length (FashionCLIP ViT-B/32 image tower).
pub const DEFAULT_EMBEDDING_DIM: usize = 512;

/// Normalized rectangle, all components in `[0, 1]`.
///
/// The box never extends past the image: `x + w <= 1` and `y + h <= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl BoundingBox {
    /// Build a box, clamping every component into the unit square.
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        let x = unit(x);
        let y = unit(y);
        Self {
            x,
            y,
            w: unit(w).min(1.0 - x),
            h: unit(h).min(1.0 - y),
        }
    }

    /// Normalize a pixel-space rectangle against the image dimensions.
    ///
    /// Zero-sized images yield an empty box rather than dividing by zero.
    pub fn from_pixels(left: f32, top: f32, width: f32, height: f32, image_w: u32, image_h: u32) -> Self {
        if image_w == 0 || image_h == 0 {
            return Self::new(0.0, 0.0, 0.0, 0.0);
        }
        let iw = image_w as f32;
        let ih = image_h as f32;
        Self::new(left / iw, top / ih, width / iw, height / ih)
    }

    pub fn area(&self) -> f32 {
        self.w * self.h
    }
}

fn unit(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

/// Garment classes the on-device detector can emit.
///
/// Labels outside the known vocabulary are preserved in [`GarmentCategory::Other`]
/// so nothing the model says is lost.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GarmentCategory {
    TShirt,
    Shirt,
    Blouse,
    Sweater,
    Hoodie,
    Cardigan,
    Jacket,
    DenimJacket,
    Coat,
    Vest,
    Dress,
    Skirt,
    Jeans,
    Trousers,
    Shorts,
    Jumpsuit,
    Suit,
    Swimsuit,
    AthleticTop,
    Leggings,
    Sneakers,
    Boots,
    Heels,
    Sandals,
    Handbag,
    Scarf,
    Hat,
    Belt,
    Other(String),
}

impl GarmentCategory {
    /// Display label, used verbatim as `InstantResult::category`.
    pub fn label(&self) -> &str {
        match self {
            Self::TShirt => "t-shirt",
            Self::Shirt => "shirt",
            Self::Blouse => "blouse",
            Self::Sweater => "sweater",
            Self::Hoodie => "hoodie",
            Self::Cardigan => "cardigan",
            Self::Jacket => "jacket",
            Self::DenimJacket => "denim jacket",
            Self::Coat => "coat",
            Self::Vest => "vest",
            Self::Dress => "dress",
            Self::Skirt => "skirt",
            Self::Jeans => "jeans",
            Self::Trousers => "trousers",
            Self::Shorts => "shorts",
            Self::Jumpsuit => "jumpsuit",
            Self::Suit => "suit",
            Self::Swimsuit => "swimsuit",
            Self::AthleticTop => "athletic top",
            Self::Leggings => "leggings",
            Self::Sneakers => "sneakers",
            Self::Boots => "boots",
            Self::Heels => "high heels",
            Self::Sandals => "sandals",
            Self::Handbag => "handbag",
            Self::Scarf => "scarf",
            Self::Hat => "hat",
            Self::Belt => "belt",
            Self::Other(label) => label,
        }
    }

    /// Parse a detector or zero-shot label, accepting common synonyms and
    /// prompt-style phrasing ("a photo of a denim jacket").
    pub fn from_label(raw: &str) -> Self {
        let lowered = raw.trim().to_lowercase().replace('_', " ");
        let mut label = lowered.as_str();
        for prefix in ["a photo of ", "an ", "a "] {
            if let Some(rest) = label.strip_prefix(prefix) {
                label = rest;
            }
        }

        match label {
            "t-shirt" | "tshirt" | "t shirt" | "tee" => Self::TShirt,
            "shirt" | "button-down" | "button down shirt" => Self::Shirt,
            "blouse" | "top" => Self::Blouse,
            "sweater" | "jumper" | "pullover" | "knitwear" => Self::Sweater,
            "hoodie" | "sweatshirt" => Self::Hoodie,
            "cardigan" => Self::Cardigan,
            "jacket" | "blazer" => Self::Jacket,
            "denim jacket" | "jean jacket" => Self::DenimJacket,
            "coat" | "overcoat" | "trench coat" | "parka" => Self::Coat,
            "vest" | "gilet" => Self::Vest,
            "dress" => Self::Dress,
            "skirt" => Self::Skirt,
            "jeans" | "denim" => Self::Jeans,
            "trousers" | "pants" | "chinos" => Self::Trousers,
            "shorts" => Self::Shorts,
            "jumpsuit" | "overalls" | "playsuit" => Self::Jumpsuit,
            "suit" => Self::Suit,
            "swimsuit" | "bikini" | "swimwear" => Self::Swimsuit,
            "athletic top" | "sports top" => Self::AthleticTop,
            "leggings" | "athletic leggings" => Self::Leggings,
            "sneakers" | "trainers" | "shoes" => Self::Sneakers,
            "boots" => Self::Boots,
            "high heels" | "heels" | "pumps" => Self::Heels,
            "sandals" => Self::Sandals,
            "handbag" | "bag" | "purse" | "tote" => Self::Handbag,
            "scarf" => Self::Scarf,
            "hat" | "cap" | "beanie" => Self::Hat,
            "belt" => Self::Belt,
            _ => Self::Other(label.to_string()),
        }
    }
}

impl fmt::Display for GarmentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for GarmentCategory {
    fn from(s: String) -> Self {
        Self::from_label(&s)
    }
}

impl From<&str> for GarmentCategory {
    fn from(s: &str) -> Self {
        Self::from_label(s)
    }
}

impl From<GarmentCategory> for String {
    fn from(category: GarmentCategory) -> Self {
        category.label().to_string()
    }
}

/// One detected garment in an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionItem {
    pub category: GarmentCategory,
    /// Detector score in `[0, 1]`
    pub confidence: f32,
    #[serde(rename = "box")]
    pub bbox: BoundingBox,
}

impl DetectionItem {
    pub fn new(category: GarmentCategory, confidence: f32, bbox: BoundingBox) -> Self {
        Self {
            category,
            confidence: clamp_confidence(confidence),
            bbox,
        }
    }
}

/// Fixed-length image embedding.
///
/// **Invariant**: non-empty, every element finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct EmbeddingVector(Vec<f32>);

impl EmbeddingVector {
    pub fn new(values: Vec<f32>) -> ValueResult<Self> {
        if values.is_empty() {
            return Err(ValueError::EmptyEmbedding);
        }
        if let Some(idx) = values.iter().position(|v| !v.is_finite()) {
            return Err(ValueError::NonFiniteEmbedding(idx));
        }
        Ok(Self(values))
    }

    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }

    pub fn l2_norm(&self) -> f32 {
        self.0.iter().map(|v| v * v).sum::<f32>().sqrt()
    }

    /// Return a unit-length copy. A zero vector is returned unchanged.
    pub fn normalized(&self) -> Self {
        let norm = self.l2_norm();
        if norm <= f32::EPSILON {
            return self.clone();
        }
        Self(self.0.iter().map(|v| v / norm).collect())
    }

    /// Cosine similarity in `[-1, 1]`; `None` when dimensions differ or either
    /// vector has zero magnitude.
    pub fn cosine_similarity(&self, other: &Self) -> Option<f32> {
        if self.dimension() != other.dimension() {
            return None;
        }
        let (a, b) = (self.l2_norm(), other.l2_norm());
        if a <= f32::EPSILON || b <= f32::EPSILON {
            return None;
        }
        let dot: f32 = self.0.iter().zip(&other.0).map(|(x, y)| x * y).sum();
        Some((dot / (a * b)).clamp(-1.0, 1.0))
    }
}

impl TryFrom<Vec<f32>> for EmbeddingVector {
    type Error = ValueError;

    fn try_from(values: Vec<f32>) -> ValueResult<Self> {
        Self::new(values)
    }
}

impl From<EmbeddingVector> for Vec<f32> {
    fn from(embedding: EmbeddingVector) -> Self {
        embedding.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_clamps_into_unit_square() {
        let b = BoundingBox::new(0.8, -0.2, 0.5, 1.4);
        assert_eq!(b.x, 0.8);
        assert_eq!(b.y, 0.0);
        assert!((b.w - 0.2).abs() < 1e-6);
        assert_eq!(b.h, 1.0);
    }

    #[test]
    fn test_bbox_from_pixels() {
        let b = BoundingBox::from_pixels(100.0, 50.0, 200.0, 100.0, 400, 200);
        assert_eq!(b, BoundingBox::new(0.25, 0.25, 0.5, 0.5));
        assert!((b.area() - 0.25).abs() < 1e-6);

        let empty = BoundingBox::from_pixels(1.0, 1.0, 1.0, 1.0, 0, 10);
        assert_eq!(empty.area(), 0.0);
    }

    #[test]
    fn test_category_synonyms() {
        assert_eq!(GarmentCategory::from_label("a photo of a denim jacket"), GarmentCategory::DenimJacket);
        assert_eq!(GarmentCategory::from_label("Jumper"), GarmentCategory::Sweater);
        assert_eq!(GarmentCategory::from_label("T_SHIRT"), GarmentCategory::TShirt);
        assert_eq!(
            GarmentCategory::from_label("poncho"),
            GarmentCategory::Other("poncho".to_string())
        );
    }

    #[test]
    fn test_category_serializes_as_label() {
        let json = serde_json::to_string(&GarmentCategory::Heels).expect("serialize");
        assert_eq!(json, r#""high heels""#);
        let parsed: GarmentCategory = serde_json::from_str(r#""pants""#).expect("deserialize");
        assert_eq!(parsed, GarmentCategory::Trousers);
    }

    #[test]
    fn test_embedding_rejects_non_finite() {
        assert_eq!(EmbeddingVector::new(vec![]), Err(ValueError::EmptyEmbedding));
        assert_eq!(
            EmbeddingVector::new(vec![0.1, f32::NAN]),
            Err(ValueError::NonFiniteEmbedding(1))
        );
        assert!(serde_json::from_str::<EmbeddingVector>("[]").is_err());
    }

    #[test]
    fn test_embedding_normalization_and_similarity() {
        let v = EmbeddingVector::new(vec![3.0, 4.0]).expect("valid");
        let n = v.normalized();
        assert!((n.l2_norm() - 1.0).abs() < 1e-6);

        let same = v.cosine_similarity(&n).expect("similarity");
        assert!((same - 1.0).abs() < 1e-6);

        let orthogonal = EmbeddingVector::new(vec![-4.0, 3.0]).expect("valid");
        assert!(v.cosine_similarity(&orthogonal).expect("similarity").abs() < 1e-6);

        let other_dim = EmbeddingVector::new(vec![1.0, 0.0, 0.0]).expect("valid");
        assert_eq!(v.cosine_similarity(&other_dim), None);
    }
}
