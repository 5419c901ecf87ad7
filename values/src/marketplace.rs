//! Request/response shapes for the garment, visual-search and discovery endpoints.
//!
//! The client only encodes and decodes these; no marketplace logic lives here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::results::MergedAttributes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GarmentCondition {
    New,
    Excellent,
    Good,
    Fair,
}

impl GarmentCondition {
    /// Map an A-F condition grade onto the listing condition scale.
    pub fn from_grade(grade: &str) -> Option<Self> {
        match grade.trim().to_ascii_uppercase().as_str() {
            "A" => Some(Self::New),
            "B" => Some(Self::Excellent),
            "C" => Some(Self::Good),
            "D" | "F" => Some(Self::Fair),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeType {
    Buy,
    Sell,
    Trade,
    Gift,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GarmentStatus {
    Active,
    Reserved,
    Sold,
    Hidden,
}

/// Style classification attributes attached to a listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleAttributes {
    pub colors: Vec<String>,
    pub patterns: Vec<String>,
    pub style_tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,
}

/// Body of the JSON `garment` part sent to the garment-creation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GarmentDraft {
    pub title: String,
    pub category: String,
    pub condition: GarmentCondition,
    pub size: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub story: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provenance: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_attributes: Option<StyleAttributes>,
    pub exchange_type: ExchangeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl GarmentDraft {
    /// Pre-fill a listing from fused attributes (the "Smart Create" flow).
    ///
    /// `grade` is the remote A-F condition grade when one is known; unknown
    /// grades and missing sizes fall back to `Good` and `"One Size"`.
    pub fn from_attributes(
        title: impl Into<String>,
        attributes: &MergedAttributes,
        grade: Option<&str>,
        exchange_type: ExchangeType,
    ) -> Self {
        let style_tags = if attributes.style == crate::UNKNOWN_LABEL {
            Vec::new()
        } else {
            vec![attributes.style.clone()]
        };

        Self {
            title: title.into(),
            category: attributes.category.clone(),
            condition: grade
                .and_then(GarmentCondition::from_grade)
                .unwrap_or(GarmentCondition::Good),
            size: attributes.size.clone().unwrap_or_else(|| "One Size".to_string()),
            brand: attributes.brand.clone(),
            story: None,
            provenance: (!attributes.materials.is_empty())
                .then(|| serde_json::json!({ "materials": attributes.materials })),
            style_attributes: Some(StyleAttributes {
                colors: attributes.colors.clone(),
                style_tags,
                ..Default::default()
            }),
            exchange_type,
            price: None,
        }
    }
}

/// Garment as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GarmentRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub category: String,
    pub condition: String,
    pub size: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub exchange_type: Option<String>,
    #[serde(default, deserialize_with = "optional_decimal")]
    pub price: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub view_count: u32,
    #[serde(default)]
    pub save_count: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn optional_decimal<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Decimal {
        Number(f64),
        Text(String),
    }

    match Option::<Decimal>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Decimal::Number(n)) => Ok(Some(n)),
        Some(Decimal::Text(s)) => s.trim().parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// One hit from the image-similarity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualSearchHit {
    pub garment_id: String,
    pub score: f32,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "optional_decimal")]
    pub price: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualSearchResponse {
    pub results: Vec<VisualSearchHit>,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageEmbeddingResponse {
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub dimension: usize,
    #[serde(default)]
    pub model: Option<String>,
}

/// Structured discovery query (JSON body of `POST discovery`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<GarmentCondition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange_type: Option<ExchangeType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_sustainability_score: Option<f32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub style_tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryResult {
    pub garment: GarmentRecord,
    pub similarity_score: f32,
    #[serde(default)]
    pub match_reasons: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryResponse {
    pub results: Vec<DiscoveryResult>,
    pub query_embedding: Option<Vec<f32>>,
    pub total: usize,
    pub page: u32,
    pub page_size: u32,
    pub pages: u32,
}
