//! Deep-analysis payloads returned by the remote `analyze` endpoints.
//!
//! Shapes follow the server's JSON exactly. Optional extras default instead of
//! failing so older or trimmed responses still decode.

use serde::{Deserialize, Deserializer, Serialize};

/// Single attribute prediction with confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributePrediction {
    pub label: String,
    pub confidence: f32,
}

impl AttributePrediction {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// Color extracted from image pixels (k-means cluster mapped to a palette name).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedColor {
    pub name: String,
    pub hex: String,
    pub rgb: [u8; 3],
    pub percentage: f32,
    #[serde(default)]
    pub is_dominant: bool,
}

/// Condition grade A-F with its human-readable label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionGrade {
    pub grade: String,
    pub label: String,
    pub confidence: f32,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sell_multiplier: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    #[serde(default)]
    pub defects_detected: Vec<serde_json::Value>,
}

/// Estimated resale price range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EstimatedPrice {
    #[serde(deserialize_with = "decimal_from_json")]
    pub min: f64,
    #[serde(deserialize_with = "decimal_from_json")]
    pub max: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Qualitative confidence ("low", "medium", "high")
    #[serde(default)]
    pub confidence: String,
}

fn default_currency() -> String {
    "AUD".to_string()
}

/// The server serializes `Decimal` prices as JSON strings; accept numbers too.
fn decimal_from_json<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Decimal {
        Number(f64),
        Text(String),
    }

    match Decimal::deserialize(deserializer)? {
        Decimal::Number(n) => Ok(n),
        Decimal::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Full garment analysis response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeepAnalysisResult {
    pub category: Vec<AttributePrediction>,
    pub color: Vec<AttributePrediction>,
    pub material: Vec<AttributePrediction>,
    pub condition: Vec<AttributePrediction>,
    pub style: Vec<AttributePrediction>,
    pub detected_colors: Vec<ExtractedColor>,
    pub condition_grade: ConditionGrade,
    pub embedding: Vec<f32>,
    pub estimated_price: Option<EstimatedPrice>,
    /// 0-100
    pub sustainability_score: u8,
    pub suggestions: Vec<String>,
}

impl DeepAnalysisResult {
    /// Highest-ranked category prediction. The server already sorts by
    /// confidence, so this is the first entry.
    pub fn top_category(&self) -> Option<&AttributePrediction> {
        self.category.first()
    }

    pub fn top_style(&self) -> Option<&AttributePrediction> {
        self.style.first()
    }

    pub fn color_labels(&self) -> Vec<String> {
        self.color.iter().map(|p| p.label.clone()).collect()
    }

    pub fn material_labels(&self) -> Vec<String> {
        self.material.iter().map(|p| p.label.clone()).collect()
    }
}

/// Multi-photo analysis: per-image classifications plus a vote-weighted aggregate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchAnalysisResult {
    pub individual_results: Vec<serde_json::Value>,
    pub aggregated: BatchAggregate,
    pub image_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchAggregate {
    pub category: Vec<AttributePrediction>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_accepts_string_and_number() {
        let from_str: EstimatedPrice =
            serde_json::from_str(r#"{"min": "59.5", "max": "110.50", "currency": "AUD", "confidence": "high"}"#)
                .expect("string decimals");
        assert_eq!(from_str.min, 59.5);
        assert_eq!(from_str.max, 110.5);

        let from_num: EstimatedPrice =
            serde_json::from_str(r#"{"min": 10, "max": 20.25, "confidence": "medium"}"#).expect("numbers");
        assert_eq!(from_num.max, 20.25);
        assert_eq!(from_num.currency, "AUD");
    }

    #[test]
    fn test_top_predictions() {
        let result = DeepAnalysisResult {
            category: vec![
                AttributePrediction::new("denim jacket", 0.9),
                AttributePrediction::new("jacket", 0.07),
            ],
            ..Default::default()
        };
        assert_eq!(result.top_category().map(|p| p.label.as_str()), Some("denim jacket"));
        assert!(result.top_style().is_none());
    }
}
