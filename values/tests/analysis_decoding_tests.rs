//! Decoding tests against payloads shaped like the live analysis service.

use modaics_values::{
    DeepAnalysisResult, DiscoveryQuery, DiscoveryResponse, ExchangeType, GarmentCondition,
    GarmentDraft, MergedAttributes, UNKNOWN_LABEL,
};

const ANALYSIS_JSON: &str = r##"{
    "category": [{"label": "denim jacket", "confidence": 0.91}, {"label": "jacket", "confidence": 0.06}],
    "color": [{"label": "navy blue", "confidence": 0.7}, {"label": "white", "confidence": 0.2}],
    "material": [{"label": "denim", "confidence": 0.8}],
    "condition": [{"label": "gently used clothing in good condition", "confidence": 0.6}],
    "style": [{"label": "vintage retro style", "confidence": 0.5}],
    "detected_colors": [
        {"name": "Denim Blue", "hex": "#1560bd", "rgb": [21, 96, 189], "percentage": 62.5, "is_dominant": true}
    ],
    "condition_grade": {
        "grade": "B",
        "label": "Excellent",
        "confidence": 0.74,
        "description": "Minimal signs of wear",
        "sell_multiplier": 0.75,
        "recommendation": "List at a premium",
        "defects_detected": []
    },
    "embedding": [0.1, 0.2, 0.3],
    "estimated_price": {"min": "58.8", "max": "109.2", "currency": "AUD", "confidence": "medium"},
    "sustainability_score": 60,
    "suggestions": ["Highlight the excellent condition in your title for faster sales"],
    "story": "ignored by the client"
}"##;

#[test]
fn test_decode_full_analysis_response() {
    let result: DeepAnalysisResult = serde_json::from_str(ANALYSIS_JSON).expect("decode analysis");

    assert_eq!(result.top_category().map(|p| p.label.as_str()), Some("denim jacket"));
    assert_eq!(result.color_labels(), vec!["navy blue", "white"]);
    assert_eq!(result.material_labels(), vec!["denim"]);
    assert_eq!(result.condition_grade.grade, "B");
    assert_eq!(result.condition_grade.sell_multiplier, Some(0.75));
    assert_eq!(result.detected_colors[0].rgb, [21, 96, 189]);
    assert!(result.detected_colors[0].is_dominant);
    assert_eq!(result.embedding.len(), 3);
    assert_eq!(result.sustainability_score, 60);

    let price = result.estimated_price.expect("price present");
    assert_eq!(price.min, 58.8);
    assert_eq!(price.confidence, "medium");
}

#[test]
fn test_decode_trimmed_analysis_response() {
    // Older servers omit the enrichment fields entirely
    let result: DeepAnalysisResult =
        serde_json::from_str(r#"{"category": [{"label": "dress", "confidence": 0.4}]}"#).expect("decode");

    assert!(result.style.is_empty());
    assert!(result.estimated_price.is_none());
    assert_eq!(result.condition_grade.label, "");
}

#[test]
fn test_discovery_query_omits_unset_fields() {
    let query = DiscoveryQuery {
        text: Some("vintage denim jacket with a worn-in feel".to_string()),
        condition: Some(GarmentCondition::Good),
        ..Default::default()
    };

    let json = serde_json::to_value(&query).expect("encode");
    assert_eq!(
        json,
        serde_json::json!({
            "text": "vintage denim jacket with a worn-in feel",
            "condition": "good"
        })
    );
}

#[test]
fn test_discovery_response_decodes_string_prices() {
    let json = r#"{
        "results": [{
            "garment": {
                "id": "0b6f3a5e-9d0c-4a55-9a53-0d2c7e7b9a11",
                "owner_id": "5f1f7d0a-2f59-4c3f-8d0e-6f4c2e1b2a33",
                "title": "Levi's trucker",
                "category": "denim jacket",
                "condition": "good",
                "size": "M",
                "price": "45.00",
                "created_at": "2026-03-01T10:00:00Z"
            },
            "similarity_score": 0.82,
            "match_reasons": ["Similar visual style"]
        }],
        "total": 1, "page": 1, "page_size": 20, "pages": 1
    }"#;

    let response: DiscoveryResponse = serde_json::from_str(json).expect("decode");
    assert_eq!(response.results.len(), 1);
    assert_eq!(response.results[0].garment.price, Some(45.0));
    assert!(response.query_embedding.is_none());
}

#[test]
fn test_draft_from_merged_attributes() {
    let attributes = MergedAttributes {
        category: "denim jacket".to_string(),
        colors: vec!["navy blue".to_string()],
        materials: vec!["denim".to_string()],
        condition: "Excellent".to_string(),
        style: UNKNOWN_LABEL.to_string(),
        size: None,
        brand: Some("Levi's".to_string()),
    };

    let draft = GarmentDraft::from_attributes("Trucker jacket", &attributes, Some("B"), ExchangeType::Sell);

    assert_eq!(draft.condition, GarmentCondition::Excellent);
    assert_eq!(draft.size, "One Size");
    assert_eq!(draft.brand.as_deref(), Some("Levi's"));
    let style = draft.style_attributes.expect("style attributes");
    assert!(style.style_tags.is_empty());
    assert_eq!(style.colors, vec!["navy blue"]);
}
