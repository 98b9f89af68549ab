use sruja_quality::config::parse_config;
use sruja_quality::{DiagramSnapshot, FontConfig, QualityEvaluator};
use wasm_bindgen::prelude::*;

fn js_error(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn evaluate_json(snapshot_json: &str, config_json: Option<&str>) -> Result<String, String> {
    let config = match config_json {
        Some(raw) => parse_config(raw).map_err(|e| format!("{e:#}"))?,
        None => Default::default(),
    };
    let snapshot = DiagramSnapshot::from_json(snapshot_json).map_err(|e| e.to_string())?;
    let evaluator = QualityEvaluator::try_new(config.quality).map_err(|e| e.to_string())?;
    evaluator
        .evaluate_snapshot(&snapshot)
        .to_json()
        .map_err(|e| e.to_string())
}

fn measure_json(text: &str, font_json: Option<&str>) -> Result<String, String> {
    let font = match font_json {
        Some(raw) => serde_json::from_str::<FontConfig>(raw).map_err(|e| e.to_string())?,
        None => FontConfig::default(),
    };
    serde_json::to_string(&sruja_quality::measure_text(text, &font)).map_err(|e| e.to_string())
}

fn node_size_json(
    title: &str,
    technology: Option<&str>,
    description: Option<&str>,
    kind: &str,
) -> Result<String, String> {
    let size = sruja_quality::calculate_node_size(title, technology, description, kind);
    serde_json::to_string(&size).map_err(|e| e.to_string())
}

/// Score a `{nodes, edges, viewport}` snapshot and return the report as JSON.
#[wasm_bindgen]
pub fn evaluate_quality(
    snapshot_json: &str,
    config_json: Option<String>,
) -> Result<String, JsValue> {
    evaluate_json(snapshot_json, config_json.as_deref()).map_err(js_error)
}

#[wasm_bindgen]
pub fn measure_text(text: &str, font_json: Option<String>) -> Result<String, JsValue> {
    measure_json(text, font_json.as_deref()).map_err(js_error)
}

#[wasm_bindgen]
pub fn calculate_node_size(
    title: &str,
    technology: Option<String>,
    description: Option<String>,
    kind: &str,
) -> Result<String, JsValue> {
    node_size_json(title, technology.as_deref(), description.as_deref(), kind).map_err(js_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluates_snapshot_json() {
        let snapshot = r#"{
            "nodes": [
                {"id": "a", "position": {"x": 0, "y": 0}, "size": {"width": 100, "height": 100}},
                {"id": "b", "position": {"x": 0, "y": 0}, "size": {"width": 100, "height": 100}}
            ],
            "edges": [],
            "viewport": {"width": 1920, "height": 1080}
        }"#;
        let report: serde_json::Value =
            serde_json::from_str(&evaluate_json(snapshot, None).unwrap()).unwrap();
        assert_eq!(report["overlaps"]["count"], 1);
    }

    #[test]
    fn rejects_bad_weights() {
        let err = evaluate_json("{}", Some("{ weights: { overlap: 0.9 } }")).unwrap_err();
        assert!(err.contains("sum to 1.0"), "{err}");
    }

    #[test]
    fn sizes_nodes() {
        let json = node_size_json("Payments", Some("Rust"), None, "container").unwrap();
        let size: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(size["width"].as_f64().unwrap() >= 180.0);
        assert!(size["height"].as_f64().unwrap() >= 100.0);
    }

    #[test]
    fn measures_with_fast_metrics() {
        let json = measure_json("hello", Some(r#"{"size": 14, "fastMetrics": true}"#)).unwrap();
        let size: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(size["width"].as_f64().unwrap() > 0.0);
    }
}
