//! Table-driven suppression cases loaded from `tests/fixtures/nms_scenarios.json`.

use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use yolodec::{suppress, BoxCorner, Detection};

#[derive(Debug, Deserialize)]
struct DetectionCase {
    /// `[y_min, x_min, y_max, x_max]` in pixels.
    #[serde(rename = "box")]
    bbox: [f64; 4],
    score: f64,
    class_index: usize,
}

#[derive(Debug, Deserialize)]
struct Scenario {
    name: String,
    iou_threshold: f64,
    detections: Vec<DetectionCase>,
    expected_scores: Vec<f64>,
}

fn load_scenarios() -> Vec<Scenario> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("nms_scenarios.json");
    let text = fs::read_to_string(&path).expect("read scenario fixture");
    serde_json::from_str(&text).expect("parse scenario fixture")
}

#[test]
fn nms_scenarios_match_expected_survivors() {
    let scenarios = load_scenarios();
    assert!(!scenarios.is_empty());
    for scenario in scenarios {
        let detections = scenario
            .detections
            .iter()
            .map(|d| Detection {
                bbox: BoxCorner::new(d.bbox[0], d.bbox[1], d.bbox[2], d.bbox[3]),
                score: d.score,
                class_index: d.class_index,
            })
            .collect();
        let batch = suppress(detections, scenario.iou_threshold);
        let scores: Vec<f64> = batch.iter().map(|d| d.score).collect();
        assert_eq!(scores, scenario.expected_scores, "{}", scenario.name);
    }
}
