use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use yolodec::{
    AnchorSpec, Detection, Detector, DetectorConfig, GridGeometry, ImageSize, TensorView,
};

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "YoloDec CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DetectorConfigJson {
    grid_height: usize,
    grid_width: usize,
    num_anchors: usize,
    num_classes: usize,
    anchors: Vec<[f32; 2]>,
    confidence_threshold: f64,
    iou_threshold: f64,
    image_width: u32,
    image_height: u32,
    labels: Vec<String>,
    parallel: bool,
}

impl Default for DetectorConfigJson {
    fn default() -> Self {
        let cfg = DetectorConfig::default();
        Self {
            grid_height: cfg.geometry.grid_height,
            grid_width: cfg.geometry.grid_width,
            num_anchors: cfg.geometry.num_anchors,
            num_classes: cfg.geometry.num_classes,
            anchors: cfg.anchors.as_slice().iter().map(|&(w, h)| [w, h]).collect(),
            confidence_threshold: cfg.confidence_threshold,
            iou_threshold: cfg.iou_threshold,
            image_width: cfg.image_size.width,
            image_height: cfg.image_size.height,
            labels: cfg.labels,
            parallel: cfg.parallel,
        }
    }
}

impl From<DetectorConfigJson> for DetectorConfig {
    fn from(value: DetectorConfigJson) -> Self {
        Self {
            geometry: GridGeometry::new(
                value.grid_height,
                value.grid_width,
                value.num_anchors,
                value.num_classes,
            ),
            anchors: AnchorSpec::new(value.anchors.into_iter().map(|[w, h]| (w, h)).collect()),
            confidence_threshold: value.confidence_threshold,
            iou_threshold: value.iou_threshold,
            image_size: ImageSize::new(value.image_width, value.image_height),
            labels: value.labels,
            parallel: value.parallel,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    tensor_path: String,
    output_path: Option<String>,
    detector: DetectorConfigJson,
}

#[derive(Debug, Serialize)]
struct RectRecord {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

#[derive(Debug, Serialize)]
struct BoxRecord {
    y_min: f64,
    x_min: f64,
    y_max: f64,
    x_max: f64,
}

#[derive(Debug, Serialize)]
struct DetectionRecord {
    label: String,
    class_index: usize,
    score: f64,
    rect: RectRecord,
    #[serde(rename = "box")]
    bbox: BoxRecord,
}

impl DetectionRecord {
    fn new(detector: &Detector, detection: &Detection) -> Self {
        let labeled = detector.label(detection);
        Self {
            label: labeled.label.to_string(),
            class_index: labeled.class_index,
            score: labeled.score,
            rect: RectRecord {
                x: labeled.rect.x,
                y: labeled.rect.y,
                width: labeled.rect.width,
                height: labeled.rect.height,
            },
            bbox: BoxRecord {
                y_min: detection.bbox.y_min,
                x_min: detection.bbox.x_min,
                y_max: detection.bbox.y_max,
                x_max: detection.bbox.x_max,
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    detections: Vec<DetectionRecord>,
}

/// Reads a raw little-endian `f32` tensor, checking its size against `expected_len`.
fn load_raw_tensor(
    path: &str,
    expected_len: usize,
) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
    let bytes = fs::read(path)?;
    let needed = expected_len * std::mem::size_of::<f32>();
    if bytes.len() != needed {
        return Err(format!(
            "tensor file {path} holds {} bytes, geometry needs {needed}",
            bytes.len()
        )
        .into());
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("yolodec=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.tensor_path.is_empty() {
        return Err("tensor_path must be set in the config".into());
    }

    let detector = Detector::new(config.detector.into())?;
    let shape = detector.config().geometry.raw_shape();
    let data = load_raw_tensor(&config.tensor_path, shape.checked_len()?)?;
    let raw = TensorView::from_slice(&data, shape)?;

    let batch = detector.detect(raw)?;
    tracing::info!(detections = batch.len(), "frame decoded");

    let detections = batch
        .iter()
        .map(|d| DetectionRecord::new(&detector, d))
        .collect();
    let output = Output { detections };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
