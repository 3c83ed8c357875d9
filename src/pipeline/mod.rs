//! Per-frame detection pipeline.
//!
//! [`Detector`] owns the validated configuration and the precomputed grid
//! tables. A frame runs activation decode, corner conversion, score
//! filtering, rescaling to pixels, and non-maximum suppression, in that
//! order, without touching any state shared with other frames.

pub mod gate;

pub use crate::candidate::detection::{Detection, DetectionBatch, NormalizedRect};

use crate::candidate::filter::ScoreFilter;
use crate::candidate::nms::suppress;
use crate::decode::boxes::{decode_corners, ImageSize};
use crate::decode::ActivationDecoder;
use crate::geometry::{AnchorSpec, GridGeometry, COCO_LABELS};
use crate::tensor::TensorView;
use crate::trace::{trace_event, trace_span, FrameTimer};
use crate::util::{YoloDecError, YoloDecResult};
use gate::FrameGate;

/// Detector configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectorConfig {
    /// Output grid and channel layout.
    pub geometry: GridGeometry,
    /// Anchor sizes in grid-cell units, one per anchor.
    pub anchors: AnchorSpec,
    /// Best class score must be strictly greater than this to survive.
    pub confidence_threshold: f64,
    /// Boxes overlapping a kept box strictly above this IOU are suppressed.
    pub iou_threshold: f64,
    /// Input image size used to rescale boxes to pixels.
    pub image_size: ImageSize,
    /// Class names, indexed by class.
    pub labels: Vec<String>,
    /// Decode anchor blocks in parallel (requires the `rayon` feature).
    pub parallel: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            geometry: GridGeometry::default(),
            anchors: AnchorSpec::default(),
            confidence_threshold: 0.3,
            iou_threshold: 0.5,
            image_size: ImageSize::new(1024, 720),
            labels: COCO_LABELS.iter().map(|s| s.to_string()).collect(),
            parallel: false,
        }
    }
}

impl DetectorConfig {
    /// Checks the configuration for internal consistency.
    pub fn validate(&self) -> YoloDecResult<()> {
        self.geometry.validate()?;
        self.anchors.validate(self.geometry.num_anchors)?;
        check_unit_interval("confidence_threshold", self.confidence_threshold)?;
        check_unit_interval("iou_threshold", self.iou_threshold)?;
        if self.labels.len() != self.geometry.num_classes {
            return Err(YoloDecError::LabelCountMismatch {
                expected: self.geometry.num_classes,
                got: self.labels.len(),
            });
        }
        if self.image_size.width == 0 || self.image_size.height == 0 {
            return Err(YoloDecError::InvalidConfig {
                reason: "image size must be non-zero",
            });
        }
        Ok(())
    }
}

fn check_unit_interval(name: &'static str, value: f64) -> YoloDecResult<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(YoloDecError::ThresholdOutOfRange { name, value });
    }
    Ok(())
}

/// Detection with its label and image-relative rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabeledDetection<'a> {
    /// Class name.
    pub label: &'a str,
    /// Class index of `label`.
    pub class_index: usize,
    /// Detection score.
    pub score: f64,
    /// Top-left origin rectangle normalized by the image size.
    pub rect: NormalizedRect,
}

/// Result of offering a frame to [`Detector::process_frame`].
#[derive(Clone, Debug, PartialEq)]
pub enum FrameOutcome {
    /// The frame was admitted and decoded.
    Processed(DetectionBatch),
    /// Another frame was in flight; this one was discarded.
    Dropped,
}

/// Immutable, shareable YOLOv2 output decoder.
#[derive(Clone, Debug)]
pub struct Detector {
    config: DetectorConfig,
    decoder: ActivationDecoder,
    filter: ScoreFilter,
}

impl Detector {
    /// Validates `config` and precomputes the grid tables.
    pub fn new(config: DetectorConfig) -> YoloDecResult<Self> {
        config.validate()?;
        let decoder = ActivationDecoder::new(config.geometry, config.anchors.clone())?
            .with_parallel(config.parallel);
        let filter = ScoreFilter::new(config.confidence_threshold)?;
        Ok(Self {
            config,
            decoder,
            filter,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Returns the activation decoder.
    pub fn decoder(&self) -> &ActivationDecoder {
        &self.decoder
    }

    /// Decodes one raw network output into post-NMS detections.
    ///
    /// An empty batch means nothing cleared the confidence threshold.
    pub fn detect(&self, raw: TensorView<'_>) -> YoloDecResult<DetectionBatch> {
        let _span = trace_span!("detect_frame").entered();
        let timer = FrameTimer::start();

        let geometry = self.decoder.geometry();
        let decoded = self.decoder.decode(raw)?;
        let boxes = decode_corners(decoded.view(), geometry)?;
        let candidates = self.filter.filter(decoded.view(), &boxes, geometry)?;

        let image = self.config.image_size;
        let detections = candidates
            .into_iter()
            .map(|c| Detection {
                bbox: c.bbox.rescale(image),
                score: c.score,
                class_index: c.class_index,
            })
            .collect();
        let batch = suppress(detections, self.config.iou_threshold);

        trace_event!("frame_elapsed", micros = timer.elapsed_micros());
        Ok(batch)
    }

    /// Like [`Detector::detect`], attaching labels and normalized rectangles.
    pub fn detect_labeled(
        &self,
        raw: TensorView<'_>,
    ) -> YoloDecResult<Vec<LabeledDetection<'_>>> {
        let batch = self.detect(raw)?;
        Ok(batch.iter().map(|d| self.label(d)).collect())
    }

    /// Attaches the label and normalized rectangle to `detection`.
    pub fn label(&self, detection: &Detection) -> LabeledDetection<'_> {
        LabeledDetection {
            label: self
                .config
                .labels
                .get(detection.class_index)
                .map_or("", String::as_str),
            class_index: detection.class_index,
            score: detection.score,
            rect: detection.normalized_rect(self.config.image_size),
        }
    }

    /// Decodes `raw` if `gate` admits it, otherwise drops the frame.
    ///
    /// The permit is released when decoding finishes, including on error.
    pub fn process_frame(
        &self,
        gate: &FrameGate,
        raw: TensorView<'_>,
    ) -> YoloDecResult<FrameOutcome> {
        let Some(_permit) = gate.try_admit() else {
            return Ok(FrameOutcome::Dropped);
        };
        self.detect(raw).map(FrameOutcome::Processed)
    }
}
