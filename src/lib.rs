//! YoloDec is a CPU-first decoder for YOLOv2-style detection tensors.
//!
//! A raw `(num_anchors * (5 + num_classes), H, W)` network output is turned
//! into a filtered, non-overlapping set of labelled boxes: per-channel-group
//! activations, corner conversion, score thresholding, rescaling to image
//! pixels, and IOU-based non-maximum suppression. The space-to-depth layout
//! transform used inside the network is provided as well.
//!
//! Optional parallelism over anchors is available via the `rayon` feature and
//! vectorized activations via the `simd` feature.

mod candidate;
pub mod decode;
pub mod geometry;
pub mod kernel;
pub mod lowlevel;
pub mod pipeline;
pub mod tensor;
mod trace;
pub mod transform;
pub mod util;

pub use candidate::filter::{Candidate, ScoreFilter};
pub use candidate::nms::suppress;
pub use decode::boxes::{decode_corners, BoxCorner, ImageSize, Normalized, Pixels};
pub use decode::ActivationDecoder;
pub use geometry::{AnchorSpec, GridGeometry, GridTables, COCO_LABELS, YOLOV2_ANCHORS};
pub use pipeline::gate::{FrameGate, FramePermit, FrameStats};
pub use pipeline::{
    Detection, DetectionBatch, Detector, DetectorConfig, FrameOutcome, LabeledDetection,
    NormalizedRect,
};
pub use tensor::{Tensor, TensorShape, TensorView};
pub use transform::space_to_depth::SpaceToDepth;
pub use util::{ErrorKind, YoloDecError, YoloDecResult};

pub use candidate::iou::{iou, iou_many};
