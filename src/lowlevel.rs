//! Low-level building blocks for custom decode pipelines.
//!
//! These expose the individual stages behind [`crate::Detector`]: activation
//! kernels, corner conversion, score filtering, IOU, and suppression. Most
//! users should prefer `Detector::detect`.

pub use crate::candidate::filter::{Candidate, ScoreFilter};
pub use crate::candidate::iou::{iou, iou_many};
pub use crate::candidate::nms::suppress;
pub use crate::decode::boxes::{corners_for_anchor, decode_corners};
pub use crate::decode::ActivationDecoder;
pub use crate::geometry::GridTables;
pub use crate::kernel::scalar::ScalarActivation;
#[cfg(feature = "simd")]
pub use crate::kernel::simd::SimdActivation;
pub use crate::kernel::Activation;
pub use crate::transform::space_to_depth::{SpaceToDepth, SUB_PIXEL_OFFSETS};
