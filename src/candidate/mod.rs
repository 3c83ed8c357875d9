//! Candidate selection and pruning.
//!
//! Score thresholding over the dense anchor grid, IOU evaluation, and greedy
//! non-maximum suppression.

pub(crate) mod detection;
pub(crate) mod filter;
pub(crate) mod iou;
pub(crate) mod nms;
