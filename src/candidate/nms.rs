//! Greedy IOU-based non-maximum suppression.

use crate::candidate::detection::{Detection, DetectionBatch};
use crate::candidate::iou::iou_many_into;
use crate::decode::boxes::{BoxCorner, Pixels};
use crate::trace::{trace_event, trace_span};

/// Sorts detections by descending score, ties kept in input order.
pub(crate) fn sort_detections_desc(detections: &mut [Detection]) {
    // `sort_by` is stable, so equal scores stay in ascending input order.
    detections.sort_by(|a, b| b.score.total_cmp(&a.score));
}

/// Applies non-maximum suppression.
///
/// Detections are stably sorted by descending score. Walking that order, each
/// still-kept box suppresses every later box whose IOU with it is strictly
/// greater than `iou_threshold`. The survivors keep the sorted order.
pub fn suppress(mut detections: Vec<Detection>, iou_threshold: f64) -> DetectionBatch {
    let _span = trace_span!("nms", input = detections.len()).entered();

    sort_detections_desc(&mut detections);
    let boxes: Vec<BoxCorner<Pixels>> = detections.iter().map(|d| d.bbox).collect();

    let mut kept = vec![true; detections.len()];
    let mut ious = Vec::with_capacity(detections.len());
    for i in 0..boxes.len() {
        if !kept[i] {
            continue;
        }
        iou_many_into(&boxes[i], &boxes[i + 1..], &mut ious);
        for (offset, &overlap) in ious.iter().enumerate() {
            if overlap > iou_threshold {
                kept[i + 1 + offset] = false;
            }
        }
    }

    let out: Vec<Detection> = detections
        .into_iter()
        .zip(kept)
        .filter_map(|(det, keep)| keep.then_some(det))
        .collect();

    trace_event!("detections", count = out.len());
    DetectionBatch::from_sorted(out)
}
