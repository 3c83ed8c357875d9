//! Intersection-over-union for corner boxes.

use crate::decode::boxes::BoxCorner;

/// Returns `intersection / union` of two boxes in the same unit.
///
/// The result is in `[0, 1]`; disjoint boxes and a zero union both give `0`.
pub fn iou<U>(a: &BoxCorner<U>, b: &BoxCorner<U>) -> f64 {
    let inter_h = (a.y_max.min(b.y_max) - a.y_min.max(b.y_min)).max(0.0);
    let inter_w = (a.x_max.min(b.x_max) - a.x_min.max(b.x_min)).max(0.0);
    let intersect = inter_h * inter_w;
    let union = a.area() + b.area() - intersect;
    if union <= 0.0 {
        return 0.0;
    }
    intersect / union
}

/// Evaluates `iou(a, b)` for every `b` in `others`.
pub fn iou_many<U>(a: &BoxCorner<U>, others: &[BoxCorner<U>]) -> Vec<f64> {
    let mut out = Vec::with_capacity(others.len());
    iou_many_into(a, others, &mut out);
    out
}

/// Like [`iou_many`], reusing `out` as the result buffer.
pub(crate) fn iou_many_into<U>(a: &BoxCorner<U>, others: &[BoxCorner<U>], out: &mut Vec<f64>) {
    out.clear();
    out.extend(others.iter().map(|b| iou(a, b)));
}
