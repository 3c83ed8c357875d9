//! Final detection records.

use crate::decode::boxes::{BoxCorner, ImageSize, Pixels};

/// One detected object in absolute image pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detection {
    /// Corner box in pixels.
    pub bbox: BoxCorner<Pixels>,
    /// `confidence * class probability`, in `(0, 1]`.
    pub score: f64,
    /// Index into the label vocabulary.
    pub class_index: usize,
}

/// Top-left origin rectangle normalized by the image size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NormalizedRect {
    /// Left edge as a fraction of the image width.
    pub x: f64,
    /// Top edge as a fraction of the image height.
    pub y: f64,
    /// Width as a fraction of the image width.
    pub width: f64,
    /// Height as a fraction of the image height.
    pub height: f64,
}

impl Detection {
    /// Returns the box as `(x, y, width, height)` relative to `image`.
    pub fn normalized_rect(&self, image: ImageSize) -> NormalizedRect {
        let w = f64::from(image.width);
        let h = f64::from(image.height);
        NormalizedRect {
            x: self.bbox.x_min / w,
            y: self.bbox.y_min / h,
            width: self.bbox.width() / w,
            height: self.bbox.height() / h,
        }
    }
}

/// Post-NMS detections, descending by score, no pair overlapping above the
/// IOU threshold they were suppressed with.
///
/// Only [`crate::suppress`] builds a batch; an empty batch is a normal result.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DetectionBatch {
    detections: Vec<Detection>,
}

impl DetectionBatch {
    /// `detections` must be descending under [`f64::total_cmp`], which also
    /// places positive NaN scores first.
    pub(crate) fn from_sorted(detections: Vec<Detection>) -> Self {
        debug_assert!(detections
            .windows(2)
            .all(|w| w[0].score.total_cmp(&w[1].score).is_ge()));
        Self { detections }
    }

    /// Returns the number of detections.
    pub fn len(&self) -> usize {
        self.detections.len()
    }

    /// Returns `true` if nothing was detected.
    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    /// Returns the detections as a slice.
    pub fn as_slice(&self) -> &[Detection] {
        &self.detections
    }

    /// Iterates detections in descending score order.
    pub fn iter(&self) -> std::slice::Iter<'_, Detection> {
        self.detections.iter()
    }

    /// Consumes the batch, returning its detections.
    pub fn into_vec(self) -> Vec<Detection> {
        self.detections
    }
}

impl IntoIterator for DetectionBatch {
    type Item = Detection;
    type IntoIter = std::vec::IntoIter<Detection>;

    fn into_iter(self) -> Self::IntoIter {
        self.detections.into_iter()
    }
}

impl<'a> IntoIterator for &'a DetectionBatch {
    type Item = &'a Detection;
    type IntoIter = std::slice::Iter<'a, Detection>;

    fn into_iter(self) -> Self::IntoIter {
        self.detections.iter()
    }
}
