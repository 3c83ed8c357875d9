//! Per-anchor-cell class scoring and thresholding.
//!
//! For each anchor-cell the class score is `confidence * class_prob[k]`; the
//! best class wins (lowest index on exact ties) and the cell survives when its
//! best score is strictly greater than the threshold. Survivors are compacted
//! in ascending flattened-index order.

use crate::decode::boxes::{BoxCorner, Normalized};
use crate::geometry::{GridGeometry, CLASS_START, CONFIDENCE};
use crate::tensor::TensorView;
use crate::trace::{trace_event, trace_span};
use crate::util::{YoloDecError, YoloDecResult};

/// Anchor-cell that passed the score threshold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    /// Flattened `anchor * H * W + row * W + col` index.
    pub index: usize,
    /// Best class score.
    pub score: f64,
    /// Class achieving `score`.
    pub class_index: usize,
    /// Normalized corner box of the anchor-cell.
    pub bbox: BoxCorner<Normalized>,
}

/// Confidence threshold over best class scores.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreFilter {
    threshold: f64,
}

impl Default for ScoreFilter {
    fn default() -> Self {
        Self { threshold: 0.3 }
    }
}

impl ScoreFilter {
    /// Creates a filter, rejecting thresholds outside `[0, 1]`.
    pub fn new(threshold: f64) -> YoloDecResult<Self> {
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(YoloDecError::ThresholdOutOfRange {
                name: "confidence_threshold",
                value: threshold,
            });
        }
        Ok(Self { threshold })
    }

    /// Returns the threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Selects anchor-cells whose best class score exceeds the threshold.
    ///
    /// `decoded` is the activation decoder output and `boxes` the matching
    /// corner boxes from [`crate::decode_corners`].
    pub fn filter(
        &self,
        decoded: TensorView<'_>,
        boxes: &[BoxCorner<Normalized>],
        geometry: &GridGeometry,
    ) -> YoloDecResult<Vec<Candidate>> {
        decoded.shape().ensure_eq(geometry.raw_shape())?;
        if boxes.len() != geometry.anchor_cells() {
            return Err(YoloDecError::BoxCountMismatch {
                expected: geometry.anchor_cells(),
                got: boxes.len(),
            });
        }

        let _span = trace_span!("score_filter", threshold = self.threshold).entered();

        let cells = geometry.cells();
        let mut best_score = vec![0.0f64; cells];
        let mut best_class = vec![0usize; cells];
        let mut out = Vec::new();

        for anchor in 0..geometry.num_anchors {
            let block = decoded.anchor_block(anchor, geometry)?;
            best_class_per_cell(
                block,
                geometry.num_classes,
                &mut best_score,
                &mut best_class,
            );

            let base = anchor * cells;
            let best = best_score.iter().zip(&best_class).enumerate();
            for (cell, (&score, &class_index)) in best {
                if score > self.threshold {
                    let index = base + cell;
                    out.push(Candidate {
                        index,
                        score,
                        class_index,
                        bbox: boxes[index],
                    });
                }
            }
        }

        trace_event!("candidates", count = out.len());
        Ok(out)
    }
}

/// Writes the per-cell maximum of `confidence * class_prob[k]` and its argmax.
///
/// Class planes are scanned in order with a strict comparison, so the lowest
/// class index wins exact ties.
fn best_class_per_cell(
    block: TensorView<'_>,
    num_classes: usize,
    best_score: &mut [f64],
    best_class: &mut [usize],
) {
    let conf = block.plane(CONFIDENCE);
    let first = block.plane(CLASS_START);
    for (((score, class), &c), &p) in best_score
        .iter_mut()
        .zip(best_class.iter_mut())
        .zip(conf)
        .zip(first)
    {
        *score = f64::from(c) * f64::from(p);
        *class = 0;
    }

    for k in 1..num_classes {
        let probs = block.plane(CLASS_START + k);
        for (((score, class), &c), &p) in best_score
            .iter_mut()
            .zip(best_class.iter_mut())
            .zip(conf)
            .zip(probs)
        {
            let s = f64::from(c) * f64::from(p);
            if s > *score {
                *score = s;
                *class = k;
            }
        }
    }
}
