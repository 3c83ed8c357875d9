//! Activation decoding of raw YOLOv2 output tensors.
//!
//! For every anchor block the decoder applies, in place on a copy of the raw
//! tensor:
//!
//! - `x, y`: sigmoid, plus the cell column/row, divided by grid width/height;
//! - `w, h`: `exp`, times the anchor size, divided by grid width/height;
//! - confidence: sigmoid;
//! - class logits: softmax across the class planes of each cell, with the
//!   per-cell maximum subtracted before exponentiating.
//!
//! The output keeps the input shape; positions and sizes become fractions of
//! the full grid.

pub mod boxes;

#[cfg(feature = "rayon")]
use crate::kernel::rayon::for_each_anchor_block_par;
use crate::geometry::{AnchorSpec, GridGeometry, GridTables, CLASS_START};
use crate::kernel::Activation;
use crate::tensor::{Tensor, TensorView};
use crate::trace::trace_span;
use crate::util::YoloDecResult;

#[cfg(not(feature = "simd"))]
use crate::kernel::scalar::ScalarActivation as Kernel;
#[cfg(feature = "simd")]
use crate::kernel::simd::SimdActivation as Kernel;

/// Decodes raw network output into normalized box attributes and class probabilities.
#[derive(Clone, Debug)]
pub struct ActivationDecoder {
    tables: GridTables,
    anchors: AnchorSpec,
    parallel: bool,
}

impl ActivationDecoder {
    /// Creates a decoder for `geometry`, validating the anchor set against it.
    pub fn new(geometry: GridGeometry, anchors: AnchorSpec) -> YoloDecResult<Self> {
        geometry.validate()?;
        anchors.validate(geometry.num_anchors)?;
        Ok(Self {
            tables: GridTables::new(geometry),
            anchors,
            parallel: false,
        })
    }

    /// Decodes anchor blocks in parallel when the `rayon` feature is enabled.
    ///
    /// Without the feature this flag is ignored.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Returns `true` if parallel decoding was requested.
    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Returns the grid geometry.
    pub fn geometry(&self) -> &GridGeometry {
        self.tables.geometry()
    }

    /// Returns the anchor set.
    pub fn anchors(&self) -> &AnchorSpec {
        &self.anchors
    }

    /// Decodes `raw` into a newly allocated tensor of the same shape.
    pub fn decode(&self, raw: TensorView<'_>) -> YoloDecResult<Tensor> {
        let mut out = Tensor::zeros(self.geometry().raw_shape())?;
        self.decode_into(raw, &mut out)?;
        Ok(out)
    }

    /// Decodes `raw` into a caller-owned tensor, overwriting all of it.
    pub fn decode_into(&self, raw: TensorView<'_>, out: &mut Tensor) -> YoloDecResult<()> {
        let geometry = *self.geometry();
        let expected = geometry.raw_shape();
        raw.shape().ensure_eq(expected)?;
        out.shape().ensure_eq(expected)?;

        let _span = trace_span!(
            "activation_decode",
            anchors = geometry.num_anchors,
            classes = geometry.num_classes
        )
        .entered();

        let cells = geometry.cells();
        let buffer = out.as_mut_slice();
        for (c, dst) in buffer.chunks_exact_mut(cells).enumerate() {
            dst.copy_from_slice(raw.plane(c));
        }

        let block_len = geometry.channels_per_anchor() * cells;
        let decode_block = |anchor: usize, block: &mut [f32]| {
            let size = self.anchors.as_slice()[anchor];
            decode_anchor_block::<Kernel>(block, size, &self.tables);
        };

        #[cfg(feature = "rayon")]
        if self.parallel {
            for_each_anchor_block_par(buffer, block_len, &decode_block);
            return Ok(());
        }

        for (anchor, block) in buffer.chunks_exact_mut(block_len).enumerate() {
            decode_block(anchor, block);
        }
        Ok(())
    }
}

/// Decodes one anchor block in place. `block` holds `5 + num_classes` planes.
fn decode_anchor_block<K: Activation>(
    block: &mut [f32],
    anchor: (f32, f32),
    tables: &GridTables,
) {
    let geometry = tables.geometry();
    let cells = geometry.cells();
    let grid_w = geometry.grid_width as f32;
    let grid_h = geometry.grid_height as f32;
    let (anchor_w, anchor_h) = anchor;

    let (boxes, classes) = block.split_at_mut(CLASS_START * cells);
    let (x, rest) = boxes.split_at_mut(cells);
    let (y, rest) = rest.split_at_mut(cells);
    let (w, rest) = rest.split_at_mut(cells);
    let (h, conf) = rest.split_at_mut(cells);

    K::sigmoid_in_place(x);
    K::sigmoid_in_place(y);
    K::exp_in_place(w);
    K::exp_in_place(h);
    K::sigmoid_in_place(conf);

    for (v, col) in x.iter_mut().zip(tables.col_index()) {
        *v = (*v + col) / grid_w;
    }
    for (v, row) in y.iter_mut().zip(tables.row_index()) {
        *v = (*v + row) / grid_h;
    }
    // `exp` underflows to zero for very negative logits; sizes stay positive.
    for v in w.iter_mut() {
        *v = (*v * anchor_w / grid_w).max(f32::MIN_POSITIVE);
    }
    for v in h.iter_mut() {
        *v = (*v * anchor_h / grid_h).max(f32::MIN_POSITIVE);
    }

    softmax_planes::<K>(classes, cells);
}

/// Softmax across `classes.len() / cells` planes, independently per cell.
fn softmax_planes<K: Activation>(classes: &mut [f32], cells: usize) {
    let mut max = vec![f32::NEG_INFINITY; cells];
    for plane in classes.chunks_exact(cells) {
        for (m, &v) in max.iter_mut().zip(plane) {
            *m = m.max(v);
        }
    }

    let mut sum = vec![0.0f32; cells];
    for plane in classes.chunks_exact_mut(cells) {
        for (v, &m) in plane.iter_mut().zip(&max) {
            *v -= m;
        }
        K::exp_in_place(plane);
        for (s, &v) in sum.iter_mut().zip(plane.iter()) {
            *s += v;
        }
    }

    for plane in classes.chunks_exact_mut(cells) {
        for (v, &s) in plane.iter_mut().zip(&sum) {
            *v /= s;
        }
    }
}
