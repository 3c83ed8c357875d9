//! Grid geometry, anchor sets, and precomputed per-cell lookup tables.
//!
//! Each anchor owns a contiguous block of `5 + num_classes` channels laid out
//! as `x, y, w, h, confidence, class_0 .. class_{n-1}`.

use crate::tensor::TensorShape;
use crate::util::{YoloDecError, YoloDecResult};

mod labels;

pub use labels::COCO_LABELS;

/// Anchor sizes `(width, height)` in grid-cell units used by YOLOv2 on COCO.
pub const YOLOV2_ANCHORS: [(f32, f32); 5] = [
    (0.57273, 0.677385),
    (1.87446, 2.06253),
    (3.33843, 5.47434),
    (7.88282, 3.52778),
    (9.77052, 9.16828),
];

/// Channel offsets inside an anchor block.
pub(crate) const X: usize = 0;
pub(crate) const Y: usize = 1;
pub(crate) const W: usize = 2;
pub(crate) const H: usize = 3;
pub(crate) const CONFIDENCE: usize = 4;
pub(crate) const CLASS_START: usize = 5;

/// Output grid dimensions and the per-cell prediction layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridGeometry {
    /// Grid rows.
    pub grid_height: usize,
    /// Grid columns.
    pub grid_width: usize,
    /// Anchors predicted per cell.
    pub num_anchors: usize,
    /// Class-probability channels per anchor.
    pub num_classes: usize,
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self {
            grid_height: 19,
            grid_width: 19,
            num_anchors: 5,
            num_classes: 80,
        }
    }
}

impl GridGeometry {
    /// Creates a geometry from grid size, anchor count, and class count.
    pub const fn new(
        grid_height: usize,
        grid_width: usize,
        num_anchors: usize,
        num_classes: usize,
    ) -> Self {
        Self {
            grid_height,
            grid_width,
            num_anchors,
            num_classes,
        }
    }

    /// Returns `5 + num_classes`.
    pub fn channels_per_anchor(&self) -> usize {
        CLASS_START + self.num_classes
    }

    /// Returns `num_anchors * (5 + num_classes)`.
    pub fn total_channels(&self) -> usize {
        self.num_anchors * self.channels_per_anchor()
    }

    /// Returns the number of grid cells.
    pub fn cells(&self) -> usize {
        self.grid_height * self.grid_width
    }

    /// Returns the number of anchor-cells, the length of the flattened index space.
    pub fn anchor_cells(&self) -> usize {
        self.num_anchors * self.cells()
    }

    /// Returns the raw network output shape this geometry expects.
    pub fn raw_shape(&self) -> TensorShape {
        TensorShape::new(self.total_channels(), self.grid_height, self.grid_width)
    }

    /// Splits a flattened anchor-cell index into `(anchor, row, col)`.
    pub fn unflatten(&self, index: usize) -> (usize, usize, usize) {
        let cells = self.cells();
        let anchor = index / cells;
        let cell = index % cells;
        (anchor, cell / self.grid_width, cell % self.grid_width)
    }

    /// Checks that every dimension is non-zero and the raw tensor length fits
    /// in `usize`.
    pub fn validate(&self) -> YoloDecResult<()> {
        if self.grid_height == 0 || self.grid_width == 0 {
            return Err(YoloDecError::InvalidConfig {
                reason: "grid dimensions must be > 0",
            });
        }
        if self.num_anchors == 0 {
            return Err(YoloDecError::InvalidConfig {
                reason: "num_anchors must be > 0",
            });
        }
        if self.num_classes == 0 {
            return Err(YoloDecError::InvalidConfig {
                reason: "num_classes must be > 0",
            });
        }
        let fits = CLASS_START
            .checked_add(self.num_classes)
            .and_then(|c| c.checked_mul(self.num_anchors))
            .map(|channels| TensorShape::new(channels, self.grid_height, self.grid_width))
            .is_some_and(|shape| shape.checked_len().is_ok());
        if !fits {
            return Err(YoloDecError::InvalidConfig {
                reason: "grid geometry overflows",
            });
        }
        Ok(())
    }
}

/// Ordered anchor sizes in grid-cell units.
#[derive(Clone, Debug, PartialEq)]
pub struct AnchorSpec {
    anchors: Vec<(f32, f32)>,
}

impl Default for AnchorSpec {
    fn default() -> Self {
        Self::new(YOLOV2_ANCHORS.to_vec())
    }
}

impl AnchorSpec {
    /// Creates an anchor set from `(width, height)` pairs.
    pub fn new(anchors: Vec<(f32, f32)>) -> Self {
        Self { anchors }
    }

    /// Creates an anchor set from the flat `w0, h0, w1, h1, ..` layout.
    pub fn from_flat(values: &[f32]) -> YoloDecResult<Self> {
        if values.len() % 2 != 0 {
            return Err(YoloDecError::InvalidConfig {
                reason: "flat anchor list must have an even length",
            });
        }
        Ok(Self::new(
            values.chunks_exact(2).map(|p| (p[0], p[1])).collect(),
        ))
    }

    /// Returns the number of anchors.
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    /// Returns `true` if there are no anchors.
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Returns the `(width, height)` of anchor `index`.
    pub fn get(&self, index: usize) -> Option<(f32, f32)> {
        self.anchors.get(index).copied()
    }

    /// Returns all anchors.
    pub fn as_slice(&self) -> &[(f32, f32)] {
        &self.anchors
    }

    /// Checks the anchor count and that every size is finite and positive.
    pub fn validate(&self, num_anchors: usize) -> YoloDecResult<()> {
        if self.anchors.len() != num_anchors {
            return Err(YoloDecError::AnchorCountMismatch {
                expected: num_anchors,
                got: self.anchors.len(),
            });
        }
        for (index, &(width, height)) in self.anchors.iter().enumerate() {
            let valid = |v: f32| v.is_finite() && v > 0.0;
            if !valid(width) || !valid(height) {
                return Err(YoloDecError::InvalidAnchor {
                    index,
                    width,
                    height,
                });
            }
        }
        Ok(())
    }
}

/// Column and row index planes, built once per geometry.
///
/// `col_index[k]` and `row_index[k]` hold the column and row of cell `k`
/// (row-major), as floats ready to be added to the sigmoid offsets.
#[derive(Clone, Debug)]
pub struct GridTables {
    geometry: GridGeometry,
    col_index: Vec<f32>,
    row_index: Vec<f32>,
}

impl GridTables {
    /// Builds the lookup tables for `geometry`.
    pub fn new(geometry: GridGeometry) -> Self {
        let cells = geometry.cells();
        let mut col_index = Vec::with_capacity(cells);
        let mut row_index = Vec::with_capacity(cells);
        for row in 0..geometry.grid_height {
            for col in 0..geometry.grid_width {
                col_index.push(col as f32);
                row_index.push(row as f32);
            }
        }
        Self {
            geometry,
            col_index,
            row_index,
        }
    }

    /// Returns the geometry the tables were built for.
    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// Returns the per-cell column indices.
    pub fn col_index(&self) -> &[f32] {
        &self.col_index
    }

    /// Returns the per-cell row indices.
    pub fn row_index(&self) -> &[f32] {
        &self.row_index
    }
}
