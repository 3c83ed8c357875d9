use crate::geometry::GridGeometry;
use crate::tensor::TensorShape;
use crate::util::{YoloDecError, YoloDecResult};

/// Borrowed channel-major tensor view with explicit strides.
///
/// Rows are always contiguous (`col` stride is 1). `channel_stride` counts the
/// elements between the starts of consecutive planes and `row_stride` the
/// elements between consecutive rows of a plane. Sub-views created by
/// [`TensorView::channel_range`] share the backing slice.
#[derive(Copy, Clone, Debug)]
pub struct TensorView<'a> {
    data: &'a [f32],
    shape: TensorShape,
    channel_stride: usize,
    row_stride: usize,
}

impl<'a> TensorView<'a> {
    /// Creates a contiguous view, requiring `data.len() == C * H * W`.
    pub fn from_slice(data: &'a [f32], shape: TensorShape) -> YoloDecResult<Self> {
        let needed = shape.checked_len()?;
        if data.len() != needed {
            return Err(YoloDecError::BufferLength {
                needed,
                got: data.len(),
            });
        }
        Ok(Self::contiguous(data, shape))
    }

    pub(crate) fn contiguous(data: &'a [f32], shape: TensorShape) -> Self {
        Self {
            data,
            shape,
            channel_stride: shape.plane_len(),
            row_stride: shape.width,
        }
    }

    /// Returns the view shape.
    pub fn shape(&self) -> TensorShape {
        self.shape
    }

    /// Returns the number of channels.
    pub fn channels(&self) -> usize {
        self.shape.channels
    }

    /// Returns the plane height.
    pub fn height(&self) -> usize {
        self.shape.height
    }

    /// Returns the plane width.
    pub fn width(&self) -> usize {
        self.shape.width
    }

    /// Returns the element at `(channel, row, col)` if it is within bounds.
    pub fn get(&self, channel: usize, row: usize, col: usize) -> Option<f32> {
        if channel >= self.shape.channels || row >= self.shape.height || col >= self.shape.width
        {
            return None;
        }
        let idx = channel
            .checked_mul(self.channel_stride)?
            .checked_add(row.checked_mul(self.row_stride)?)?
            .checked_add(col)?;
        self.data.get(idx).copied()
    }

    /// Hot-path accessor; bounds are only checked in debug builds.
    #[inline]
    pub fn at(&self, channel: usize, row: usize, col: usize) -> f32 {
        debug_assert!(channel < self.shape.channels);
        debug_assert!(row < self.shape.height);
        debug_assert!(col < self.shape.width);
        self.data[channel * self.channel_stride + row * self.row_stride + col]
    }

    /// Returns channel plane `c` as a contiguous `H * W` slice, or `None` if
    /// `c` is out of range.
    pub fn get_plane(&self, c: usize) -> Option<&'a [f32]> {
        if c >= self.shape.channels {
            return None;
        }
        let start = c * self.channel_stride;
        self.data.get(start..start + self.shape.plane_len())
    }

    /// Returns channel plane `c` as a contiguous `H * W` slice.
    ///
    /// Callers index planes derived from a validated geometry; use
    /// [`TensorView::get_plane`] for untrusted channel indices.
    ///
    /// # Panics
    ///
    /// Panics if `c` is out of range.
    pub fn plane(&self, c: usize) -> &'a [f32] {
        match self.get_plane(c) {
            Some(plane) => plane,
            None => panic!("channel {c} out of range for {} channels", self.shape.channels),
        }
    }

    /// Returns a zero-copy view over `len` channels starting at `start`.
    pub fn channel_range(&self, start: usize, len: usize) -> YoloDecResult<TensorView<'a>> {
        let end = start.checked_add(len);
        if len == 0 || end.map_or(true, |end| end > self.shape.channels) {
            return Err(YoloDecError::ShapeMismatch {
                expected: (start.saturating_add(len), self.shape.height, self.shape.width),
                got: self.shape.as_tuple(),
            });
        }
        let offset = start * self.channel_stride;
        Ok(TensorView {
            data: &self.data[offset..],
            shape: TensorShape::new(len, self.shape.height, self.shape.width),
            channel_stride: self.channel_stride,
            row_stride: self.row_stride,
        })
    }

    /// Returns the `5 + num_classes` channel block belonging to `anchor`.
    pub fn anchor_block(
        &self,
        anchor: usize,
        geometry: &GridGeometry,
    ) -> YoloDecResult<TensorView<'a>> {
        let block = geometry.channels_per_anchor();
        self.channel_range(anchor * block, block)
    }

    /// Iterates `(row, col)` over the grid in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> {
        let width = self.shape.width;
        (0..self.shape.plane_len()).map(move |k| (k / width, k % width))
    }
}
