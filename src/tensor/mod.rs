//! Dense `(channels, height, width)` float tensors.
//!
//! `Tensor` owns a contiguous channel-major buffer; `TensorView` is a borrowed
//! view with explicit strides, used for zero-copy anchor blocks. Every stage
//! addresses elements through the view so offset arithmetic stays in one
//! place.

use crate::util::{YoloDecError, YoloDecResult};

mod view;

pub use view::TensorView;

/// Tensor dimensions in channel-major order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TensorShape {
    /// Number of channels (planes).
    pub channels: usize,
    /// Rows per plane.
    pub height: usize,
    /// Columns per plane.
    pub width: usize,
}

impl TensorShape {
    /// Creates a shape from `(channels, height, width)`.
    pub const fn new(channels: usize, height: usize, width: usize) -> Self {
        Self {
            channels,
            height,
            width,
        }
    }

    /// Returns the number of elements in one channel plane.
    pub fn plane_len(&self) -> usize {
        self.height * self.width
    }

    /// Returns the total element count, rejecting zero or overflowing dimensions.
    pub fn checked_len(&self) -> YoloDecResult<usize> {
        let invalid = YoloDecError::InvalidDimensions {
            channels: self.channels,
            height: self.height,
            width: self.width,
        };
        if self.channels == 0 || self.height == 0 || self.width == 0 {
            return Err(invalid);
        }
        self.height
            .checked_mul(self.width)
            .and_then(|v| v.checked_mul(self.channels))
            .ok_or(invalid)
    }

    /// Returns the shape as a `(channels, height, width)` tuple.
    pub fn as_tuple(&self) -> (usize, usize, usize) {
        (self.channels, self.height, self.width)
    }

    pub(crate) fn ensure_eq(&self, expected: TensorShape) -> YoloDecResult<()> {
        if *self != expected {
            return Err(YoloDecError::ShapeMismatch {
                expected: expected.as_tuple(),
                got: self.as_tuple(),
            });
        }
        Ok(())
    }
}

/// Owned contiguous tensor.
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor {
    data: Vec<f32>,
    shape: TensorShape,
}

impl Tensor {
    /// Wraps a buffer whose length equals `channels * height * width`.
    pub fn new(data: Vec<f32>, shape: TensorShape) -> YoloDecResult<Self> {
        let needed = shape.checked_len()?;
        if data.len() != needed {
            return Err(YoloDecError::BufferLength {
                needed,
                got: data.len(),
            });
        }
        Ok(Self { data, shape })
    }

    /// Allocates a zero-filled tensor.
    pub fn zeros(shape: TensorShape) -> YoloDecResult<Self> {
        let needed = shape.checked_len()?;
        Ok(Self {
            data: vec![0.0; needed],
            shape,
        })
    }

    /// Copies a view into a new contiguous tensor.
    pub fn from_view(view: TensorView<'_>) -> Self {
        let shape = view.shape();
        let mut data = Vec::with_capacity(shape.channels * shape.plane_len());
        for c in 0..shape.channels {
            data.extend_from_slice(view.plane(c));
        }
        Self { data, shape }
    }

    /// Returns the tensor shape.
    pub fn shape(&self) -> TensorShape {
        self.shape
    }

    /// Returns a borrowed view of the whole tensor.
    pub fn view(&self) -> TensorView<'_> {
        TensorView::contiguous(&self.data, self.shape)
    }

    /// Returns the backing buffer.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Returns the backing buffer mutably.
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Returns the element at `(channel, row, col)` if it is within bounds.
    pub fn get(&self, channel: usize, row: usize, col: usize) -> Option<f32> {
        self.view().get(channel, row, col)
    }

    /// Returns channel plane `c` mutably.
    pub fn plane_mut(&mut self, c: usize) -> Option<&mut [f32]> {
        if c >= self.shape.channels {
            return None;
        }
        let len = self.shape.plane_len();
        let start = c * len;
        self.data.get_mut(start..start + len)
    }

    /// Consumes the tensor, returning its buffer.
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }
}
