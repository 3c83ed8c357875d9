//! Corner-form boxes, unit tracking, and rescaling to image pixels.
//!
//! A [`BoxCorner`] carries its unit as a type parameter: [`Normalized`] boxes
//! come out of the decoder in `[0, 1]` grid-relative coordinates and only
//! [`BoxCorner::rescale`] turns them into [`Pixels`]. The two can never be
//! compared or mixed by accident.

use std::marker::PhantomData;

use crate::geometry::{GridGeometry, H, W, X, Y};
use crate::tensor::TensorView;
use crate::util::YoloDecResult;

/// Unit marker for coordinates relative to the full input image, in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Normalized;

/// Unit marker for absolute image pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Pixels;

/// Axis-aligned box in `(y_min, x_min, y_max, x_max)` corner form.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxCorner<U> {
    /// Top edge.
    pub y_min: f64,
    /// Left edge.
    pub x_min: f64,
    /// Bottom edge.
    pub y_max: f64,
    /// Right edge.
    pub x_max: f64,
    unit: PhantomData<U>,
}

impl<U> BoxCorner<U> {
    /// Creates a box from its corners.
    pub fn new(y_min: f64, x_min: f64, y_max: f64, x_max: f64) -> Self {
        Self {
            y_min,
            x_min,
            y_max,
            x_max,
            unit: PhantomData,
        }
    }

    /// Creates a box from its center and size.
    pub fn from_center(x: f64, y: f64, w: f64, h: f64) -> Self {
        let half_w = w * 0.5;
        let half_h = h * 0.5;
        Self::new(y - half_h, x - half_w, y + half_h, x + half_w)
    }

    /// Returns `x_max - x_min`.
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Returns `y_max - y_min`.
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Returns the box area, zero for inverted boxes.
    pub fn area(&self) -> f64 {
        self.height().max(0.0) * self.width().max(0.0)
    }
}

/// Input image size used to rescale normalized boxes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ImageSize {
    /// Creates an image size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl BoxCorner<Normalized> {
    /// Scales `y` coordinates by the image height and `x` by the image width.
    pub fn rescale(&self, image: ImageSize) -> BoxCorner<Pixels> {
        let h = f64::from(image.height);
        let w = f64::from(image.width);
        BoxCorner::new(
            self.y_min * h,
            self.x_min * w,
            self.y_max * h,
            self.x_max * w,
        )
    }
}

impl BoxCorner<Pixels> {
    /// Divides back by the image size, the inverse of [`BoxCorner::rescale`].
    pub fn normalize(&self, image: ImageSize) -> BoxCorner<Normalized> {
        let h = f64::from(image.height);
        let w = f64::from(image.width);
        BoxCorner::new(
            self.y_min / h,
            self.x_min / w,
            self.y_max / h,
            self.x_max / w,
        )
    }
}

/// Converts decoded `(x, y, w, h)` planes into corner boxes.
///
/// `decoded` is the activation decoder output. The result has one box per
/// anchor-cell, indexed `anchor * H * W + row * W + col`.
pub fn decode_corners(
    decoded: TensorView<'_>,
    geometry: &GridGeometry,
) -> YoloDecResult<Vec<BoxCorner<Normalized>>> {
    decoded.shape().ensure_eq(geometry.raw_shape())?;
    let mut out = Vec::with_capacity(geometry.anchor_cells());
    for anchor in 0..geometry.num_anchors {
        let block = decoded.anchor_block(anchor, geometry)?;
        corners_for_anchor(block, &mut out);
    }
    Ok(out)
}

/// Appends the corner boxes of one anchor block in cell order.
pub fn corners_for_anchor(block: TensorView<'_>, out: &mut Vec<BoxCorner<Normalized>>) {
    let x = block.plane(X);
    let y = block.plane(Y);
    let w = block.plane(W);
    let h = block.plane(H);
    out.extend(x.iter().zip(y).zip(w).zip(h).map(|(((&x, &y), &w), &h)| {
        BoxCorner::from_center(f64::from(x), f64::from(y), f64::from(w), f64::from(h))
    }));
}
