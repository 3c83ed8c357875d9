//! Space-to-depth with block size 2.
//!
//! An input of shape `(C, 2H, 2W)` becomes `(4C, H, W)`. Output channel
//! `g * C + c` holds the sub-pixel `g` of every 2x2 block of input channel
//! `c`, with `g` ordered top-left, top-right, bottom-left, bottom-right:
//!
//! ```text
//! TL | TR | TL | TR
//! ---+----+----+---
//! BL | BR | BL | BR
//! ```
//!
//! The transform only copies; no arithmetic touches the values.

use crate::tensor::{Tensor, TensorShape, TensorView};
use crate::trace::trace_span;
use crate::util::{YoloDecError, YoloDecResult};

/// Block edge length.
pub const BLOCK: usize = 2;

/// `(row, col)` offset inside a 2x2 block for each output channel group.
pub const SUB_PIXEL_OFFSETS: [(usize, usize); 4] = [(0, 0), (0, 1), (1, 0), (1, 1)];

/// Space-to-depth transform for a fixed input channel count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpaceToDepth {
    in_channels: usize,
}

impl SpaceToDepth {
    /// Creates a transform expecting `in_channels` input channels.
    pub fn new(in_channels: usize) -> YoloDecResult<Self> {
        if in_channels == 0 {
            return Err(YoloDecError::InvalidConfig {
                reason: "space-to-depth needs at least one input channel",
            });
        }
        Ok(Self { in_channels })
    }

    /// Returns the declared input channel count.
    pub fn in_channels(&self) -> usize {
        self.in_channels
    }

    /// Returns the output shape for an input of `input` shape.
    pub fn output_shape(&self, input: TensorShape) -> YoloDecResult<TensorShape> {
        if input.channels != self.in_channels {
            return Err(YoloDecError::ShapeMismatch {
                expected: (self.in_channels, input.height, input.width),
                got: input.as_tuple(),
            });
        }
        if input.height % BLOCK != 0 || input.width % BLOCK != 0 {
            return Err(YoloDecError::OddSpatialDims {
                height: input.height,
                width: input.width,
            });
        }
        Ok(TensorShape::new(
            input.channels * BLOCK * BLOCK,
            input.height / BLOCK,
            input.width / BLOCK,
        ))
    }

    /// Rearranges `input` into a newly allocated tensor.
    pub fn transform(&self, input: TensorView<'_>) -> YoloDecResult<Tensor> {
        let shape = self.output_shape(input.shape())?;
        let mut out = Tensor::zeros(shape)?;
        self.transform_into(input, &mut out)?;
        Ok(out)
    }

    /// Rearranges `input` into a caller-owned tensor of the output shape.
    pub fn transform_into(&self, input: TensorView<'_>, out: &mut Tensor) -> YoloDecResult<()> {
        let shape = self.output_shape(input.shape())?;
        out.shape().ensure_eq(shape)?;

        let _span = trace_span!("space_to_depth", channels = self.in_channels).entered();

        let in_width = input.width();
        let out_width = shape.width;
        let out_plane = shape.plane_len();
        let dst_all = out.as_mut_slice();

        for (g, &(dr, dc)) in SUB_PIXEL_OFFSETS.iter().enumerate() {
            for c in 0..self.in_channels {
                let src = input.plane(c);
                let start = (g * self.in_channels + c) * out_plane;
                let dst = &mut dst_all[start..start + out_plane];
                for (row, dst_row) in dst.chunks_exact_mut(out_width).enumerate() {
                    let src_start = (BLOCK * row + dr) * in_width;
                    let src_row = &src[src_start..src_start + in_width];
                    for (d, &s) in dst_row.iter_mut().zip(src_row.iter().skip(dc).step_by(BLOCK)) {
                        *d = s;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SpaceToDepth;
    use crate::tensor::{Tensor, TensorShape};
    use crate::util::YoloDecError;

    #[test]
    fn single_channel_block_splits_into_four_channels() {
        let input = Tensor::new(
            vec![
                1.0, 2.0, 3.0, 4.0, //
                5.0, 6.0, 7.0, 8.0, //
                9.0, 10.0, 11.0, 12.0, //
                13.0, 14.0, 15.0, 16.0,
            ],
            TensorShape::new(1, 4, 4),
        )
        .unwrap();
        let out = SpaceToDepth::new(1).unwrap().transform(input.view()).unwrap();
        assert_eq!(out.shape(), TensorShape::new(4, 2, 2));
        assert_eq!(
            out.as_slice(),
            &[
                1.0, 3.0, 9.0, 11.0, // top-left
                2.0, 4.0, 10.0, 12.0, // top-right
                5.0, 7.0, 13.0, 15.0, // bottom-left
                6.0, 8.0, 14.0, 16.0, // bottom-right
            ]
        );
    }

    #[test]
    fn rejects_odd_dimensions_and_channel_mismatch() {
        let s2d = SpaceToDepth::new(2).unwrap();
        let odd = Tensor::zeros(TensorShape::new(2, 3, 4)).unwrap();
        assert_eq!(
            s2d.transform(odd.view()).unwrap_err(),
            YoloDecError::OddSpatialDims {
                height: 3,
                width: 4,
            }
        );
        let wrong = Tensor::zeros(TensorShape::new(3, 4, 4)).unwrap();
        assert_eq!(
            s2d.transform(wrong.view()).unwrap_err(),
            YoloDecError::ShapeMismatch {
                expected: (2, 4, 4),
                got: (3, 4, 4),
            }
        );
        assert!(SpaceToDepth::new(0).is_err());
    }
}
