//! Elementwise activation kernels.
//!
//! The activation decoder runs every transform in place over whole channel
//! planes, so a kernel only needs contiguous slice operations. The scalar
//! kernel is the reference; the SIMD kernel trades the last ulp for
//! throughput.

/// In-place elementwise activations over contiguous buffers.
pub trait Activation {
    /// Applies `1 / (1 + e^-v)` to every element.
    fn sigmoid_in_place(values: &mut [f32]);

    /// Applies `e^v` to every element.
    fn exp_in_place(values: &mut [f32]);
}

pub mod scalar;

#[cfg(feature = "simd")]
pub mod simd;

#[cfg(feature = "rayon")]
pub mod rayon;
