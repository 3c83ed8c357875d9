//! SIMD activation kernel using the `wide` crate.
//!
//! Eight lanes are processed per step with `f32x8`; the tail falls back to
//! the scalar helpers.

use crate::kernel::Activation;
use crate::util::math::sigmoid;
use wide::f32x8;

const LANES: usize = 8;

/// Sigmoid input bound; beyond it the result is 0 or 1 in f32 anyway and
/// the vector `exp` leaves its accurate range.
const SIGMOID_CLAMP: f32 = 88.0;

/// Load 8 f32 values into f32x8.
#[inline]
fn load_f32x8(slice: &[f32]) -> f32x8 {
    f32x8::from([
        slice[0], slice[1], slice[2], slice[3], slice[4], slice[5], slice[6], slice[7],
    ])
}

#[inline]
fn store_f32x8(v: f32x8, slice: &mut [f32]) {
    slice[..LANES].copy_from_slice(&v.to_array());
}

/// SIMD-accelerated sigmoid/exp kernel.
pub struct SimdActivation;

impl Activation for SimdActivation {
    fn sigmoid_in_place(values: &mut [f32]) {
        let mut chunks = values.chunks_exact_mut(LANES);
        for chunk in &mut chunks {
            let v = load_f32x8(chunk)
                .max(f32x8::splat(-SIGMOID_CLAMP))
                .min(f32x8::splat(SIGMOID_CLAMP));
            let out = f32x8::ONE / (f32x8::ONE + (-v).exp());
            store_f32x8(out, chunk);
        }
        for v in chunks.into_remainder() {
            *v = sigmoid(*v);
        }
    }

    fn exp_in_place(values: &mut [f32]) {
        let mut chunks = values.chunks_exact_mut(LANES);
        for chunk in &mut chunks {
            store_f32x8(load_f32x8(chunk).exp(), chunk);
        }
        for v in chunks.into_remainder() {
            *v = v.exp();
        }
    }
}
