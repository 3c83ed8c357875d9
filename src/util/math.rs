//! Scalar activation helpers shared by the reference kernels.

/// Logistic sigmoid `1 / (1 + e^-v)`.
#[inline]
pub(crate) fn sigmoid(v: f32) -> f32 {
    1.0 / (1.0 + (-v).exp())
}
