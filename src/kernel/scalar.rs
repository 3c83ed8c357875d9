//! Scalar reference activation kernel.

use crate::kernel::Activation;
use crate::util::math::sigmoid;

/// Plain `f32` loops; the compiler autovectorizes what it can.
pub struct ScalarActivation;

impl Activation for ScalarActivation {
    fn sigmoid_in_place(values: &mut [f32]) {
        for v in values.iter_mut() {
            *v = sigmoid(*v);
        }
    }

    fn exp_in_place(values: &mut [f32]) {
        for v in values.iter_mut() {
            *v = v.exp();
        }
    }
}
