#![cfg(feature = "simd")]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use yolodec::lowlevel::{Activation, ScalarActivation, SimdActivation};
use yolodec::{ActivationDecoder, AnchorSpec, GridGeometry, Tensor};

const REL_TOL: f32 = 1e-5;

fn assert_close(a: &[f32], b: &[f32]) {
    assert_eq!(a.len(), b.len());
    for (i, (&x, &y)) in a.iter().zip(b).enumerate() {
        let scale = x.abs().max(y.abs()).max(1e-6);
        assert!((x - y).abs() / scale <= REL_TOL, "index {i}: {x} vs {y}");
    }
}

#[test]
fn simd_kernels_match_scalar_on_random_inputs() {
    let mut rng = StdRng::seed_from_u64(42);
    // 361 is not a multiple of the lane count, so the tail path runs too.
    let input: Vec<f32> = (0..361).map(|_| rng.random_range(-15.0f32..15.0)).collect();

    let mut scalar = input.clone();
    let mut simd = input.clone();
    ScalarActivation::sigmoid_in_place(&mut scalar);
    SimdActivation::sigmoid_in_place(&mut simd);
    assert_close(&scalar, &simd);

    let mut scalar = input.clone();
    let mut simd = input;
    ScalarActivation::exp_in_place(&mut scalar);
    SimdActivation::exp_in_place(&mut simd);
    assert_close(&scalar, &simd);
}

#[test]
fn simd_decoder_matches_scalar_reference_formulas() {
    let geometry = GridGeometry::new(3, 5, 1, 4);
    let anchors = AnchorSpec::new(vec![(2.0, 1.5)]);
    let decoder = ActivationDecoder::new(geometry, anchors).unwrap();

    let mut rng = StdRng::seed_from_u64(7);
    let shape = geometry.raw_shape();
    let data: Vec<f32> = (0..shape.checked_len().unwrap())
        .map(|_| rng.random_range(-6.0f32..6.0))
        .collect();
    let raw = Tensor::new(data, shape).unwrap();
    let out = decoder.decode(raw.view()).unwrap();

    let sigmoid = |v: f32| 1.0 / (1.0 + (-v).exp());
    for row in 0..3 {
        for col in 0..5 {
            let x = (sigmoid(raw.get(0, row, col).unwrap()) + col as f32) / 5.0;
            let w = raw.get(2, row, col).unwrap().exp() * 2.0 / 5.0;
            let conf = sigmoid(raw.get(4, row, col).unwrap());
            assert_close(&[x], &[out.get(0, row, col).unwrap()]);
            assert_close(&[w], &[out.get(2, row, col).unwrap()]);
            assert_close(&[conf], &[out.get(4, row, col).unwrap()]);
        }
    }
}
