#![cfg(feature = "rayon")]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use yolodec::{ActivationDecoder, AnchorSpec, Detector, DetectorConfig, GridGeometry, Tensor};

fn random_raw(geometry: &GridGeometry, seed: u64) -> Tensor {
    let mut rng = StdRng::seed_from_u64(seed);
    let shape = geometry.raw_shape();
    let data = (0..shape.checked_len().unwrap())
        .map(|_| rng.random_range(-10.0f32..10.0))
        .collect();
    Tensor::new(data, shape).unwrap()
}

#[test]
fn parallel_decode_is_bit_identical() {
    let geometry = GridGeometry::default();
    let sequential = ActivationDecoder::new(geometry, AnchorSpec::default()).unwrap();
    let parallel = sequential.clone().with_parallel(true);
    assert!(parallel.is_parallel());

    for seed in 0..3 {
        let raw = random_raw(&geometry, seed);
        let a = sequential.decode(raw.view()).unwrap();
        let b = parallel.decode(raw.view()).unwrap();
        let a_bits: Vec<u32> = a.as_slice().iter().map(|v| v.to_bits()).collect();
        let b_bits: Vec<u32> = b.as_slice().iter().map(|v| v.to_bits()).collect();
        assert_eq!(a_bits, b_bits);
    }
}

#[test]
fn parallel_detector_matches_sequential_batches() {
    let sequential = Detector::new(DetectorConfig {
        confidence_threshold: 0.1,
        ..DetectorConfig::default()
    })
    .unwrap();
    let parallel = Detector::new(DetectorConfig {
        confidence_threshold: 0.1,
        parallel: true,
        ..DetectorConfig::default()
    })
    .unwrap();

    for seed in 10..13 {
        let raw = random_raw(&GridGeometry::default(), seed);
        let a = sequential.detect(raw.view()).unwrap();
        let b = parallel.detect(raw.view()).unwrap();
        assert_eq!(a, b);
    }
}
