use yolodec::{SpaceToDepth, Tensor, TensorShape};

/// Input where every plane holds `row * width + col`, offset by `1000 * channel`.
fn ramp_input(channels: usize, height: usize, width: usize) -> Tensor {
    let mut data = Vec::with_capacity(channels * height * width);
    for c in 0..channels {
        for r in 0..height {
            for col in 0..width {
                data.push((c * 1000 + r * width + col) as f32);
            }
        }
    }
    Tensor::new(data, TensorShape::new(channels, height, width)).unwrap()
}

#[test]
fn output_channel_groups_follow_tl_tr_bl_br() {
    let (channels, height, width) = (3, 6, 8);
    let input = ramp_input(channels, height, width);
    let out = SpaceToDepth::new(channels)
        .unwrap()
        .transform(input.view())
        .unwrap();
    assert_eq!(out.shape(), TensorShape::new(12, 3, 4));

    let offsets = [(0, 0), (0, 1), (1, 0), (1, 1)];
    for (g, &(dr, dc)) in offsets.iter().enumerate() {
        for c in 0..channels {
            for r in 0..height / 2 {
                for col in 0..width / 2 {
                    let expected = input.get(c, 2 * r + dr, 2 * col + dc).unwrap();
                    assert_eq!(
                        out.get(g * channels + c, r, col),
                        Some(expected),
                        "group {g} channel {c} at ({r}, {col})"
                    );
                }
            }
        }
    }
}

#[test]
fn every_input_value_appears_exactly_once() {
    let input = ramp_input(2, 4, 6);
    let out = SpaceToDepth::new(2).unwrap().transform(input.view()).unwrap();
    let mut a = input.as_slice().to_vec();
    let mut b = out.as_slice().to_vec();
    a.sort_by(f32::total_cmp);
    b.sort_by(f32::total_cmp);
    assert_eq!(a, b);
}

#[test]
fn transform_into_reuses_output_buffer() {
    let input = ramp_input(1, 4, 4);
    let s2d = SpaceToDepth::new(1).unwrap();
    let mut out = Tensor::new(vec![-1.0; 16], TensorShape::new(4, 2, 2)).unwrap();
    s2d.transform_into(input.view(), &mut out).unwrap();
    assert_eq!(out, s2d.transform(input.view()).unwrap());

    let mut wrong = Tensor::zeros(TensorShape::new(4, 2, 1)).unwrap();
    assert!(s2d.transform_into(input.view(), &mut wrong).is_err());
}
