use yolodec::{
    iou, Detector, DetectorConfig, FrameGate, FrameOutcome, GridGeometry, Tensor, COCO_LABELS,
};

/// Logit that suppresses a class without producing non-finite intermediates.
const SUPPRESSED: f32 = -30.0;

/// Raw-tensor builder for the default 19x19, 5-anchor, 80-class geometry.
struct RawFrame {
    geometry: GridGeometry,
    anchors: Vec<(f32, f32)>,
    tensor: Tensor,
}

impl RawFrame {
    fn new(config: &DetectorConfig) -> Self {
        let geometry = config.geometry;
        // Zero logits: confidence 0.5 spread evenly over all classes.
        let tensor = Tensor::zeros(geometry.raw_shape()).unwrap();
        Self {
            geometry,
            anchors: config.anchors.as_slice().to_vec(),
            tensor,
        }
    }

    fn set(&mut self, anchor: usize, offset: usize, row: usize, col: usize, value: f32) {
        let channel = anchor * self.geometry.channels_per_anchor() + offset;
        let cell = row * self.geometry.grid_width + col;
        self.tensor.plane_mut(channel).unwrap()[cell] = value;
    }

    /// Places a centered box of normalized size `(w, h)` at `(row, col)` with
    /// the given confidence and a single dominant class.
    #[allow(clippy::too_many_arguments)]
    fn spike(
        &mut self,
        anchor: usize,
        row: usize,
        col: usize,
        w: f32,
        h: f32,
        confidence: f32,
        class_index: usize,
    ) {
        let (anchor_w, anchor_h) = self.anchors[anchor];
        let grid_w = self.geometry.grid_width as f32;
        let grid_h = self.geometry.grid_height as f32;
        self.set(anchor, 0, row, col, 0.0);
        self.set(anchor, 1, row, col, 0.0);
        self.set(anchor, 2, row, col, (w * grid_w / anchor_w).ln());
        self.set(anchor, 3, row, col, (h * grid_h / anchor_h).ln());
        self.set(anchor, 4, row, col, (confidence / (1.0 - confidence)).ln());
        for k in 0..self.geometry.num_classes {
            let logit = if k == class_index { 0.0 } else { SUPPRESSED };
            self.set(anchor, 5 + k, row, col, logit);
        }
    }
}

#[test]
fn single_spike_yields_one_labelled_detection() {
    let config = DetectorConfig::default();
    let mut frame = RawFrame::new(&config);
    // The center cell of a 19x19 grid; sigmoid(0) puts the box center at 0.5.
    frame.spike(0, 9, 9, 1.0, 1.0, 0.9, 16);

    let detector = Detector::new(config).unwrap();
    let batch = detector.detect(frame.tensor.view()).unwrap();
    assert_eq!(batch.len(), 1);

    let det = batch.as_slice()[0];
    assert!((det.score - 0.9).abs() < 1e-5, "score = {}", det.score);
    assert_eq!(det.class_index, 16);
    assert!(det.bbox.y_min.abs() < 1e-2);
    assert!(det.bbox.x_min.abs() < 1e-2);
    assert!((det.bbox.y_max - 720.0).abs() < 1e-2);
    assert!((det.bbox.x_max - 1024.0).abs() < 1e-2);

    let labeled = detector.detect_labeled(frame.tensor.view()).unwrap();
    assert_eq!(labeled.len(), 1);
    assert_eq!(labeled[0].label, COCO_LABELS[16]);
    assert_eq!(labeled[0].label, "dog");
    assert!(labeled[0].rect.x.abs() < 1e-5);
    assert!(labeled[0].rect.y.abs() < 1e-5);
    assert!((labeled[0].rect.width - 1.0).abs() < 1e-5);
    assert!((labeled[0].rect.height - 1.0).abs() < 1e-5);
}

#[test]
fn overlapping_pair_keeps_only_the_higher_score() {
    let config = DetectorConfig::default();
    let mut frame = RawFrame::new(&config);
    // Same center, widths 0.5 and 0.4, height 0.5: IOU = 0.2 / 0.25 = 0.8.
    frame.spike(0, 6, 6, 0.5, 0.5, 0.9, 2);
    frame.spike(1, 6, 6, 0.4, 0.5, 0.6, 2);

    let detector = Detector::new(config).unwrap();
    let decoded = detector.decoder().decode(frame.tensor.view()).unwrap();
    let boxes = yolodec::decode_corners(decoded.view(), &detector.config().geometry).unwrap();
    let cell = 6 * 19 + 6;
    let pair_iou = iou(&boxes[cell], &boxes[361 + cell]);
    assert!((pair_iou - 0.8).abs() < 1e-4, "iou = {pair_iou}");

    let batch = detector.detect(frame.tensor.view()).unwrap();
    assert_eq!(batch.len(), 1);
    assert!((batch.as_slice()[0].score - 0.9).abs() < 1e-5);
}

#[test]
fn distant_objects_both_survive_in_score_order() {
    let config = DetectorConfig::default();
    let mut frame = RawFrame::new(&config);
    frame.spike(2, 2, 3, 0.1, 0.1, 0.7, 0);
    frame.spike(4, 15, 14, 0.2, 0.2, 0.95, 7);

    let detector = Detector::new(config).unwrap();
    let batch = detector.detect(frame.tensor.view()).unwrap();
    let classes: Vec<usize> = batch.iter().map(|d| d.class_index).collect();
    assert_eq!(classes, vec![7, 0]);
}

#[test]
fn all_low_confidences_give_empty_batch() {
    let config = DetectorConfig::default();
    let mut frame = RawFrame::new(&config);
    frame.spike(0, 4, 4, 0.3, 0.3, 0.25, 1);

    let detector = Detector::new(config).unwrap();
    let batch = detector.detect(frame.tensor.view()).unwrap();
    assert!(batch.is_empty());
}

#[test]
fn repeated_frames_are_bit_identical() {
    let config = DetectorConfig::default();
    let mut frame = RawFrame::new(&config);
    frame.spike(0, 9, 9, 0.6, 0.4, 0.8, 3);
    frame.spike(3, 1, 17, 0.2, 0.3, 0.85, 40);

    let detector = Detector::new(config).unwrap();
    let a = detector.detect(frame.tensor.view()).unwrap();
    let b = detector.detect(frame.tensor.view()).unwrap();
    assert_eq!(a.len(), 2);
    for (x, y) in a.iter().zip(&b) {
        assert_eq!(x.score.to_bits(), y.score.to_bits());
        assert_eq!(x.bbox.x_min.to_bits(), y.bbox.x_min.to_bits());
        assert_eq!(x.bbox.y_max.to_bits(), y.bbox.y_max.to_bits());
    }
}

#[test]
fn gate_drops_frames_while_one_is_in_flight() {
    let config = DetectorConfig::default();
    let mut frame = RawFrame::new(&config);
    frame.spike(0, 9, 9, 0.5, 0.5, 0.9, 0);
    let detector = Detector::new(config).unwrap();
    let gate = FrameGate::new();

    {
        let _in_flight = gate.try_admit().unwrap();
        let outcome = detector.process_frame(&gate, frame.tensor.view()).unwrap();
        assert_eq!(outcome, FrameOutcome::Dropped);
    }

    match detector.process_frame(&gate, frame.tensor.view()).unwrap() {
        FrameOutcome::Processed(batch) => assert_eq!(batch.len(), 1),
        FrameOutcome::Dropped => panic!("idle gate dropped a frame"),
    }
    let stats = gate.stats();
    assert_eq!(stats.admitted, 2);
    assert_eq!(stats.dropped, 1);
}

#[test]
fn wrong_tensor_shape_is_rejected() {
    let detector = Detector::new(DetectorConfig::default()).unwrap();
    let raw = Tensor::zeros(GridGeometry::new(13, 13, 5, 80).raw_shape()).unwrap();
    let err = detector.detect(raw.view()).unwrap_err();
    assert_eq!(err.kind(), yolodec::ErrorKind::Shape);
}
