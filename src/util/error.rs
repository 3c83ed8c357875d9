//! Error types for yolodec.

use thiserror::Error;

/// Result alias for yolodec operations.
pub type YoloDecResult<T> = std::result::Result<T, YoloDecError>;

/// Coarse classification of a [`YoloDecError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Tensor dimensions disagree with the declared geometry. Fatal for one frame.
    Shape,
    /// Invalid detector configuration. Fatal at startup.
    Configuration,
}

/// Errors that can occur when decoding detection tensors.
#[derive(Debug, Error, PartialEq)]
pub enum YoloDecError {
    /// The tensor shape does not match the shape required by the stage.
    #[error("shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: (usize, usize, usize),
        got: (usize, usize, usize),
    },
    /// The buffer length does not equal `channels * height * width`.
    #[error("buffer length mismatch: needed {needed}, got {got}")]
    BufferLength { needed: usize, got: usize },
    /// A tensor dimension is zero or overflows.
    #[error("invalid dimensions: {channels}x{height}x{width}")]
    InvalidDimensions {
        channels: usize,
        height: usize,
        width: usize,
    },
    /// Space-to-depth needs even spatial dimensions.
    #[error("spatial dimensions must be even: {height}x{width}")]
    OddSpatialDims { height: usize, width: usize },
    /// A per-cell side buffer does not cover the full anchor grid.
    #[error("box count mismatch: expected {expected}, got {got}")]
    BoxCountMismatch { expected: usize, got: usize },
    /// The anchor list length differs from `num_anchors`.
    #[error("anchor count mismatch: expected {expected}, got {got}")]
    AnchorCountMismatch { expected: usize, got: usize },
    /// The label list length differs from `num_classes`.
    #[error("label count mismatch: expected {expected}, got {got}")]
    LabelCountMismatch { expected: usize, got: usize },
    /// A threshold is outside `[0, 1]` or not finite.
    #[error("{name} must lie in [0, 1], got {value}")]
    ThresholdOutOfRange { name: &'static str, value: f64 },
    /// An anchor has a non-positive or non-finite size.
    #[error("anchor {index} has invalid size {width}x{height}")]
    InvalidAnchor {
        index: usize,
        width: f32,
        height: f32,
    },
    /// Other invalid configuration values.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: &'static str },
}

impl YoloDecError {
    /// Returns the error kind used to decide between dropping a frame and
    /// aborting startup.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ShapeMismatch { .. }
            | Self::BufferLength { .. }
            | Self::InvalidDimensions { .. }
            | Self::OddSpatialDims { .. }
            | Self::BoxCountMismatch { .. } => ErrorKind::Shape,
            Self::AnchorCountMismatch { .. }
            | Self::LabelCountMismatch { .. }
            | Self::ThresholdOutOfRange { .. }
            | Self::InvalidAnchor { .. }
            | Self::InvalidConfig { .. } => ErrorKind::Configuration,
        }
    }
}
