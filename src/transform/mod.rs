//! Feature-map layout transforms used inside the detection network.

pub mod space_to_depth;
