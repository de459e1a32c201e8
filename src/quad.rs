//! Four-component float value type
//!
//! Used for positions, rotations, scales, and bounding boxes (center plus
//! half-extent). Equality is field-wise.

use serde::{Deserialize, Serialize};

/// A four-component f64 tuple.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quad {
    pub const ZERO: Quad = Quad {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Quad { x, y, z, w }
    }

    /// True when every component is exactly zero (the "no geometry yet"
    /// marker on catalog records).
    pub fn is_zero(&self) -> bool {
        *self == Quad::ZERO
    }
}

impl std::fmt::Display for Quad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x: {} y: {} z: {} w: {}", self.x, self.y, self.z, self.w)
    }
}
