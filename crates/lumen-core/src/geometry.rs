//! Axis-aligned bounding geometry for devices

use serde::{Deserialize, Serialize};

/// Axis-aligned box in meters, expressed in the device's local frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl BoundingBox {
    pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        Self { min, max }
    }

    /// One meter cube anchored at the origin
    pub fn unit_cube() -> Self {
        Self::new([0.0, 0.0, 0.0], [1.0, 1.0, 1.0])
    }

    /// Edge lengths along x, y, z
    pub fn size(&self) -> [f64; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }

    pub fn contains(&self, point: [f64; 3]) -> bool {
        (0..3).all(|axis| point[axis] >= self.min[axis] && point[axis] <= self.max[axis])
    }
}
