use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A solid in the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub id: Uuid,
    pub name: String,
    /// Creation order within the body collection.
    pub index: u64,
    /// Axis-aligned extent of the solid, in cm.
    pub bounds: Bounds,
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl Bounds {
    /// Build from two opposite corners in any order.
    pub fn from_corners(a: [f64; 3], b: [f64; 3]) -> Self {
        Self {
            min: [a[0].min(b[0]), a[1].min(b[1]), a[2].min(b[2])],
            max: [a[0].max(b[0]), a[1].max(b[1]), a[2].max(b[2])],
        }
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds::from_corners(
            [
                self.min[0].min(other.min[0]),
                self.min[1].min(other.min[1]),
                self.min[2].min(other.min[2]),
            ],
            [
                self.max[0].max(other.max[0]),
                self.max[1].max(other.max[1]),
                self.max[2].max(other.max[2]),
            ],
        )
    }

    /// Overlapping region, or `None` when the boxes are disjoint.
    pub fn intersection(&self, other: &Bounds) -> Option<Bounds> {
        let mut min = [0.0; 3];
        let mut max = [0.0; 3];
        for axis in 0..3 {
            min[axis] = self.min[axis].max(other.min[axis]);
            max[axis] = self.max[axis].min(other.max[axis]);
            if min[axis] > max[axis] {
                return None;
            }
        }
        Some(Bounds { min, max })
    }

    pub fn translated(&self, offset: [f64; 3]) -> Bounds {
        Bounds {
            min: [
                self.min[0] + offset[0],
                self.min[1] + offset[1],
                self.min[2] + offset[2],
            ],
            max: [
                self.max[0] + offset[0],
                self.max[1] + offset[1],
                self.max[2] + offset[2],
            ],
        }
    }

    /// Smallest gap between the two boxes; zero when they touch or overlap.
    pub fn distance_to(&self, other: &Bounds) -> f64 {
        let mut sum = 0.0;
        for axis in 0..3 {
            let gap = (other.min[axis] - self.max[axis])
                .max(self.min[axis] - other.max[axis])
                .max(0.0);
            sum += gap * gap;
        }
        sum.sqrt()
    }

    /// The eight corners, bottom face first.
    pub fn corners(&self) -> [[f64; 3]; 8] {
        let (a, b) = (self.min, self.max);
        [
            [a[0], a[1], a[2]],
            [b[0], a[1], a[2]],
            [b[0], b[1], a[2]],
            [a[0], b[1], a[2]],
            [a[0], a[1], b[2]],
            [b[0], a[1], b[2]],
            [b[0], b[1], b[2]],
            [a[0], b[1], b[2]],
        ]
    }
}
