use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::BuiltinPlane;

/// A point in sketch coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A curve drawn in a sketch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Curve {
    Circle { center: Point2, radius: f64 },
    Line { start: Point2, end: Point2 },
}

impl Curve {
    /// Lower-left and upper-right corners of the curve's extent.
    pub fn extent(&self) -> (Point2, Point2) {
        match *self {
            Curve::Circle { center, radius } => (
                Point2::new(center.x - radius, center.y - radius),
                Point2::new(center.x + radius, center.y + radius),
            ),
            Curve::Line { start, end } => (
                Point2::new(start.x.min(end.x), start.y.min(end.y)),
                Point2::new(start.x.max(end.x), start.y.max(end.y)),
            ),
        }
    }
}

/// A closed region of a sketch, stored as its 2D extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub min: Point2,
    pub max: Point2,
}

/// 2D geometry drawn on one of the built-in planes.
///
/// The most recently created sketch is the "active" one; nothing stores that
/// fact, it is derived from `index` whenever a command needs it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sketch {
    pub id: Uuid,
    pub name: String,
    /// Creation order within the sketch collection.
    pub index: u64,
    pub plane: BuiltinPlane,
    pub curves: Vec<Curve>,
    pub profiles: Vec<Profile>,
}

impl Sketch {
    pub fn profile_count(&self) -> usize {
        self.profiles.len()
    }

    /// Reference to the profile at `index`, if the sketch has one there.
    pub fn profile_ref(&self, index: usize) -> Option<ProfileRef> {
        (index < self.profiles.len()).then_some(ProfileRef {
            sketch: self.id,
            index,
        })
    }

    /// Reference to the curve at `index`, if the sketch has one there.
    pub fn curve_ref(&self, index: usize) -> Option<CurveRef> {
        (index < self.curves.len()).then_some(CurveRef {
            sketch: self.id,
            index,
        })
    }
}

/// Points at a profile by owning sketch and position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProfileRef {
    pub sketch: Uuid,
    pub index: usize,
}

/// Points at a sketch curve by owning sketch and position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurveRef {
    pub sketch: Uuid,
    pub index: usize,
}
