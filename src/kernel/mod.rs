//! Geometry capability.
//!
//! The dispatcher never computes geometry. It resolves operands against the
//! document and hands them to a [`GeometryKernel`], which owns the document
//! collections and performs every mutation. [`MemoryKernel`] is the
//! in-process implementation used by the server and by tests.

mod memory;
mod stl;

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

use crate::models::*;

pub use memory::{MemoryKernel, DEFAULT_UNDO_DEPTH, MAX_PATTERN_INSTANCES};
pub use stl::{box_triangles, write_stl, Triangle};

/// Failures raised by the geometry kernel itself.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KernelError {
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Referenced {0} no longer exists")]
    StaleReference(&'static str),

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Export failed: {0}")]
    Export(String),
}

pub type KernelResult<T> = Result<T, KernelError>;

/// How a feature's result combines with existing solids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureOperation {
    NewBody,
    Join,
    Cut,
    Intersect,
}

impl FeatureOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewBody => "new",
            Self::Join => "join",
            Self::Cut => "cut",
            Self::Intersect => "intersect",
        }
    }

    /// Extrude keywords: `new`, `join`, `cut`; anything else intersects.
    pub fn for_extrude(keyword: &str) -> Self {
        match keyword {
            "new" => Self::NewBody,
            "join" => Self::Join,
            "cut" => Self::Cut,
            _ => Self::Intersect,
        }
    }

    /// Revolve keywords: `new`; anything else joins.
    pub fn for_revolve(keyword: &str) -> Self {
        match keyword {
            "new" => Self::NewBody,
            _ => Self::Join,
        }
    }

    /// Combine keywords: `cut`, `intersect`; anything else joins.
    pub fn for_combine(keyword: &str) -> Self {
        match keyword {
            "cut" => Self::Cut,
            "intersect" => Self::Intersect,
            _ => Self::Join,
        }
    }
}

impl fmt::Display for FeatureOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// World axes used by revolve and pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub(crate) fn component(&self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

/// The CAD kernel operations the dispatcher relies on.
///
/// Every mutating call is atomic: it either changes the document and returns
/// `Ok`, or returns an error and leaves the document as it was. Creation
/// calls return the id of the entity (or timeline feature) they created.
pub trait GeometryKernel: Send {
    /// Current document contents.
    fn state(&self) -> &DocumentState;

    fn add_sketch(&mut self, plane: BuiltinPlane, name: Option<&str>) -> KernelResult<Uuid>;

    fn add_circle(&mut self, sketch: Uuid, center: Point2, radius: f64) -> KernelResult<()>;

    /// Axis-aligned rectangle between two opposite corners.
    fn add_rectangle(&mut self, sketch: Uuid, corner: Point2, opposite: Point2)
        -> KernelResult<()>;

    fn extrude(
        &mut self,
        profile: ProfileRef,
        distance: f64,
        operation: FeatureOperation,
    ) -> KernelResult<Uuid>;

    /// Revolve a profile about a world axis. `angle` is in degrees.
    fn revolve(
        &mut self,
        profile: ProfileRef,
        axis: Axis,
        angle: f64,
        operation: FeatureOperation,
    ) -> KernelResult<Uuid>;

    /// Draft every face of a body. `angle` is in degrees.
    fn draft(&mut self, body: Uuid, angle: f64) -> KernelResult<Uuid>;

    fn split(&mut self, body: Uuid, plane: Uuid) -> KernelResult<Uuid>;

    fn sweep(&mut self, profile: ProfileRef, path: CurveRef) -> KernelResult<Uuid>;

    fn loft(&mut self, sections: [ProfileRef; 2]) -> KernelResult<Uuid>;

    /// Constant-radius fillet on every edge of a body.
    fn fillet(&mut self, body: Uuid, radius: f64) -> KernelResult<Uuid>;

    /// Combine `tool` into `target`. The tool body is consumed.
    fn combine(&mut self, target: Uuid, tool: Uuid, operation: FeatureOperation)
        -> KernelResult<Uuid>;

    /// Rectangular pattern of `quantity` instances (original included).
    fn pattern(&mut self, body: Uuid, axis: Axis, quantity: u32, spacing: f64)
        -> KernelResult<Uuid>;

    /// Revert the most recent mutation.
    fn undo(&mut self) -> KernelResult<()>;

    fn delete_feature(&mut self, feature: Uuid) -> KernelResult<()>;

    fn copy_body(&mut self, body: Uuid) -> KernelResult<Uuid>;

    fn add_offset_plane(
        &mut self,
        base: PlaneRef,
        offset: f64,
        name: Option<&str>,
    ) -> KernelResult<Uuid>;

    /// Minimum distance between two bodies, in cm.
    fn measure_minimum_distance(&self, a: Uuid, b: Uuid) -> KernelResult<f64>;

    /// Write the whole document as STL and return the path written.
    fn export_stl(&self, filename: &str) -> KernelResult<PathBuf>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extrude_keywords_fall_back_to_intersect() {
        assert_eq!(FeatureOperation::for_extrude("new"), FeatureOperation::NewBody);
        assert_eq!(FeatureOperation::for_extrude("join"), FeatureOperation::Join);
        assert_eq!(FeatureOperation::for_extrude("cut"), FeatureOperation::Cut);
        assert_eq!(
            FeatureOperation::for_extrude("whatever"),
            FeatureOperation::Intersect
        );
    }

    #[test]
    fn revolve_keywords_fall_back_to_join() {
        assert_eq!(FeatureOperation::for_revolve("new"), FeatureOperation::NewBody);
        assert_eq!(FeatureOperation::for_revolve("cut"), FeatureOperation::Join);
    }

    #[test]
    fn combine_keywords_fall_back_to_join() {
        assert_eq!(FeatureOperation::for_combine("cut"), FeatureOperation::Cut);
        assert_eq!(
            FeatureOperation::for_combine("intersect"),
            FeatureOperation::Intersect
        );
        assert_eq!(FeatureOperation::for_combine("new"), FeatureOperation::Join);
    }
}
