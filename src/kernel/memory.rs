//! In-process geometry kernel.
//!
//! Keeps the document collections plus a coarse solid model: every body is
//! an axis-aligned box. That is enough to give each operation a visible
//! effect (bodies appear, merge, split, get measured and exported) without a
//! real B-rep kernel.

use std::collections::{HashMap, VecDeque};
use std::path::{Component, Path, PathBuf};

use uuid::Uuid;

use super::stl::{box_triangles, write_stl};
use super::{Axis, FeatureOperation, GeometryKernel, KernelError, KernelResult};
use crate::models::*;

/// Undo steps kept when no explicit depth is configured.
pub const DEFAULT_UNDO_DEPTH: usize = 50;

/// Largest instance count a single pattern may create.
pub const MAX_PATTERN_INSTANCES: u32 = 1000;

#[derive(Debug, Clone, Default)]
struct Counters {
    sketches: u64,
    planes: u64,
    features: u64,
    bodies: u64,
    feature_names: HashMap<FeatureKind, u32>,
}

impl Counters {
    fn bump(counter: &mut u64) -> u64 {
        let index = *counter;
        *counter += 1;
        index
    }

    fn feature_name(&mut self, kind: FeatureKind) -> String {
        let n = self.feature_names.entry(kind).or_insert(0);
        *n += 1;
        format!("{}{}", kind.label(), n)
    }
}

#[derive(Debug, Clone, Default)]
struct Snapshot {
    state: DocumentState,
    counters: Counters,
}

/// Reference [`GeometryKernel`] holding the whole document in memory.
#[derive(Debug, Clone)]
pub struct MemoryKernel {
    current: Snapshot,
    history: VecDeque<Snapshot>,
    undo_limit: usize,
    export_dir: PathBuf,
}

impl Default for MemoryKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryKernel {
    /// Empty document; relative export filenames land in the working directory.
    pub fn new() -> Self {
        Self::with_export_dir(".")
    }

    pub fn with_export_dir(export_dir: impl Into<PathBuf>) -> Self {
        Self {
            current: Snapshot::default(),
            history: VecDeque::new(),
            undo_limit: DEFAULT_UNDO_DEPTH,
            export_dir: export_dir.into(),
        }
    }

    /// Keep at most `limit` undo steps; older ones are discarded first.
    pub fn with_undo_limit(mut self, limit: usize) -> Self {
        self.undo_limit = limit;
        self.history.truncate(limit);
        self
    }

    /// Number of mutations `undo` can still revert.
    pub fn undo_depth(&self) -> usize {
        self.history.len()
    }

    fn checkpoint(&mut self) {
        if self.undo_limit == 0 {
            return;
        }
        if self.history.len() == self.undo_limit {
            self.history.pop_front();
        }
        self.history.push_back(self.current.clone());
    }

    fn sketch(&self, id: Uuid) -> KernelResult<&Sketch> {
        self.current
            .state
            .sketch(id)
            .ok_or(KernelError::StaleReference("sketch"))
    }

    fn body(&self, id: Uuid) -> KernelResult<&Body> {
        self.current
            .state
            .body(id)
            .ok_or(KernelError::StaleReference("body"))
    }

    fn body_mut(&mut self, id: Uuid) -> KernelResult<&mut Body> {
        self.current
            .state
            .bodies
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(KernelError::StaleReference("body"))
    }

    fn last_body_id(&self) -> Option<Uuid> {
        self.current
            .state
            .bodies
            .iter()
            .max_by_key(|b| b.index)
            .map(|b| b.id)
    }

    /// Flat bounds of a profile lying in its sketch plane.
    fn profile_bounds(&self, profile: ProfileRef) -> KernelResult<(BuiltinPlane, Bounds)> {
        let sketch = self.sketch(profile.sketch)?;
        let region = sketch
            .profiles
            .get(profile.index)
            .ok_or(KernelError::StaleReference("profile"))?;
        let bounds = Bounds::from_corners(
            to_world(sketch.plane, region.min, 0.0),
            to_world(sketch.plane, region.max, 0.0),
        );
        Ok((sketch.plane, bounds))
    }

    /// Axis index and position of a plane along that axis.
    fn plane_position(&self, plane: PlaneRef) -> KernelResult<(usize, f64)> {
        match plane {
            PlaneRef::Builtin(builtin) => Ok((normal_axis(builtin), 0.0)),
            PlaneRef::Construction(id) => {
                let plane = self
                    .current
                    .state
                    .plane(id)
                    .ok_or(KernelError::StaleReference("construction plane"))?;
                let (axis, base) = self.plane_position(plane.base)?;
                Ok((axis, base + plane.offset))
            }
        }
    }

    fn new_body(&mut self, bounds: Bounds) -> Uuid {
        let index = Counters::bump(&mut self.current.counters.bodies);
        let id = Uuid::new_v4();
        self.current.state.bodies.push(Body {
            id,
            name: format!("Body{}", index + 1),
            index,
            bounds,
        });
        id
    }

    fn new_feature(
        &mut self,
        kind: FeatureKind,
        profile: Option<ProfileRef>,
        created_bodies: Vec<Uuid>,
    ) -> Uuid {
        let index = Counters::bump(&mut self.current.counters.features);
        let name = self.current.counters.feature_name(kind);
        let id = Uuid::new_v4();
        self.current.state.features.push(Feature {
            id,
            name,
            index,
            kind,
            profile,
            created_bodies,
        });
        id
    }

    /// Apply a solid-producing feature whose tool shape is `shape`.
    fn apply_solid_feature(
        &mut self,
        kind: FeatureKind,
        profile: Option<ProfileRef>,
        shape: Bounds,
        operation: FeatureOperation,
    ) -> KernelResult<Uuid> {
        let target = self.last_body_id();

        match (operation, target) {
            (FeatureOperation::NewBody, _) | (FeatureOperation::Join, None) => {
                self.checkpoint();
                let body = self.new_body(shape);
                Ok(self.new_feature(kind, profile, vec![body]))
            }
            (FeatureOperation::Join, Some(target)) => {
                let merged = self.body(target)?.bounds.union(&shape);
                self.checkpoint();
                self.body_mut(target)?.bounds = merged;
                Ok(self.new_feature(kind, profile, vec![]))
            }
            (FeatureOperation::Cut, Some(target)) => {
                self.body(target)?;
                self.checkpoint();
                Ok(self.new_feature(kind, profile, vec![]))
            }
            (FeatureOperation::Intersect, Some(target)) => {
                let common = self
                    .body(target)?
                    .bounds
                    .intersection(&shape)
                    .ok_or_else(|| invalid("intersection is empty"))?;
                self.checkpoint();
                self.body_mut(target)?.bounds = common;
                Ok(self.new_feature(kind, profile, vec![]))
            }
            (FeatureOperation::Cut | FeatureOperation::Intersect, None) => Err(invalid(format!(
                "no target body for {} operation",
                operation
            ))),
        }
    }
}

impl GeometryKernel for MemoryKernel {
    fn state(&self) -> &DocumentState {
        &self.current.state
    }

    fn add_sketch(&mut self, plane: BuiltinPlane, name: Option<&str>) -> KernelResult<Uuid> {
        self.checkpoint();
        let index = Counters::bump(&mut self.current.counters.sketches);
        let id = Uuid::new_v4();
        self.current.state.sketches.push(Sketch {
            id,
            name: name
                .map(str::to_string)
                .unwrap_or_else(|| format!("Sketch{}", index + 1)),
            index,
            plane,
            curves: Vec::new(),
            profiles: Vec::new(),
        });
        Ok(id)
    }

    fn add_circle(&mut self, sketch: Uuid, center: Point2, radius: f64) -> KernelResult<()> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(invalid("circle radius must be positive"));
        }
        self.sketch(sketch)?;
        self.checkpoint();

        let curve = Curve::Circle { center, radius };
        let (min, max) = curve.extent();
        let target = self
            .current
            .state
            .sketches
            .iter_mut()
            .find(|s| s.id == sketch)
            .ok_or(KernelError::StaleReference("sketch"))?;
        target.curves.push(curve);
        target.profiles.push(Profile { min, max });
        Ok(())
    }

    fn add_rectangle(
        &mut self,
        sketch: Uuid,
        corner: Point2,
        opposite: Point2,
    ) -> KernelResult<()> {
        if corner.x == opposite.x || corner.y == opposite.y {
            return Err(invalid("rectangle has zero area"));
        }
        self.sketch(sketch)?;
        self.checkpoint();

        let corners = [
            corner,
            Point2::new(opposite.x, corner.y),
            opposite,
            Point2::new(corner.x, opposite.y),
        ];
        let target = self
            .current
            .state
            .sketches
            .iter_mut()
            .find(|s| s.id == sketch)
            .ok_or(KernelError::StaleReference("sketch"))?;
        for i in 0..4 {
            target.curves.push(Curve::Line {
                start: corners[i],
                end: corners[(i + 1) % 4],
            });
        }
        target.profiles.push(Profile {
            min: Point2::new(corner.x.min(opposite.x), corner.y.min(opposite.y)),
            max: Point2::new(corner.x.max(opposite.x), corner.y.max(opposite.y)),
        });
        Ok(())
    }

    fn extrude(
        &mut self,
        profile: ProfileRef,
        distance: f64,
        operation: FeatureOperation,
    ) -> KernelResult<Uuid> {
        if !(distance.is_finite() && distance != 0.0) {
            return Err(invalid("extrude distance must be non-zero"));
        }
        let (plane, flat) = self.profile_bounds(profile)?;
        let mut far = flat.max;
        far[normal_axis(plane)] += distance;
        let shape = Bounds::from_corners(flat.min, far);
        self.apply_solid_feature(FeatureKind::Extrude, Some(profile), shape, operation)
    }

    fn revolve(
        &mut self,
        profile: ProfileRef,
        axis: Axis,
        angle: f64,
        operation: FeatureOperation,
    ) -> KernelResult<Uuid> {
        if !(angle.is_finite() && angle > 0.0) {
            return Err(invalid("revolve angle must be positive"));
        }
        let (_, flat) = self.profile_bounds(profile)?;
        let along = axis.component();
        let radius = flat
            .corners()
            .iter()
            .map(|c| {
                (0..3)
                    .filter(|&i| i != along)
                    .map(|i| c[i] * c[i])
                    .sum::<f64>()
                    .sqrt()
            })
            .fold(0.0, f64::max);
        if radius == 0.0 {
            return Err(invalid("profile lies on the revolve axis"));
        }

        let mut min = [-radius; 3];
        let mut max = [radius; 3];
        min[along] = flat.min[along];
        max[along] = flat.max[along];
        let shape = Bounds { min, max };
        self.apply_solid_feature(FeatureKind::Revolve, Some(profile), shape, operation)
    }

    fn draft(&mut self, body: Uuid, angle: f64) -> KernelResult<Uuid> {
        if !(angle.is_finite() && angle >= 0.0) {
            return Err(invalid("draft angle must not be negative"));
        }
        self.body(body)?;
        self.checkpoint();
        Ok(self.new_feature(FeatureKind::Draft, None, vec![]))
    }

    fn split(&mut self, body: Uuid, plane: Uuid) -> KernelResult<Uuid> {
        let bounds = self.body(body)?.bounds;
        let (axis, position) = self.plane_position(PlaneRef::Construction(plane))?;
        if !(bounds.min[axis] < position && position < bounds.max[axis]) {
            return Err(invalid("splitting plane does not cross the body"));
        }

        self.checkpoint();
        let mut lower = bounds;
        lower.max[axis] = position;
        let mut upper = bounds;
        upper.min[axis] = position;
        self.body_mut(body)?.bounds = lower;
        let half = self.new_body(upper);
        Ok(self.new_feature(FeatureKind::Split, None, vec![half]))
    }

    fn sweep(&mut self, profile: ProfileRef, path: CurveRef) -> KernelResult<Uuid> {
        let (_, flat) = self.profile_bounds(profile)?;
        let path_sketch = self.sketch(path.sketch)?;
        let curve = path_sketch
            .curves
            .get(path.index)
            .ok_or(KernelError::StaleReference("path curve"))?;
        let (start, end) = curve.extent();
        let trail = Bounds::from_corners(
            to_world(path_sketch.plane, start, 0.0),
            to_world(path_sketch.plane, end, 0.0),
        );
        let shape = flat.union(&trail);
        self.apply_solid_feature(
            FeatureKind::Sweep,
            Some(profile),
            shape,
            FeatureOperation::NewBody,
        )
    }

    fn loft(&mut self, sections: [ProfileRef; 2]) -> KernelResult<Uuid> {
        let (_, first) = self.profile_bounds(sections[0])?;
        let (_, second) = self.profile_bounds(sections[1])?;
        self.apply_solid_feature(
            FeatureKind::Loft,
            None,
            first.union(&second),
            FeatureOperation::NewBody,
        )
    }

    fn fillet(&mut self, body: Uuid, radius: f64) -> KernelResult<Uuid> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(invalid("fillet radius must be positive"));
        }
        self.body(body)?;
        self.checkpoint();
        Ok(self.new_feature(FeatureKind::Fillet, None, vec![]))
    }

    fn combine(
        &mut self,
        target: Uuid,
        tool: Uuid,
        operation: FeatureOperation,
    ) -> KernelResult<Uuid> {
        if target == tool {
            return Err(invalid("cannot combine a body with itself"));
        }
        let target_bounds = self.body(target)?.bounds;
        let tool_bounds = self.body(tool)?.bounds;

        let combined = match operation {
            FeatureOperation::NewBody | FeatureOperation::Join => {
                target_bounds.union(&tool_bounds)
            }
            FeatureOperation::Cut => target_bounds,
            FeatureOperation::Intersect => target_bounds
                .intersection(&tool_bounds)
                .ok_or_else(|| invalid("bodies do not intersect"))?,
        };

        self.checkpoint();
        self.body_mut(target)?.bounds = combined;
        self.current.state.bodies.retain(|b| b.id != tool);
        Ok(self.new_feature(FeatureKind::Combine, None, vec![]))
    }

    fn pattern(
        &mut self,
        body: Uuid,
        axis: Axis,
        quantity: u32,
        spacing: f64,
    ) -> KernelResult<Uuid> {
        if quantity < 2 {
            return Err(invalid("pattern needs at least two instances"));
        }
        if quantity > MAX_PATTERN_INSTANCES {
            return Err(invalid(format!(
                "pattern quantity exceeds {} instances",
                MAX_PATTERN_INSTANCES
            )));
        }
        if !(spacing.is_finite() && spacing != 0.0) {
            return Err(invalid("pattern spacing must be non-zero"));
        }
        let bounds = self.body(body)?.bounds;

        self.checkpoint();
        let instances = (1..quantity)
            .map(|i| {
                let mut offset = [0.0; 3];
                offset[axis.component()] = spacing * f64::from(i);
                self.new_body(bounds.translated(offset))
            })
            .collect();
        Ok(self.new_feature(FeatureKind::Pattern, None, instances))
    }

    fn undo(&mut self) -> KernelResult<()> {
        let previous = self.history.pop_back().ok_or(KernelError::NothingToUndo)?;
        self.current = previous;
        Ok(())
    }

    fn delete_feature(&mut self, feature: Uuid) -> KernelResult<()> {
        let created = self
            .current
            .state
            .feature(feature)
            .ok_or(KernelError::StaleReference("feature"))?
            .created_bodies
            .clone();

        self.checkpoint();
        let state = &mut self.current.state;
        state.features.retain(|f| f.id != feature);
        state.bodies.retain(|b| !created.contains(&b.id));
        Ok(())
    }

    fn copy_body(&mut self, body: Uuid) -> KernelResult<Uuid> {
        let bounds = self.body(body)?.bounds;
        self.checkpoint();
        Ok(self.new_body(bounds))
    }

    fn add_offset_plane(
        &mut self,
        base: PlaneRef,
        offset: f64,
        name: Option<&str>,
    ) -> KernelResult<Uuid> {
        if !offset.is_finite() {
            return Err(invalid("plane offset must be finite"));
        }
        self.plane_position(base)?;

        self.checkpoint();
        let index = Counters::bump(&mut self.current.counters.planes);
        let id = Uuid::new_v4();
        self.current.state.planes.push(ConstructionPlane {
            id,
            name: name
                .map(str::to_string)
                .unwrap_or_else(|| format!("Plane{}", index + 1)),
            index,
            base,
            offset,
        });
        Ok(id)
    }

    fn measure_minimum_distance(&self, a: Uuid, b: Uuid) -> KernelResult<f64> {
        let a = self.body(a)?;
        let b = self.body(b)?;
        Ok(a.bounds.distance_to(&b.bounds))
    }

    fn export_stl(&self, filename: &str) -> KernelResult<PathBuf> {
        if filename.is_empty() {
            return Err(KernelError::Export("filename is empty".to_string()));
        }
        let requested = Path::new(filename);
        let escapes = requested
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(KernelError::Export(
                "filename must stay inside the export directory".to_string(),
            ));
        }
        let path = self.export_dir.join(requested);

        let triangles: Vec<_> = self
            .current
            .state
            .bodies
            .iter()
            .flat_map(|b| box_triangles(&b.bounds))
            .collect();

        write_stl(&path, &triangles).map_err(|e| KernelError::Export(e.to_string()))?;
        tracing::debug!(path = %path.display(), triangles = triangles.len(), "Wrote STL");
        Ok(path)
    }
}

fn invalid(reason: impl Into<String>) -> KernelError {
    KernelError::InvalidGeometry(reason.into())
}

/// World axis normal to a built-in plane.
fn normal_axis(plane: BuiltinPlane) -> usize {
    match plane {
        BuiltinPlane::Xy => 2,
        BuiltinPlane::Xz => 1,
        BuiltinPlane::Yz => 0,
    }
}

/// Map sketch coordinates on `plane`, raised `height` along its normal.
fn to_world(plane: BuiltinPlane, p: Point2, height: f64) -> [f64; 3] {
    match plane {
        BuiltinPlane::Xy => [p.x, p.y, height],
        BuiltinPlane::Xz => [p.x, height, p.y],
        BuiltinPlane::Yz => [height, p.x, p.y],
    }
}
