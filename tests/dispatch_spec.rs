use std::path::PathBuf;

use cadlink::dispatch::{dispatch, Command, CommandError};
use cadlink::kernel::{Axis, FeatureOperation, GeometryKernel, KernelResult, MemoryKernel};
use cadlink::models::*;
use serde_json::{json, Value};
use speculate2::speculate;
use uuid::Uuid;

/// Forwards to a [`MemoryKernel`] and records every capability call by name.
struct RecordingKernel {
    inner: MemoryKernel,
    calls: Vec<&'static str>,
}

impl RecordingKernel {
    fn new() -> Self {
        Self {
            inner: MemoryKernel::new(),
            calls: Vec::new(),
        }
    }

    fn run(&mut self, body: Value) -> Result<String, CommandError> {
        let command = Command::from_json(body)?;
        dispatch(self, &command)
    }

    fn ok(&mut self, body: Value) -> String {
        self.run(body).expect("command should succeed")
    }

    fn err(&mut self, body: Value) -> String {
        self.run(body).expect_err("command should fail").to_string()
    }

    fn mutations(&self) -> usize {
        self.calls.len()
    }
}

impl GeometryKernel for RecordingKernel {
    fn state(&self) -> &DocumentState {
        self.inner.state()
    }

    fn add_sketch(&mut self, plane: BuiltinPlane, name: Option<&str>) -> KernelResult<Uuid> {
        self.calls.push("add_sketch");
        self.inner.add_sketch(plane, name)
    }

    fn add_circle(&mut self, sketch: Uuid, center: Point2, radius: f64) -> KernelResult<()> {
        self.calls.push("add_circle");
        self.inner.add_circle(sketch, center, radius)
    }

    fn add_rectangle(
        &mut self,
        sketch: Uuid,
        corner: Point2,
        opposite: Point2,
    ) -> KernelResult<()> {
        self.calls.push("add_rectangle");
        self.inner.add_rectangle(sketch, corner, opposite)
    }

    fn extrude(
        &mut self,
        profile: ProfileRef,
        distance: f64,
        operation: FeatureOperation,
    ) -> KernelResult<Uuid> {
        self.calls.push("extrude");
        self.inner.extrude(profile, distance, operation)
    }

    fn revolve(
        &mut self,
        profile: ProfileRef,
        axis: Axis,
        angle: f64,
        operation: FeatureOperation,
    ) -> KernelResult<Uuid> {
        self.calls.push("revolve");
        self.inner.revolve(profile, axis, angle, operation)
    }

    fn draft(&mut self, body: Uuid, angle: f64) -> KernelResult<Uuid> {
        self.calls.push("draft");
        self.inner.draft(body, angle)
    }

    fn split(&mut self, body: Uuid, plane: Uuid) -> KernelResult<Uuid> {
        self.calls.push("split");
        self.inner.split(body, plane)
    }

    fn sweep(&mut self, profile: ProfileRef, path: CurveRef) -> KernelResult<Uuid> {
        self.calls.push("sweep");
        self.inner.sweep(profile, path)
    }

    fn loft(&mut self, sections: [ProfileRef; 2]) -> KernelResult<Uuid> {
        self.calls.push("loft");
        self.inner.loft(sections)
    }

    fn fillet(&mut self, body: Uuid, radius: f64) -> KernelResult<Uuid> {
        self.calls.push("fillet");
        self.inner.fillet(body, radius)
    }

    fn combine(
        &mut self,
        target: Uuid,
        tool: Uuid,
        operation: FeatureOperation,
    ) -> KernelResult<Uuid> {
        self.calls.push("combine");
        self.inner.combine(target, tool, operation)
    }

    fn pattern(
        &mut self,
        body: Uuid,
        axis: Axis,
        quantity: u32,
        spacing: f64,
    ) -> KernelResult<Uuid> {
        self.calls.push("pattern");
        self.inner.pattern(body, axis, quantity, spacing)
    }

    fn undo(&mut self) -> KernelResult<()> {
        self.calls.push("undo");
        self.inner.undo()
    }

    fn delete_feature(&mut self, feature: Uuid) -> KernelResult<()> {
        self.calls.push("delete_feature");
        self.inner.delete_feature(feature)
    }

    fn copy_body(&mut self, body: Uuid) -> KernelResult<Uuid> {
        self.calls.push("copy_body");
        self.inner.copy_body(body)
    }

    fn add_offset_plane(
        &mut self,
        base: PlaneRef,
        offset: f64,
        name: Option<&str>,
    ) -> KernelResult<Uuid> {
        self.calls.push("add_offset_plane");
        self.inner.add_offset_plane(base, offset, name)
    }

    fn measure_minimum_distance(&self, a: Uuid, b: Uuid) -> KernelResult<f64> {
        self.inner.measure_minimum_distance(a, b)
    }

    fn export_stl(&self, filename: &str) -> KernelResult<PathBuf> {
        self.inner.export_stl(filename)
    }
}

/// Sketch with a circle, extruded into one body.
fn one_body(kernel: &mut RecordingKernel) {
    kernel.ok(json!({"command": "create_sketch"}));
    kernel.ok(json!({"command": "create_circle"}));
    kernel.ok(json!({"command": "extrude"}));
}

speculate! {
    before {
        let mut kernel = RecordingKernel::new();
    }

    describe "sketch resolution" {
        it "makes the newest sketch active" {
            for plane in ["xy", "xz", "yz", "xy"] {
                kernel.ok(json!({"command": "create_sketch", "plane": plane}));
            }

            kernel.ok(json!({"command": "create_circle"}));

            let state = kernel.state();
            let drawn: Vec<_> = state.sketches.iter().map(|s| s.curves.len()).collect();
            assert_eq!(drawn, vec![0, 0, 0, 1]);
        }

        it "keeps using the newest surviving sketch after undo" {
            kernel.ok(json!({"command": "create_sketch", "name": "A"}));
            kernel.ok(json!({"command": "create_sketch", "name": "B"}));
            kernel.ok(json!({"command": "undo"}));
            kernel.ok(json!({"command": "create_sketch", "name": "C"}));

            kernel.ok(json!({"command": "draw_rectangle"}));

            let state = kernel.state();
            let names: Vec<_> = state.sketches.iter().map(|s| s.name.as_str()).collect();
            assert_eq!(names, vec!["A", "C"]);
            assert_eq!(state.sketches[1].curves.len(), 4);
        }

        it "fails circle without a sketch and never calls the kernel" {
            let error = kernel.err(json!({"command": "create_circle"}));

            assert_eq!(error, "No active sketch found");
            assert_eq!(kernel.mutations(), 0);
            assert!(kernel.state().is_empty());
        }

        it "places the rectangle in the named sketch" {
            kernel.ok(json!({"command": "create_sketch", "plane": "xy", "name": "S1"}));

            let result = kernel.ok(json!({
                "command": "draw_rectangle", "width": 10, "height": 5, "x": 0, "y": 0
            }));

            assert_eq!(result, "Drew rectangle at (0.0, 0.0) with width 10.0, height 5.0");
            let sketch = &kernel.state().sketches[0];
            assert_eq!(sketch.name, "S1");
            assert_eq!(sketch.profile_count(), 1);
        }

        it "rejects an unknown plane before any mutation" {
            let error = kernel.err(json!({"command": "create_sketch", "plane": "uv"}));

            assert_eq!(error, "Invalid plane: uv");
            assert_eq!(kernel.mutations(), 0);
        }
    }

    describe "profile resolution" {
        it "fails extrude on an empty document" {
            let error = kernel.err(json!({"command": "extrude", "distance": 5.0, "operation": "join"}));

            assert_eq!(error, "No active sketch found");
            assert_eq!(kernel.mutations(), 0);
        }

        it "fails revolve when the active sketch has no profile" {
            kernel.ok(json!({"command": "create_sketch"}));
            kernel.ok(json!({"command": "create_circle"}));
            kernel.ok(json!({"command": "create_sketch", "plane": "xz"}));

            let error = kernel.err(json!({"command": "revolve"}));

            assert_eq!(error, "No profiles found in sketch");
            assert!(kernel.state().features.is_empty());
        }

        it "revolves the active profile" {
            kernel.ok(json!({"command": "create_sketch"}));
            kernel.ok(json!({"command": "create_circle", "radius": 1, "center_x": 0, "center_y": 4}));

            let result = kernel.ok(json!({"command": "revolve", "angle": 180}));

            assert_eq!(result, "Revolved profile by 180.0 degrees");
            assert_eq!(kernel.state().feature_names(), vec!["Revolve1"]);
        }

        it "sweeps the active profile along the previous sketch" {
            kernel.ok(json!({"command": "create_sketch", "plane": "xz"}));
            kernel.ok(json!({"command": "draw_rectangle"}));
            kernel.ok(json!({"command": "create_sketch"}));
            kernel.ok(json!({"command": "create_circle", "radius": 1}));

            assert_eq!(kernel.ok(json!({"command": "sweep"})), "Created sweep feature");
            assert_eq!(kernel.state().bodies.len(), 1);
        }

        it "fails sweep without a profile" {
            kernel.ok(json!({"command": "create_sketch"}));

            assert_eq!(kernel.err(json!({"command": "sweep"})), "No profile for sweep");
        }

        it "lofts between the profiles of the last two features" {
            kernel.ok(json!({"command": "create_sketch"}));
            kernel.ok(json!({"command": "create_circle", "radius": 2}));
            kernel.ok(json!({"command": "extrude", "distance": 1}));
            kernel.ok(json!({"command": "create_sketch", "plane": "xz"}));
            kernel.ok(json!({"command": "create_circle", "radius": 1}));
            kernel.ok(json!({"command": "extrude", "distance": 1}));

            assert_eq!(kernel.ok(json!({"command": "loft"})), "Created loft feature");
            assert_eq!(kernel.state().feature_names(), vec!["Extrude1", "Extrude2", "Loft1"]);
        }

        it "fails loft when a recent feature carries no profile" {
            one_body(&mut kernel);
            kernel.ok(json!({"command": "fillet"}));

            let error = kernel.err(json!({"command": "loft"}));

            assert_eq!(error, "Need at least two profiles for loft");
            assert!(!kernel.calls.contains(&"loft"));
        }
    }

    describe "body resolution" {
        it "fails combine with one body and never calls the kernel" {
            one_body(&mut kernel);
            let before = kernel.mutations();

            let error = kernel.err(json!({"command": "combine"}));

            assert_eq!(error, "Need at least two bodies");
            assert_eq!(kernel.mutations(), before);
        }

        it "combines the last two bodies" {
            one_body(&mut kernel);
            kernel.ok(json!({"command": "copy_body"}));

            let result = kernel.ok(json!({"command": "combine", "operation": "intersect"}));

            assert_eq!(result, "Combined bodies with intersect operation");
            assert_eq!(kernel.state().body_names(), vec!["Body2"]);
        }

        it "fails measure with fewer than two bodies" {
            one_body(&mut kernel);

            assert_eq!(
                kernel.err(json!({"command": "measure_distance"})),
                "Need at least two entities to measure"
            );
        }

        it "fails pattern on an empty document" {
            assert_eq!(kernel.err(json!({"command": "pattern"})), "No body to pattern");
        }

        it "fails draft and fillet without a body" {
            assert_eq!(kernel.err(json!({"command": "add_draft"})), "No body found");
            assert_eq!(kernel.err(json!({"command": "fillet"})), "No body found");
            assert_eq!(kernel.mutations(), 0);
        }

        it "checks the body before the plane when splitting" {
            assert_eq!(kernel.err(json!({"command": "split_body"})), "No body found");

            one_body(&mut kernel);

            assert_eq!(kernel.err(json!({"command": "split_body"})), "No plane for splitting");
        }

        it "copies a body by name or the latest one" {
            one_body(&mut kernel);

            assert_eq!(kernel.ok(json!({"command": "copy_body", "name": "Body1"})), "Copied body Body1");
            assert_eq!(kernel.ok(json!({"command": "copy_body"})), "Copied last body");
            assert_eq!(kernel.err(json!({"command": "copy_body", "name": "Body9"})), "Body not found");
            assert_eq!(kernel.state().body_names(), vec!["Body1", "Body2", "Body3"]);
        }

        it "fails copy on an empty document" {
            assert_eq!(kernel.err(json!({"command": "copy_body"})), "No bodies to copy");
        }
    }

    describe "feature deletion" {
        it "fails for an unmatched name" {
            one_body(&mut kernel);

            let error = kernel.err(json!({"command": "delete_feature", "name": "Extrude7"}));

            assert_eq!(error, "Feature not found");
            assert_eq!(kernel.state().features.len(), 1);
        }

        it "removes exactly the most recent feature when unnamed" {
            one_body(&mut kernel);
            kernel.ok(json!({"command": "fillet"}));
            kernel.ok(json!({"command": "add_draft"}));

            assert_eq!(kernel.ok(json!({"command": "delete_feature"})), "Deleted last feature");
            assert_eq!(kernel.state().feature_names(), vec!["Extrude1", "Fillet1"]);
        }

        it "fails on an empty timeline" {
            assert_eq!(kernel.err(json!({"command": "delete_feature"})), "No features to delete");
        }
    }

    describe "request handling" {
        it "rejects unknown commands" {
            assert_eq!(kernel.err(json!({"command": "teleport"})), "Unknown command");
            assert_eq!(kernel.mutations(), 0);
        }

        it "does not deduplicate identical calls" {
            kernel.ok(json!({"command": "create_sketch"}));
            kernel.ok(json!({"command": "create_sketch"}));

            assert_eq!(kernel.state().sketches.len(), 2);
        }

        it "always builds offset planes and reports their offset" {
            let result = kernel.ok(json!({"command": "create_offset_plane", "offset": 2.5, "name": "Mid"}));

            assert_eq!(result, "Created offset plane at 2.5 cm");
            let plane = &kernel.state().planes[0];
            assert_eq!(plane.name, "Mid");
            assert_eq!(plane.base, PlaneRef::Builtin(BuiltinPlane::Xy));
        }
    }
}
