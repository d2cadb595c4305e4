//! Command dispatcher.
//!
//! Maps each [`Command`] onto the document: default-filled parameters come
//! from the command record, operands come from [`crate::resolver`], and the
//! mutation itself goes through the [`GeometryKernel`]. A handler either
//! returns the human-readable result line or a [`CommandError`]; it never
//! calls the kernel once resolution has failed.

mod command;

use std::str::FromStr;

use thiserror::Error;

use crate::kernel::{Axis, FeatureOperation, GeometryKernel, KernelError};
use crate::models::*;
use crate::resolver::{self, ResolveError, Selection};

pub use command::*;

/// Why a command was not carried out.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Unknown command")]
    UnknownCommand,

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Invalid plane: {0}")]
    InvalidPlane(String),

    #[error(transparent)]
    Precondition(#[from] ResolveError),

    #[error(transparent)]
    Capability(#[from] KernelError),
}

/// Execute one command against `kernel` and describe what happened.
pub fn dispatch<K>(kernel: &mut K, command: &Command) -> Result<String, CommandError>
where
    K: GeometryKernel + ?Sized,
{
    let kind = command.kind();
    tracing::info!(command = %kind, "Dispatching command");

    let outcome = run(kernel, command);
    match &outcome {
        Ok(result) => tracing::debug!(command = %kind, result = %result, "Command succeeded"),
        Err(e) => tracing::warn!(command = %kind, error = %e, "Command rejected"),
    }
    outcome
}

fn run<K>(kernel: &mut K, command: &Command) -> Result<String, CommandError>
where
    K: GeometryKernel + ?Sized,
{
    match command {
        Command::CreateSketch(params) => {
            let plane = BuiltinPlane::from_str(&params.plane)
                .map_err(|_| CommandError::InvalidPlane(params.plane.clone()))?;
            kernel.add_sketch(plane, non_empty(&params.name))?;
            Ok(format!("Created sketch on {} plane", params.plane))
        }

        Command::CreateCircle(params) => {
            let sketch = resolver::active_sketch(kernel.state())?.id;
            tracing::debug!(%sketch, "Resolved active sketch");
            kernel.add_circle(
                sketch,
                Point2::new(params.center_x, params.center_y),
                params.radius,
            )?;
            Ok(format!(
                "Created circle with radius {} at ({}, {})",
                Real(params.radius),
                Real(params.center_x),
                Real(params.center_y)
            ))
        }

        Command::DrawRectangle(params) => {
            let sketch = resolver::active_sketch(kernel.state())?.id;
            tracing::debug!(%sketch, "Resolved active sketch");
            kernel.add_rectangle(
                sketch,
                Point2::new(params.x, params.y),
                Point2::new(params.x + params.width, params.y + params.height),
            )?;
            Ok(format!(
                "Drew rectangle at ({}, {}) with width {}, height {}",
                Real(params.x),
                Real(params.y),
                Real(params.width),
                Real(params.height)
            ))
        }

        Command::Revolve(params) => {
            let profile = resolver::active_profile(kernel.state())?;
            let operation = FeatureOperation::for_revolve(&params.operation);
            tracing::debug!(?profile, %operation, "Resolved revolve operands");
            kernel.revolve(profile, Axis::X, params.angle, operation)?;
            Ok(format!("Revolved profile by {} degrees", Real(params.angle)))
        }

        Command::AddDraft(params) => {
            let body = resolver::last_body(kernel.state())?.id;
            tracing::debug!(%body, "Resolved draft body");
            kernel.draft(body, params.angle)?;
            Ok(format!("Added draft angle of {} degrees", Real(params.angle)))
        }

        Command::SplitBody {} => {
            let operands = resolver::split_operands(kernel.state())?;
            let (body, plane) = (operands.body.id, operands.plane.id);
            tracing::debug!(%body, %plane, "Resolved split operands");
            kernel.split(body, plane)?;
            Ok("Split body into halves".to_string())
        }

        Command::Sweep {} => {
            let operands = resolver::sweep_operands(kernel.state())?;
            tracing::debug!(?operands, "Resolved sweep operands");
            kernel.sweep(operands.profile, operands.path)?;
            Ok("Created sweep feature".to_string())
        }

        Command::Loft {} => {
            let sections = resolver::loft_sections(kernel.state())?;
            tracing::debug!(?sections, "Resolved loft sections");
            kernel.loft(sections)?;
            Ok("Created loft feature".to_string())
        }

        Command::Fillet(params) => {
            let body = resolver::last_body(kernel.state())?.id;
            tracing::debug!(%body, "Resolved fillet body");
            kernel.fillet(body, params.radius)?;
            Ok(format!("Added fillet with radius {}", Real(params.radius)))
        }

        Command::Combine(params) => {
            let pair = resolver::last_two_bodies(kernel.state())?;
            let (target, tool) = (pair.target.id, pair.tool.id);
            let operation = FeatureOperation::for_combine(&params.operation);
            tracing::debug!(%target, %tool, %operation, "Resolved combine operands");
            kernel.combine(target, tool, operation)?;
            Ok(format!(
                "Combined bodies with {} operation",
                params.operation
            ))
        }

        Command::Pattern(params) => {
            let body = resolver::pattern_body(kernel.state())?.id;
            tracing::debug!(%body, "Resolved pattern body");
            kernel.pattern(body, Axis::X, params.quantity, params.distance)?;
            Ok(format!(
                "Created rectangular pattern with {} instances",
                params.quantity
            ))
        }

        Command::Undo {} => {
            kernel.undo()?;
            Ok("Undid last operation".to_string())
        }

        Command::DeleteFeature(params) => {
            let (id, result) =
                match resolver::feature_to_delete(kernel.state(), params.name.as_deref())? {
                    Selection::Named(feature) => {
                        (feature.id, format!("Deleted feature {}", feature.name))
                    }
                    Selection::Latest(feature) => (feature.id, "Deleted last feature".to_string()),
                };
            tracing::debug!(feature = %id, "Resolved feature to delete");
            kernel.delete_feature(id)?;
            Ok(result)
        }

        Command::CopyBody(params) => {
            let (id, result) = match resolver::body_to_copy(kernel.state(), params.name.as_deref())?
            {
                Selection::Named(body) => (body.id, format!("Copied body {}", body.name)),
                Selection::Latest(body) => (body.id, "Copied last body".to_string()),
            };
            tracing::debug!(body = %id, "Resolved body to copy");
            kernel.copy_body(id)?;
            Ok(result)
        }

        Command::CreateOffsetPlane(params) => {
            let base = resolver::offset_base(kernel.state());
            kernel.add_offset_plane(base, params.offset, non_empty(&params.name))?;
            Ok(format!("Created offset plane at {} cm", Real(params.offset)))
        }

        Command::MeasureDistance {} => {
            let pair = resolver::measure_pair(kernel.state())?;
            let (a, b) = (pair.target.id, pair.tool.id);
            let distance = kernel.measure_minimum_distance(a, b)?;
            Ok(format!("Minimum distance: {} cm", Real(distance)))
        }

        Command::ExportStl(params) => {
            let path = kernel.export_stl(&params.filename)?;
            tracing::info!(path = %path.display(), "Exported STL");
            Ok(format!("Exported STL to {}", params.filename))
        }

        Command::Extrude(params) => {
            let profile = resolver::active_profile(kernel.state())?;
            let operation = FeatureOperation::for_extrude(&params.operation);
            tracing::debug!(?profile, %operation, "Resolved extrude operands");
            kernel.extrude(profile, params.distance, operation)?;
            Ok(format!("Extruded profile by {} cm", Real(params.distance)))
        }
    }
}

fn non_empty(name: &Option<String>) -> Option<&str> {
    name.as_deref().filter(|n| !n.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::MemoryKernel;
    use serde_json::json;

    fn exec(kernel: &mut MemoryKernel, body: serde_json::Value) -> Result<String, CommandError> {
        let command = Command::from_json(body)?;
        dispatch(kernel, &command)
    }

    #[test]
    fn sketch_on_unknown_plane_is_rejected() {
        let mut kernel = MemoryKernel::new();
        let err = exec(&mut kernel, json!({"command": "create_sketch", "plane": "ab"}))
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid plane: ab");
        assert!(kernel.state().is_empty());
    }

    #[test]
    fn results_echo_parameters() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut kernel = MemoryKernel::with_export_dir(dir.path());
        assert_eq!(
            exec(&mut kernel, json!({"command": "create_sketch", "plane": "xz"})).unwrap(),
            "Created sketch on xz plane"
        );
        assert_eq!(
            exec(&mut kernel, json!({"command": "create_circle", "radius": 2.5})).unwrap(),
            "Created circle with radius 2.5 at (0.0, 0.0)"
        );
        assert_eq!(
            exec(&mut kernel, json!({"command": "extrude", "distance": 3})).unwrap(),
            "Extruded profile by 3.0 cm"
        );
        assert_eq!(
            exec(&mut kernel, json!({"command": "fillet"})).unwrap(),
            "Added fillet with radius 1.0"
        );
        assert_eq!(
            exec(&mut kernel, json!({"command": "export_stl", "filename": "part.stl"})).unwrap(),
            "Exported STL to part.stl"
        );
    }

    #[test]
    fn export_outside_export_dir_is_rejected() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut kernel = MemoryKernel::with_export_dir(dir.path());

        let err = exec(&mut kernel, json!({"command": "export_stl", "filename": "../part.stl"}))
            .unwrap_err();

        assert!(matches!(err, CommandError::Capability(KernelError::Export(_))));
    }

    #[test]
    fn combine_echoes_requested_keyword() {
        let mut kernel = MemoryKernel::new();
        exec(&mut kernel, json!({"command": "create_sketch"})).unwrap();
        exec(&mut kernel, json!({"command": "draw_rectangle"})).unwrap();
        exec(&mut kernel, json!({"command": "extrude"})).unwrap();
        exec(&mut kernel, json!({"command": "copy_body"})).unwrap();

        assert_eq!(
            exec(&mut kernel, json!({"command": "combine", "operation": "weld"})).unwrap(),
            "Combined bodies with weld operation"
        );
        assert_eq!(kernel.state().bodies.len(), 1);
    }

    #[test]
    fn named_delete_reports_the_name() {
        let mut kernel = MemoryKernel::new();
        exec(&mut kernel, json!({"command": "create_sketch"})).unwrap();
        exec(&mut kernel, json!({"command": "create_circle"})).unwrap();
        exec(&mut kernel, json!({"command": "extrude"})).unwrap();

        assert_eq!(
            exec(&mut kernel, json!({"command": "delete_feature", "name": "Extrude1"})).unwrap(),
            "Deleted feature Extrude1"
        );
        assert!(kernel.state().features.is_empty());
    }

    #[test]
    fn empty_name_means_latest() {
        let mut kernel = MemoryKernel::new();
        exec(&mut kernel, json!({"command": "create_sketch"})).unwrap();
        exec(&mut kernel, json!({"command": "create_circle"})).unwrap();
        exec(&mut kernel, json!({"command": "extrude"})).unwrap();

        assert_eq!(
            exec(&mut kernel, json!({"command": "copy_body", "name": ""})).unwrap(),
            "Copied last body"
        );
        assert_eq!(kernel.state().body_names(), vec!["Body1", "Body2"]);
    }
}
