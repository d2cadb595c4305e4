//! Request types for MCP tools.
//!
//! Each request mirrors one endpoint command. `into_command` applies the
//! tool's documented ranges before anything is sent.

use rmcp::schemars::JsonSchema;
use rmcp::ErrorData as McpError;
use serde::Deserialize;

use crate::dispatch::{self, Command};

// ============================================================
// Validation
// ============================================================

const PLANES: [&str; 3] = ["xy", "xz", "yz"];
const REVOLVE_OPERATIONS: [&str; 2] = ["new", "join"];
const COMBINE_OPERATIONS: [&str; 3] = ["join", "cut", "intersect"];
const EXTRUDE_OPERATIONS: [&str; 4] = ["new", "join", "cut", "intersect"];

fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<(), McpError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(McpError::invalid_params(
            format!(
                "{} must be between {} and {}, got {}",
                field, min, max, value
            ),
            None,
        ))
    }
}

fn check_keyword(field: &str, value: &str, allowed: &[&str]) -> Result<(), McpError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(McpError::invalid_params(
            format!(
                "{} must be one of {}, got '{}'",
                field,
                allowed.join(", "),
                value
            ),
            None,
        ))
    }
}

/// Empty names are not sent at all.
fn optional_name(name: Option<String>) -> Option<String> {
    name.filter(|n| !n.is_empty())
}

// ============================================================
// Request Types
// ============================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateSketchRequest {
    #[schemars(description = "Base plane for the sketch: 'xy', 'xz' or 'yz'")]
    #[serde(default = "dispatch::default_plane")]
    pub plane: String,
    #[schemars(description = "Optional sketch name")]
    #[serde(default)]
    pub name: Option<String>,
}

impl CreateSketchRequest {
    pub fn into_command(self) -> Result<Command, McpError> {
        check_keyword("plane", &self.plane, &PLANES)?;
        Ok(Command::CreateSketch(dispatch::CreateSketch {
            plane: self.plane,
            name: optional_name(self.name),
        }))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateCircleRequest {
    #[schemars(description = "Circle radius in cm", range(min = 0.1, max = 50.0))]
    #[serde(default = "dispatch::default_circle_radius")]
    pub radius: f64,
    #[schemars(description = "Center X coordinate in sketch space")]
    #[serde(default)]
    pub center_x: f64,
    #[schemars(description = "Center Y coordinate in sketch space")]
    #[serde(default)]
    pub center_y: f64,
}

impl CreateCircleRequest {
    pub fn into_command(self) -> Result<Command, McpError> {
        check_range("radius", self.radius, 0.1, 50.0)?;
        Ok(Command::CreateCircle(dispatch::CreateCircle {
            radius: self.radius,
            center_x: self.center_x,
            center_y: self.center_y,
        }))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DrawRectangleRequest {
    #[schemars(description = "Rectangle width in cm", range(min = 0.1, max = 100.0))]
    #[serde(default = "dispatch::default_rectangle_side")]
    pub width: f64,
    #[schemars(description = "Rectangle height in cm", range(min = 0.1, max = 100.0))]
    #[serde(default = "dispatch::default_rectangle_side")]
    pub height: f64,
    #[schemars(description = "X coordinate of the lower-left corner")]
    #[serde(default)]
    pub x: f64,
    #[schemars(description = "Y coordinate of the lower-left corner")]
    #[serde(default)]
    pub y: f64,
}

impl DrawRectangleRequest {
    pub fn into_command(self) -> Result<Command, McpError> {
        check_range("width", self.width, 0.1, 100.0)?;
        check_range("height", self.height, 0.1, 100.0)?;
        Ok(Command::DrawRectangle(dispatch::DrawRectangle {
            width: self.width,
            height: self.height,
            x: self.x,
            y: self.y,
        }))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RevolveRequest {
    #[schemars(description = "Revolution angle in degrees", range(min = 0.0, max = 360.0))]
    #[serde(default = "dispatch::default_revolve_angle")]
    pub angle: f64,
    #[schemars(description = "'new' for a new body or 'join' to merge with the last body")]
    #[serde(default = "dispatch::default_new_operation")]
    pub operation: String,
}

impl RevolveRequest {
    pub fn into_command(self) -> Result<Command, McpError> {
        check_range("angle", self.angle, 0.0, 360.0)?;
        check_keyword("operation", &self.operation, &REVOLVE_OPERATIONS)?;
        Ok(Command::Revolve(dispatch::Revolve {
            angle: self.angle,
            operation: self.operation,
        }))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddDraftRequest {
    #[schemars(description = "Draft angle in degrees", range(min = 0.0, max = 10.0))]
    #[serde(default = "dispatch::default_draft_angle")]
    pub angle: f64,
}

impl AddDraftRequest {
    pub fn into_command(self) -> Result<Command, McpError> {
        check_range("angle", self.angle, 0.0, 10.0)?;
        Ok(Command::AddDraft(dispatch::AddDraft { angle: self.angle }))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FilletRequest {
    #[schemars(description = "Fillet radius in cm", range(min = 0.1, max = 10.0))]
    #[serde(default = "dispatch::default_fillet_radius")]
    pub radius: f64,
}

impl FilletRequest {
    pub fn into_command(self) -> Result<Command, McpError> {
        check_range("radius", self.radius, 0.1, 10.0)?;
        Ok(Command::Fillet(dispatch::Fillet {
            radius: self.radius,
        }))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CombineRequest {
    #[schemars(description = "Boolean operation: 'join', 'cut' or 'intersect'")]
    #[serde(default = "dispatch::default_join_operation")]
    pub operation: String,
}

impl CombineRequest {
    pub fn into_command(self) -> Result<Command, McpError> {
        check_keyword("operation", &self.operation, &COMBINE_OPERATIONS)?;
        Ok(Command::Combine(dispatch::Combine {
            operation: self.operation,
        }))
    }
}

fn default_pattern_quantity() -> i64 {
    i64::from(dispatch::default_pattern_quantity())
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PatternRequest {
    #[schemars(description = "Number of instances, original included", range(min = 2, max = 50))]
    #[serde(default = "default_pattern_quantity")]
    pub quantity: i64,
    #[schemars(description = "Spacing between instances in cm", range(min = 1.0, max = 100.0))]
    #[serde(default = "dispatch::default_pattern_distance")]
    pub distance: f64,
}

impl PatternRequest {
    pub fn into_command(self) -> Result<Command, McpError> {
        let quantity = u32::try_from(self.quantity)
            .ok()
            .filter(|q| (2..=50).contains(q))
            .ok_or_else(|| {
                McpError::invalid_params(
                    format!("quantity must be between 2 and 50, got {}", self.quantity),
                    None,
                )
            })?;
        check_range("distance", self.distance, 1.0, 100.0)?;
        Ok(Command::Pattern(dispatch::Pattern {
            quantity,
            distance: self.distance,
        }))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteFeatureRequest {
    #[schemars(description = "Timeline feature to delete; the most recent one when omitted")]
    #[serde(default)]
    pub name: Option<String>,
}

impl DeleteFeatureRequest {
    pub fn into_command(self) -> Command {
        Command::DeleteFeature(dispatch::DeleteFeature {
            name: optional_name(self.name),
        })
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CopyBodyRequest {
    #[schemars(description = "Body to copy; the most recent one when omitted")]
    #[serde(default)]
    pub name: Option<String>,
}

impl CopyBodyRequest {
    pub fn into_command(self) -> Command {
        Command::CopyBody(dispatch::CopyBody {
            name: optional_name(self.name),
        })
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateOffsetPlaneRequest {
    #[schemars(description = "Offset from the XY plane in cm")]
    #[serde(default = "dispatch::default_plane_offset")]
    pub offset: f64,
    #[schemars(description = "Optional plane name")]
    #[serde(default)]
    pub name: Option<String>,
}

impl CreateOffsetPlaneRequest {
    pub fn into_command(self) -> Command {
        Command::CreateOffsetPlane(dispatch::CreateOffsetPlane {
            offset: self.offset,
            name: optional_name(self.name),
        })
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExportStlRequest {
    #[schemars(description = "Output filename; relative names land in the server's export directory")]
    #[serde(default = "dispatch::default_export_filename")]
    pub filename: String,
}

impl ExportStlRequest {
    pub fn into_command(self) -> Command {
        Command::ExportStl(dispatch::ExportStl {
            filename: self.filename,
        })
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExtrudeRequest {
    #[schemars(description = "Extrusion distance in cm", range(min = 0.1, max = 50.0))]
    #[serde(default = "dispatch::default_extrude_distance")]
    pub distance: f64,
    #[schemars(description = "'new', 'join', 'cut' or 'intersect'")]
    #[serde(default = "dispatch::default_new_operation")]
    pub operation: String,
}

impl ExtrudeRequest {
    pub fn into_command(self) -> Result<Command, McpError> {
        check_range("distance", self.distance, 0.1, 50.0)?;
        check_keyword("operation", &self.operation, &EXTRUDE_OPERATIONS)?;
        Ok(Command::Extrude(dispatch::Extrude {
            distance: self.distance,
            operation: self.operation,
        }))
    }
}
