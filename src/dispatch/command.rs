//! Wire-level command records.
//!
//! A request body is a JSON object whose `command` field names the operation;
//! every other field is a scalar parameter with a default. Unknown extra
//! fields are ignored.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::CommandError;

/// Every operation the endpoint understands, with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    CreateSketch(CreateSketch),
    CreateCircle(CreateCircle),
    DrawRectangle(DrawRectangle),
    Revolve(Revolve),
    AddDraft(AddDraft),
    SplitBody {},
    Sweep {},
    Loft {},
    Fillet(Fillet),
    Combine(Combine),
    Pattern(Pattern),
    Undo {},
    DeleteFeature(DeleteFeature),
    CopyBody(CopyBody),
    CreateOffsetPlane(CreateOffsetPlane),
    MeasureDistance {},
    ExportStl(ExportStl),
    Extrude(Extrude),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSketch {
    #[serde(default = "default_plane")]
    pub plane: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCircle {
    #[serde(default = "default_circle_radius")]
    pub radius: f64,
    #[serde(default)]
    pub center_x: f64,
    #[serde(default)]
    pub center_y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawRectangle {
    #[serde(default = "default_rectangle_side")]
    pub width: f64,
    #[serde(default = "default_rectangle_side")]
    pub height: f64,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revolve {
    #[serde(default = "default_revolve_angle")]
    pub angle: f64,
    #[serde(default = "default_new_operation")]
    pub operation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddDraft {
    #[serde(default = "default_draft_angle")]
    pub angle: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fillet {
    #[serde(default = "default_fillet_radius")]
    pub radius: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combine {
    #[serde(default = "default_join_operation")]
    pub operation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    #[serde(
        default = "default_pattern_quantity",
        deserialize_with = "deserialize_count"
    )]
    pub quantity: u32,
    #[serde(default = "default_pattern_distance")]
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteFeature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CopyBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOffsetPlane {
    #[serde(default = "default_plane_offset")]
    pub offset: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportStl {
    #[serde(default = "default_export_filename")]
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extrude {
    #[serde(default = "default_extrude_distance")]
    pub distance: f64,
    #[serde(default = "default_new_operation")]
    pub operation: String,
}

pub fn default_plane() -> String {
    "xy".to_string()
}

pub fn default_circle_radius() -> f64 {
    5.0
}

pub fn default_rectangle_side() -> f64 {
    10.0
}

pub fn default_revolve_angle() -> f64 {
    360.0
}

pub fn default_draft_angle() -> f64 {
    2.0
}

pub fn default_fillet_radius() -> f64 {
    1.0
}

pub fn default_pattern_quantity() -> u32 {
    5
}

/// Counts arrive as JSON numbers; `5` and `5.0` both mean five.
fn deserialize_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    struct CountVisitor;

    impl<'de> Visitor<'de> for CountVisitor {
        type Value = u32;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a non-negative whole number")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u32, E> {
            u32::try_from(v).map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<u32, E> {
            u32::try_from(v).map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<u32, E> {
            if v.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&v) {
                Ok(v as u32)
            } else {
                Err(E::invalid_value(de::Unexpected::Float(v), &self))
            }
        }
    }

    deserializer.deserialize_any(CountVisitor)
}

pub fn default_pattern_distance() -> f64 {
    10.0
}

pub fn default_plane_offset() -> f64 {
    10.0
}

pub fn default_export_filename() -> String {
    "mold.stl".to_string()
}

pub fn default_extrude_distance() -> f64 {
    5.0
}

pub fn default_new_operation() -> String {
    "new".to_string()
}

pub fn default_join_operation() -> String {
    "join".to_string()
}

/// Command names, without parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    CreateSketch,
    CreateCircle,
    DrawRectangle,
    Revolve,
    AddDraft,
    SplitBody,
    Sweep,
    Loft,
    Fillet,
    Combine,
    Pattern,
    Undo,
    DeleteFeature,
    CopyBody,
    CreateOffsetPlane,
    MeasureDistance,
    ExportStl,
    Extrude,
}

impl CommandKind {
    pub const ALL: [CommandKind; 18] = [
        Self::CreateSketch,
        Self::CreateCircle,
        Self::DrawRectangle,
        Self::Revolve,
        Self::AddDraft,
        Self::SplitBody,
        Self::Sweep,
        Self::Loft,
        Self::Fillet,
        Self::Combine,
        Self::Pattern,
        Self::Undo,
        Self::DeleteFeature,
        Self::CopyBody,
        Self::CreateOffsetPlane,
        Self::MeasureDistance,
        Self::ExportStl,
        Self::Extrude,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateSketch => "create_sketch",
            Self::CreateCircle => "create_circle",
            Self::DrawRectangle => "draw_rectangle",
            Self::Revolve => "revolve",
            Self::AddDraft => "add_draft",
            Self::SplitBody => "split_body",
            Self::Sweep => "sweep",
            Self::Loft => "loft",
            Self::Fillet => "fillet",
            Self::Combine => "combine",
            Self::Pattern => "pattern",
            Self::Undo => "undo",
            Self::DeleteFeature => "delete_feature",
            Self::CopyBody => "copy_body",
            Self::CreateOffsetPlane => "create_offset_plane",
            Self::MeasureDistance => "measure_distance",
            Self::ExportStl => "export_stl",
            Self::Extrude => "extrude",
        }
    }
}

impl FromStr for CommandKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or(())
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Command {
    /// Parse a raw request body.
    pub fn from_slice(body: &[u8]) -> Result<Self, CommandError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| CommandError::InvalidRequest(format!("Invalid JSON: {}", e)))?;
        Self::from_json(value)
    }

    /// Parse a decoded request object. A missing or unrecognized `command`
    /// is reported as [`CommandError::UnknownCommand`] before any parameter
    /// is looked at.
    pub fn from_json(value: Value) -> Result<Self, CommandError> {
        let Value::Object(ref object) = value else {
            return Err(CommandError::InvalidRequest(
                "Request body must be a JSON object".to_string(),
            ));
        };

        let kind = object
            .get("command")
            .and_then(Value::as_str)
            .and_then(|name| CommandKind::from_str(name).ok())
            .ok_or(CommandError::UnknownCommand)?;

        serde_json::from_value(value).map_err(|e| {
            CommandError::InvalidRequest(format!("Invalid parameters for {}: {}", kind, e))
        })
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            Self::CreateSketch(_) => CommandKind::CreateSketch,
            Self::CreateCircle(_) => CommandKind::CreateCircle,
            Self::DrawRectangle(_) => CommandKind::DrawRectangle,
            Self::Revolve(_) => CommandKind::Revolve,
            Self::AddDraft(_) => CommandKind::AddDraft,
            Self::SplitBody {} => CommandKind::SplitBody,
            Self::Sweep {} => CommandKind::Sweep,
            Self::Loft {} => CommandKind::Loft,
            Self::Fillet(_) => CommandKind::Fillet,
            Self::Combine(_) => CommandKind::Combine,
            Self::Pattern(_) => CommandKind::Pattern,
            Self::Undo {} => CommandKind::Undo,
            Self::DeleteFeature(_) => CommandKind::DeleteFeature,
            Self::CopyBody(_) => CommandKind::CopyBody,
            Self::CreateOffsetPlane(_) => CommandKind::CreateOffsetPlane,
            Self::MeasureDistance {} => CommandKind::MeasureDistance,
            Self::ExportStl(_) => CommandKind::ExportStl,
            Self::Extrude(_) => CommandKind::Extrude,
        }
    }
}

/// Renders a real number the way clients of the endpoint expect:
/// integral values keep one decimal (`5.0`), others print in shortest form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Real(pub f64);

impl fmt::Display for Real {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.0;
        if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 {
            write!(f, "{:.1}", v)
        } else {
            write!(f, "{}", v)
        }
    }
}
