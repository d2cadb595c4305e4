use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One of the three orthogonal origin planes every document has.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinPlane {
    Xy,
    Xz,
    Yz,
}

impl BuiltinPlane {
    pub const ALL: [BuiltinPlane; 3] = [Self::Xy, Self::Xz, Self::Yz];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Xy => "xy",
            Self::Xz => "xz",
            Self::Yz => "yz",
        }
    }
}

impl FromStr for BuiltinPlane {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|plane| plane.as_str() == s)
            .ok_or(())
    }
}

impl fmt::Display for BuiltinPlane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A plane a command can act on: a built-in origin plane or a user plane.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlaneRef {
    Builtin(BuiltinPlane),
    Construction(Uuid),
}

/// A user-created construction plane, offset from a base plane.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstructionPlane {
    pub id: Uuid,
    pub name: String,
    /// Creation order within the construction plane collection.
    pub index: u64,
    pub base: PlaneRef,
    /// Offset along the base plane's normal, in cm.
    pub offset: f64,
}
