use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ProfileRef;

/// An entry in the linear modeling timeline.
///
/// Features are ordered by `index`. Deleting one removes it from the timeline
/// along with the bodies listed in `created_bodies`; the remaining features
/// keep their indices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    pub id: Uuid,
    pub name: String,
    /// Creation order within the timeline.
    pub index: u64,
    pub kind: FeatureKind,
    /// The sketch profile the feature was built from, if any.
    pub profile: Option<ProfileRef>,
    /// Bodies that exist because of this feature.
    pub created_bodies: Vec<Uuid>,
}

/// The modeling operation a feature records.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    Extrude,
    Revolve,
    Draft,
    Split,
    Sweep,
    Loft,
    Fillet,
    Combine,
    Pattern,
}

impl FeatureKind {
    /// Prefix used when naming timeline entries, e.g. `Extrude3`.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Extrude => "Extrude",
            Self::Revolve => "Revolve",
            Self::Draft => "Draft",
            Self::Split => "Split",
            Self::Sweep => "Sweep",
            Self::Loft => "Loft",
            Self::Fillet => "Fillet",
            Self::Combine => "Combine",
            Self::Pattern => "Pattern",
        }
    }
}
