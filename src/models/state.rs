use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Body, ConstructionPlane, Feature, Sketch};

/// The observable contents of a CAD document.
///
/// Each collection is kept in creation order. Entries may disappear (delete,
/// undo, a combine consuming its tool body) but surviving entries never
/// change their `index`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentState {
    pub sketches: Vec<Sketch>,
    pub planes: Vec<ConstructionPlane>,
    pub features: Vec<Feature>,
    pub bodies: Vec<Body>,
}

impl DocumentState {
    pub fn is_empty(&self) -> bool {
        self.sketches.is_empty()
            && self.planes.is_empty()
            && self.features.is_empty()
            && self.bodies.is_empty()
    }

    pub fn sketch(&self, id: Uuid) -> Option<&Sketch> {
        self.sketches.iter().find(|s| s.id == id)
    }

    pub fn plane(&self, id: Uuid) -> Option<&ConstructionPlane> {
        self.planes.iter().find(|p| p.id == id)
    }

    pub fn feature(&self, id: Uuid) -> Option<&Feature> {
        self.features.iter().find(|f| f.id == id)
    }

    pub fn body(&self, id: Uuid) -> Option<&Body> {
        self.bodies.iter().find(|b| b.id == id)
    }

    pub fn body_names(&self) -> Vec<&str> {
        self.bodies.iter().map(|b| b.name.as_str()).collect()
    }

    pub fn feature_names(&self) -> Vec<&str> {
        self.features.iter().map(|f| f.name.as_str()).collect()
    }
}
