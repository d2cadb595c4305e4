//! Document state model for cadlink.
//!
//! # Core Concepts
//!
//! A CAD document is four ordered entity collections, each entry stamped
//! with a creation index that never changes:
//!
//! - [`Sketch`]: 2D geometry on a built-in plane. Closed curves yield [`Profile`]s.
//! - [`ConstructionPlane`]: user-created offset planes. The three orthogonal
//!   planes are the [`BuiltinPlane`] enumeration and are never stored.
//! - [`Feature`]: the linear modeling timeline (extrude, revolve, fillet, ...).
//! - [`Body`]: solids produced by features.
//!
//! The collections are only ever mutated by a geometry kernel. Everything
//! else reads a [`DocumentState`] and recomputes "active" or "last" entities
//! from it on demand.

mod body;
mod feature;
mod plane;
mod sketch;
mod state;

pub use body::*;
pub use feature::*;
pub use plane::*;
pub use sketch::*;
pub use state::*;
