//! Operand resolution.
//!
//! Commands arrive with scalar parameters only. This module decides which
//! document entities they act on, reading a [`DocumentState`] and never
//! mutating it. Every rule is "most recent wins" by creation index:
//!
//! | family | rule |
//! |---|---|
//! | circle, rectangle | highest-index sketch |
//! | extrude, revolve | profile 0 of the highest-index sketch |
//! | sweep | profile 0 of the active sketch, curve 0 of the sketch before it |
//! | loft | profiles carried by the last two timeline features |
//! | draft, fillet, pattern | highest-index body |
//! | combine, measure | two highest-index bodies |
//! | split | highest-index body and lowest-index construction plane |
//! | offset plane | built-in xy plane |
//! | delete feature, copy body | first exact name match, else highest index |
//!
//! The sweep and loft rules pick geometry by fixed relative position. A
//! document with unrelated sketches or features in between resolves to the
//! wrong operands; callers get whatever those positions hold.

use thiserror::Error;

use crate::models::*;

/// Why a command's operands could not be inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("No active sketch found")]
    NoActiveSketch,

    #[error("No profiles found in sketch")]
    NoProfiles,

    #[error("No profile for sweep")]
    NoSweepProfile,

    #[error("No path curve for sweep")]
    NoSweepPath,

    #[error("Need at least two profiles for loft")]
    TooFewLoftProfiles,

    #[error("No body found")]
    NoBody,

    #[error("No body to pattern")]
    NoPatternBody,

    #[error("Body not found")]
    BodyNotFound,

    #[error("No bodies to copy")]
    NoBodiesToCopy,

    #[error("Need at least two bodies")]
    TooFewBodies,

    #[error("Need at least two entities to measure")]
    TooFewMeasureEntities,

    #[error("No plane for splitting")]
    NoSplitPlane,

    #[error("Feature not found")]
    FeatureNotFound,

    #[error("No features to delete")]
    NoFeatures,
}

pub type ResolveResult<T> = Result<T, ResolveError>;

/// Profile and path for a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepOperands {
    pub profile: ProfileRef,
    pub path: CurveRef,
}

/// Target and tool bodies for a two-body operation.
#[derive(Debug, Clone, Copy)]
pub struct BodyPair<'a> {
    /// Most recent body.
    pub target: &'a Body,
    /// Second most recent body.
    pub tool: &'a Body,
}

/// Body and plane for a split.
#[derive(Debug, Clone, Copy)]
pub struct SplitOperands<'a> {
    pub body: &'a Body,
    pub plane: &'a ConstructionPlane,
}

/// A named-or-latest lookup result, remembering which way it resolved.
#[derive(Debug, Clone, Copy)]
pub enum Selection<'a, T> {
    Named(&'a T),
    Latest(&'a T),
}

impl<'a, T> Selection<'a, T> {
    pub fn entity(&self) -> &'a T {
        match *self {
            Selection::Named(entity) | Selection::Latest(entity) => entity,
        }
    }
}

/// Sketches ordered from most to least recent.
fn sketches_by_recency(state: &DocumentState) -> Vec<&Sketch> {
    let mut sketches: Vec<&Sketch> = state.sketches.iter().collect();
    sketches.sort_by(|a, b| b.index.cmp(&a.index));
    sketches
}

/// Bodies ordered from most to least recent.
fn bodies_by_recency(state: &DocumentState) -> Vec<&Body> {
    let mut bodies: Vec<&Body> = state.bodies.iter().collect();
    bodies.sort_by(|a, b| b.index.cmp(&a.index));
    bodies
}

/// Treats an empty name as no name at all.
fn requested_name(name: Option<&str>) -> Option<&str> {
    name.filter(|n| !n.is_empty())
}

pub fn active_sketch(state: &DocumentState) -> ResolveResult<&Sketch> {
    state
        .sketches
        .iter()
        .max_by_key(|s| s.index)
        .ok_or(ResolveError::NoActiveSketch)
}

/// First profile of the active sketch, for extrude and revolve.
pub fn active_profile(state: &DocumentState) -> ResolveResult<ProfileRef> {
    active_sketch(state)?
        .profile_ref(0)
        .ok_or(ResolveError::NoProfiles)
}

/// Profile of the active sketch swept along the first curve of the sketch
/// created before it. With a single sketch, the path comes from that sketch.
pub fn sweep_operands(state: &DocumentState) -> ResolveResult<SweepOperands> {
    let sketches = sketches_by_recency(state);
    let active = sketches.first().ok_or(ResolveError::NoActiveSketch)?;
    let profile = active.profile_ref(0).ok_or(ResolveError::NoSweepProfile)?;
    let path_sketch = sketches.get(1).unwrap_or(active);
    let path = path_sketch.curve_ref(0).ok_or(ResolveError::NoSweepPath)?;
    Ok(SweepOperands { profile, path })
}

/// Profiles carried by the two most recent timeline features, oldest first.
pub fn loft_sections(state: &DocumentState) -> ResolveResult<[ProfileRef; 2]> {
    let mut features: Vec<&Feature> = state.features.iter().collect();
    features.sort_by_key(|f| f.index);
    let recent = &features[features.len().saturating_sub(2)..];
    match recent
        .iter()
        .filter_map(|f| f.profile)
        .collect::<Vec<_>>()
        .as_slice()
    {
        [first, second] => Ok([*first, *second]),
        _ => Err(ResolveError::TooFewLoftProfiles),
    }
}

pub fn last_body(state: &DocumentState) -> ResolveResult<&Body> {
    state
        .bodies
        .iter()
        .max_by_key(|b| b.index)
        .ok_or(ResolveError::NoBody)
}

pub fn pattern_body(state: &DocumentState) -> ResolveResult<&Body> {
    last_body(state).map_err(|_| ResolveError::NoPatternBody)
}

pub fn last_two_bodies(state: &DocumentState) -> ResolveResult<BodyPair<'_>> {
    match bodies_by_recency(state).as_slice() {
        [target, tool, ..] => Ok(BodyPair {
            target: *target,
            tool: *tool,
        }),
        _ => Err(ResolveError::TooFewBodies),
    }
}

pub fn measure_pair(state: &DocumentState) -> ResolveResult<BodyPair<'_>> {
    last_two_bodies(state).map_err(|_| ResolveError::TooFewMeasureEntities)
}

/// The lowest-index user construction plane.
pub fn first_plane(state: &DocumentState) -> Option<&ConstructionPlane> {
    state.planes.iter().min_by_key(|p| p.index)
}

/// Last body split by the first construction plane. The body is checked
/// before the plane.
pub fn split_operands(state: &DocumentState) -> ResolveResult<SplitOperands<'_>> {
    let body = last_body(state)?;
    let plane = first_plane(state).ok_or(ResolveError::NoSplitPlane)?;
    Ok(SplitOperands { body, plane })
}

/// Base for new offset planes. Always the built-in xy plane.
pub fn offset_base(_state: &DocumentState) -> PlaneRef {
    PlaneRef::Builtin(BuiltinPlane::Xy)
}

/// The named feature, or the most recent one when no name is given.
pub fn feature_to_delete<'a>(
    state: &'a DocumentState,
    name: Option<&str>,
) -> ResolveResult<Selection<'a, Feature>> {
    match requested_name(name) {
        Some(name) => state
            .features
            .iter()
            .find(|f| f.name == name)
            .map(Selection::Named)
            .ok_or(ResolveError::FeatureNotFound),
        None => state
            .features
            .iter()
            .max_by_key(|f| f.index)
            .map(Selection::Latest)
            .ok_or(ResolveError::NoFeatures),
    }
}

/// The named body, or the most recent one when no name is given.
pub fn body_to_copy<'a>(
    state: &'a DocumentState,
    name: Option<&str>,
) -> ResolveResult<Selection<'a, Body>> {
    match requested_name(name) {
        Some(name) => state
            .bodies
            .iter()
            .find(|b| b.name == name)
            .map(Selection::Named)
            .ok_or(ResolveError::BodyNotFound),
        None => state
            .bodies
            .iter()
            .max_by_key(|b| b.index)
            .map(Selection::Latest)
            .ok_or(ResolveError::NoBodiesToCopy),
    }
}
