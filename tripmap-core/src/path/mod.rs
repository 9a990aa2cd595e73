//! Normalise heterogeneous backend route payloads into one coordinate
//! sequence.
//!
//! The three routing modes report their geometry in incompatible shapes and
//! mix point encodings within one response. [`extract_path`] hides both
//! behind a single mode-keyed function so callers stay mode-agnostic.

mod extract;
mod raw;

pub use extract::extract_path;
pub use raw::{
    PointAccessor, RawPoint, RawRoute, RawStep, RoutePayload, TransitLeg, TransitSegment,
    WalkingLeg,
};
