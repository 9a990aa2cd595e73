//! Core domain types for the tripmap integration layer.
//!
//! Locations, travel modes and coordinates are plain values. The
//! [`provider`] module defines the traits a mapping SDK binding implements,
//! and [`path`] turns the routing backends' divergent payloads into one
//! [`CoordinateSequence`].

mod coord;
mod error;
mod location;
mod mode;
pub mod path;
pub mod provider;

pub use coord::{CoordinateSequence, LngLat};
pub use error::MapError;
pub use location::{Location, LocationKind};
pub use mode::{CapabilityState, RouteMode};
pub use path::extract_path;
