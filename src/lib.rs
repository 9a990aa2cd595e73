//! Facade crate for the tripmap map integration layer.
//!
//! This crate re-exports the domain types and session orchestration, and
//! exposes the AMap provider behind the `amap` feature.

#![forbid(unsafe_code)]

pub use tripmap_core::provider;
pub use tripmap_core::{
    CapabilityState, CoordinateSequence, LngLat, Location, LocationKind, MapError, RouteMode,
    extract_path,
};
pub use tripmap_map::{
    CapabilityReport, ContainerReadinessGate, MapSession, OverlayRegistry, RouteResolver,
    RuntimeLoader, SessionConfig,
};

#[cfg(feature = "amap")]
pub use tripmap_amap::{AmapBootstrap, AmapConfig, FixedSurface, HeadlessMap};
