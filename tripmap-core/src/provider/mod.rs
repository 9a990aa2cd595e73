//! The seam between the orchestration layer and a mapping provider SDK.
//!
//! The orchestration only needs runtime bootstrap, surface measurement, map
//! construction, marker/polyline/popup handling, viewport control and one
//! callback-style `search` per routing capability. Providers implement these
//! traits; tests substitute recording doubles.

mod backend;
mod runtime;
mod view;

pub use backend::{RouteBackend, RouteRequest, SearchCallback, SearchPayload, SearchStatus};
pub use runtime::{
    ContainerHandle, Credentials, MapOptions, MapRuntime, RuntimeBootstrap, SurfaceProbe,
    SurfaceSize,
};
pub use view::{
    MapView, MarkerSpec, MarkerVisual, OverlayId, Padding, PolylineSpec, PopupSpec,
};
