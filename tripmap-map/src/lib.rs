//! Orchestration of an asynchronously loaded mapping provider.
//!
//! Responsibilities:
//! - Load the provider runtime once and share the in-flight load.
//! - Defer map construction until the target surface has a size.
//! - Load the three routing capabilities independently and join them.
//! - Own markers, paths and popups; keep at most one marker highlighted.
//! - Resolve multi-modal route requests into one drawn path.
//!
//! Boundaries:
//! - Provider specifics live behind `tripmap_core::provider` traits.
//! - No persistence, geocoding or pathfinding of its own.
//!
//! Invariants:
//! - Locks are never held across an `.await`.
//! - Path overlays are cleared before a new one is drawn.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use tripmap_core::provider::{Credentials, RuntimeBootstrap, SurfaceProbe};
//! use tripmap_core::{LngLat, Location, MapError, RouteMode};
//! use tripmap_map::{MapSession, SessionConfig};
//!
//! async fn plan(
//!     bootstrap: Arc<dyn RuntimeBootstrap>,
//!     probe: Arc<dyn SurfaceProbe>,
//! ) -> Result<(), MapError> {
//!     let session = MapSession::new(
//!         bootstrap,
//!         Credentials::new("api-key"),
//!         probe,
//!         SessionConfig::default(),
//!     );
//!     session.initialize("map").await?;
//!     let stops = [
//!         Location::new("Start", LngLat::new(116.39, 39.90), "hotel"),
//!         Location::new("End", LngLat::new(116.40, 39.92), "attraction"),
//!     ];
//!     let path = session.plan_route(&stops, RouteMode::Driving).await?;
//!     println!("{} points", path.len());
//!     Ok(())
//! }
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

mod capability;
mod config;
mod container;
mod loader;
mod overlay;
mod resolver;
mod search;
mod session;

#[doc(hidden)]
pub mod test_support;

pub use capability::{CapabilityInitializer, CapabilityOutcome, CapabilityReport, CapabilityTable};
pub use config::{
    DEFAULT_CONTAINER_BACKOFF, DEFAULT_FIT_PADDING, DEFAULT_HIGHLIGHT_ZOOM, NATIONWIDE_SCOPE,
    SessionConfig,
};
pub use container::ContainerReadinessGate;
pub use loader::RuntimeLoader;
pub use overlay::{Marker, MarkerHandle, OverlayRegistry, PathHandle, PathOverlay, popup_content};
pub use resolver::RouteResolver;
pub use search::search_route;
pub use session::MapSession;

/// Lock a mutex, recovering the data if a previous holder panicked.
///
/// Every critical section in this crate leaves its state consistent before
/// calling out, so a poisoned lock still guards valid data.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
