//! AMap binding for the tripmap provider traits.
//!
//! [`AmapBootstrap`] fetches the keyed loader resource and yields an
//! [`AmapRuntime`]. Maps are rendered headlessly by [`HeadlessMap`], which
//! can export its scene as GeoJSON. Each routing capability is an
//! [`AmapRouteBackend`] calling the matching v3 direction service.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use tripmap_amap::{AmapBootstrap, AmapConfig, FixedSurface};
//! use tripmap_core::provider::Credentials;
//! use tripmap_core::{LngLat, Location, RouteMode};
//! use tripmap_map::{MapSession, SessionConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let bootstrap = Arc::new(AmapBootstrap::new(AmapConfig::new())?);
//! let session = MapSession::new(
//!     bootstrap.clone(),
//!     Credentials::new("api-key"),
//!     Arc::new(FixedSurface::new("map", 1024, 768)),
//!     SessionConfig::default(),
//! );
//! session.initialize("map").await?;
//! let stops = [
//!     Location::new("Hotel", LngLat::new(116.39, 39.90), "hotel"),
//!     Location::new("Museum", LngLat::new(116.40, 39.92), "attraction"),
//! ];
//! session.plan_route(&stops, RouteMode::Walking).await?;
//! if let Some(scene) = bootstrap.scene() {
//!     println!("{}", scene.to_geojson());
//! }
//! # Ok(())
//! # }
//! ```

mod backend;
mod bootstrap;
mod config;
mod scene;
pub mod wire;

pub use backend::{AmapRouteBackend, direction_path};
pub use bootstrap::{AmapBootstrap, AmapRuntime};
pub use config::{
    AmapBuildError, AmapConfig, DEFAULT_LOADER_URL, DEFAULT_REST_BASE_URL, DEFAULT_USER_AGENT,
    LOADER_VERSION,
};
pub use scene::{FixedSurface, HeadlessMap};
