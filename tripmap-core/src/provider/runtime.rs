//! Runtime bootstrap, rendering surfaces and map construction.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use super::{MapView, RouteBackend};
use crate::{LngLat, MapError, RouteMode};

/// Provider credentials read from configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// API key the bootstrap resource is keyed by.
    pub api_key: String,
    /// Optional security code paired with the key.
    pub security_code: Option<String>,
}

impl Credentials {
    /// Credentials consisting of an API key only.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            security_code: None,
        }
    }

    /// Attach a security code.
    #[must_use]
    pub fn with_security_code(mut self, code: impl Into<String>) -> Self {
        self.security_code = Some(code.into());
        self
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field(
                "security_code",
                &self.security_code.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Measured size of a rendering surface, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl SurfaceSize {
    /// Construct a size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A map can only be laid out on a surface with both dimensions set.
    #[must_use]
    pub const fn is_renderable(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Looks up rendering surfaces by identifier.
pub trait SurfaceProbe: Send + Sync {
    /// Measure the surface named `id`, or `None` if it does not exist.
    fn measure(&self, id: &str) -> Option<SurfaceSize>;
}

/// A surface that passed the readiness gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHandle {
    /// Surface identifier.
    pub id: String,
    /// Size measured on the successful check.
    pub size: SurfaceSize,
    /// Number of zero-size checks before the surface became ready.
    pub retries: u32,
}

/// Initial view settings for a new map.
#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    /// Initial center.
    pub center: LngLat,
    /// Initial zoom level.
    pub zoom: f64,
    /// Provider view mode, e.g. `"3D"`.
    pub view_mode: String,
    /// Provider style URI.
    pub style: String,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            center: LngLat::new(116.397_428, 39.909_23),
            zoom: 12.0,
            view_mode: "3D".to_owned(),
            style: "amap://styles/normal".to_owned(),
        }
    }
}

impl MapOptions {
    /// Options centered on `center` at `zoom`.
    #[must_use]
    pub fn centered(center: LngLat, zoom: f64) -> Self {
        Self {
            center,
            zoom,
            ..Self::default()
        }
    }
}

/// Loads the provider runtime, e.g. by injecting its bootstrap script.
#[async_trait]
pub trait RuntimeBootstrap: Send + Sync {
    /// Load the runtime keyed by `credentials`.
    ///
    /// # Errors
    /// Returns [`MapError::RuntimeLoad`] when the bootstrap resource cannot
    /// be fetched or the credentials are rejected.
    async fn load(&self, credentials: &Credentials) -> Result<Arc<dyn MapRuntime>, MapError>;
}

/// A loaded provider runtime.
#[async_trait]
pub trait MapRuntime: Send + Sync {
    /// Construct a map on a ready surface.
    ///
    /// # Errors
    /// Returns [`MapError::MapConstruction`] when the provider refuses.
    fn create_map(
        &self,
        container: &ContainerHandle,
        options: &MapOptions,
    ) -> Result<Arc<dyn MapView>, MapError>;

    /// Load the routing plugin for `mode`.
    ///
    /// # Errors
    /// Returns the provider's diagnostic when the plugin fails to load.
    async fn load_capability(&self, mode: RouteMode) -> Result<Arc<dyn RouteBackend>, String>;

    /// Release provider resources. Called once when the loader is destroyed.
    fn destroy(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_dimension_is_not_renderable() {
        assert!(!SurfaceSize::new(0, 300).is_renderable());
        assert!(!SurfaceSize::new(300, 0).is_renderable());
        assert!(SurfaceSize::new(1, 1).is_renderable());
    }

    #[test]
    fn debug_redacts_credentials() {
        let credentials = Credentials::new("secret-key").with_security_code("secret-code");
        let rendered = format!("{credentials:?}");
        assert!(!rendered.contains("secret"));
    }
}
