//! One map's lifecycle from runtime load to teardown.

use std::sync::Arc;

use log::info;
use tripmap_core::provider::{Credentials, RuntimeBootstrap, SurfaceProbe};
use tripmap_core::{CapabilityState, CoordinateSequence, Location, MapError, RouteMode};

use crate::capability::{CapabilityInitializer, CapabilityReport, CapabilityTable};
use crate::config::SessionConfig;
use crate::container::ContainerReadinessGate;
use crate::loader::RuntimeLoader;
use crate::overlay::OverlayRegistry;
use crate::resolver::RouteResolver;

/// Ties the runtime loader, container gate, capability initializer,
/// overlay registry and route resolver to one map surface.
#[derive(Debug)]
pub struct MapSession {
    loader: RuntimeLoader,
    gate: ContainerReadinessGate,
    capabilities: Arc<CapabilityTable>,
    initializer: CapabilityInitializer,
    overlays: OverlayRegistry,
    resolver: RouteResolver,
    config: SessionConfig,
}

impl MapSession {
    /// Assemble a session. Nothing is loaded until
    /// [`initialize`](Self::initialize).
    pub fn new(
        bootstrap: Arc<dyn RuntimeBootstrap>,
        credentials: Credentials,
        probe: Arc<dyn SurfaceProbe>,
        config: SessionConfig,
    ) -> Self {
        let capabilities = Arc::new(CapabilityTable::default());
        Self {
            loader: RuntimeLoader::new(bootstrap, credentials),
            gate: ContainerReadinessGate::new(probe, config.container_backoff),
            initializer: CapabilityInitializer::new(Arc::clone(&capabilities)),
            overlays: OverlayRegistry::new(&config),
            resolver: RouteResolver::new(Arc::clone(&capabilities), config.transit_scope.clone()),
            capabilities,
            config,
        }
    }

    /// Load the runtime, build the map on `container_id` once it has a size,
    /// then load every routing capability.
    ///
    /// Repeated and concurrent calls share the work: the runtime loads once,
    /// the map is built once and capabilities initialize once.
    ///
    /// # Errors
    /// Returns [`MapError::RuntimeLoad`], [`MapError::ContainerMissing`] or
    /// [`MapError::MapConstruction`]. Capability failures are reported in
    /// the returned [`CapabilityReport`] instead.
    pub async fn initialize(&self, container_id: &str) -> Result<CapabilityReport, MapError> {
        let runtime = self.loader.ensure_runtime().await?;
        if !self.overlays.is_attached() {
            let container = self.gate.await_container(container_id).await?;
            let built = self
                .overlays
                .attach_with(|| runtime.create_map(&container, &self.config.map_options))?;
            if built {
                info!(
                    "map built on '{}' ({}x{})",
                    container.id, container.size.width, container.size.height
                );
            }
        }
        Ok(self.initializer.init_capabilities(runtime).await)
    }

    /// Overlays drawn on this session's map.
    #[must_use]
    pub const fn overlays(&self) -> &OverlayRegistry {
        &self.overlays
    }

    /// Current load state of `mode`'s routing capability.
    #[must_use]
    pub fn capability_state(&self, mode: RouteMode) -> CapabilityState {
        self.capabilities.state(mode)
    }

    /// Settings the session was built with.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Plan and draw a route through `locations`.
    ///
    /// # Errors
    /// See [`RouteResolver::plan_route`].
    pub async fn plan_route(
        &self,
        locations: &[Location],
        mode: RouteMode,
    ) -> Result<CoordinateSequence, MapError> {
        self.resolver
            .plan_route(&self.overlays, locations, mode)
            .await
    }

    /// Tear down overlays, the map, capability state and the runtime.
    ///
    /// A later [`initialize`](Self::initialize) starts from scratch.
    pub fn destroy(&self) {
        self.overlays.destroy();
        self.initializer.reset();
        self.loader.destroy();
        info!("map session destroyed");
    }
}
