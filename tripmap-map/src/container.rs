//! Waits for a rendering surface to be laid out before a map is built on it.

use std::sync::Arc;
use std::time::Duration;

use log::debug;
use tripmap_core::MapError;
use tripmap_core::provider::{ContainerHandle, SurfaceProbe};

/// Polls a [`SurfaceProbe`] until a surface reports non-zero dimensions.
///
/// A surface that exists but has zero width or height is not ready yet;
/// the gate sleeps for the configured backoff and measures again. There is
/// no attempt limit: dropping the future cancels the wait.
#[derive(Clone)]
pub struct ContainerReadinessGate {
    probe: Arc<dyn SurfaceProbe>,
    backoff: Duration,
}

impl std::fmt::Debug for ContainerReadinessGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerReadinessGate")
            .field("backoff", &self.backoff)
            .finish_non_exhaustive()
    }
}

impl ContainerReadinessGate {
    /// Create a gate that re-measures every `backoff`.
    pub fn new(probe: Arc<dyn SurfaceProbe>, backoff: Duration) -> Self {
        Self { probe, backoff }
    }

    /// Resolve once the surface `id` is renderable.
    ///
    /// # Errors
    /// Returns [`MapError::ContainerMissing`] when no surface named `id`
    /// exists at the time of a check.
    pub async fn await_container(&self, id: &str) -> Result<ContainerHandle, MapError> {
        let mut retries = 0_u32;
        loop {
            let size = self
                .probe
                .measure(id)
                .ok_or_else(|| MapError::ContainerMissing { id: id.to_owned() })?;
            if size.is_renderable() {
                debug!(
                    "container '{id}' ready at {}x{} after {retries} retries",
                    size.width, size.height
                );
                return Ok(ContainerHandle {
                    id: id.to_owned(),
                    size,
                    retries,
                });
            }
            retries = retries.saturating_add(1);
            debug!(
                "container '{id}' measures {}x{}; retry {retries} in {:?}",
                size.width, size.height, self.backoff
            );
            tokio::time::sleep(self.backoff).await;
        }
    }
}
