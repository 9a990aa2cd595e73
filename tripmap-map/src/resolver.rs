//! Turns an ordered list of locations into a drawn route.

use std::sync::Arc;

use log::{debug, info, warn};
use tripmap_core::provider::{RouteBackend, RouteRequest, SearchPayload, SearchStatus};
use tripmap_core::{CoordinateSequence, Location, MapError, RouteMode, extract_path};

use crate::capability::CapabilityTable;
use crate::overlay::OverlayRegistry;
use crate::search::search_route;

/// Fallback diagnostic when a failing backend sends none.
const NO_DIAGNOSTIC: &str = "route search failed";

/// Resolves route requests against the loaded routing capabilities.
#[derive(Debug)]
pub struct RouteResolver {
    capabilities: Arc<CapabilityTable>,
    transit_scope: String,
}

impl RouteResolver {
    /// Create a resolver reading backends from `capabilities`. Transit
    /// searches are scoped to `transit_scope`.
    pub fn new(capabilities: Arc<CapabilityTable>, transit_scope: impl Into<String>) -> Self {
        Self {
            capabilities,
            transit_scope: transit_scope.into(),
        }
    }

    /// Plan a route through `locations` in order and draw it on `overlays`.
    ///
    /// The first location is the origin and the last the destination.
    /// Driving and walking pass the ones in between as waypoints; transit
    /// ignores them. Existing paths are cleared once the request is valid,
    /// before the backend is queried.
    ///
    /// A transit search that succeeds without any path points is not an
    /// error: nothing is drawn, the view is fitted to the markers instead
    /// and an empty sequence is returned.
    ///
    /// # Errors
    /// - [`MapError::InsufficientWaypoints`] for fewer than two locations.
    /// - [`MapError::CapabilityUnavailable`] when `mode` is not ready.
    /// - [`MapError::RouteNotFound`] when the backend reports anything but
    ///   completion.
    /// - [`MapError::PathExtraction`] when a driving or walking search
    ///   completes without path points.
    pub async fn plan_route(
        &self,
        overlays: &OverlayRegistry,
        locations: &[Location],
        mode: RouteMode,
    ) -> Result<CoordinateSequence, MapError> {
        let request = self.build_request(locations, mode)?;
        let backend = self.ready_backend(mode)?;
        overlays.clear_paths();

        debug!(
            "searching {mode} route through {} locations",
            locations.len()
        );
        let (status, payload) = search_route(backend.as_ref(), request).await;
        let path = interpret(mode, &status, &payload)?;

        if path.is_empty() {
            warn!("{mode} search completed without a path; showing markers instead");
            overlays.fit_to_markers();
            return Ok(path);
        }
        info!("{mode} route resolved with {} points", path.len());
        overlays.draw_path(path.clone(), mode);
        Ok(path)
    }

    fn build_request(
        &self,
        locations: &[Location],
        mode: RouteMode,
    ) -> Result<RouteRequest, MapError> {
        let (Some(first), Some(last)) = (locations.first(), locations.last()) else {
            return Err(MapError::InsufficientWaypoints { count: 0 });
        };
        if locations.len() < 2 {
            return Err(MapError::InsufficientWaypoints {
                count: locations.len(),
            });
        }
        let (waypoints, scope) = match mode {
            RouteMode::Transit => (Vec::new(), Some(self.transit_scope.clone())),
            RouteMode::Driving | RouteMode::Walking => (
                locations
                    .iter()
                    .skip(1)
                    .take(locations.len() - 2)
                    .map(Location::position)
                    .collect(),
                None,
            ),
        };
        Ok(RouteRequest {
            origin: first.position(),
            destination: last.position(),
            waypoints,
            scope,
        })
    }

    fn ready_backend(&self, mode: RouteMode) -> Result<Arc<dyn RouteBackend>, MapError> {
        let unavailable = |state| MapError::CapabilityUnavailable { mode, state };
        self.capabilities
            .backend(mode)
            .ok_or_else(|| unavailable(self.capabilities.state(mode)))
    }
}

fn interpret(
    mode: RouteMode,
    status: &SearchStatus,
    payload: &SearchPayload,
) -> Result<CoordinateSequence, MapError> {
    if *status != SearchStatus::Complete {
        return Err(MapError::RouteNotFound {
            mode,
            status: status.to_string(),
            message: payload.diagnostic().unwrap_or(NO_DIAGNOSTIC).to_owned(),
        });
    }
    let path = match payload {
        SearchPayload::Routes(routes) => routes
            .primary_route(mode)
            .map(|route| extract_path(mode, route))
            .unwrap_or_default(),
        SearchPayload::Diagnostic(_) | SearchPayload::Empty => Vec::new(),
    };
    if path.is_empty() && mode != RouteMode::Transit {
        return Err(MapError::PathExtraction { mode });
    }
    Ok(path)
}
