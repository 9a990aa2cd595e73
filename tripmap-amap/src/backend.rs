//! Routing capabilities backed by the AMap REST direction services.

use log::{debug, warn};
use reqwest::Client;
use tokio::runtime::Handle;
use tripmap_core::provider::{
    RouteBackend, RouteRequest, SearchCallback, SearchPayload, SearchStatus,
};
use tripmap_core::{LngLat, RouteMode};
use url::Url;

use crate::wire::DirectionResponse;

/// REST path of the direction service for `mode`.
#[must_use]
pub const fn direction_path(mode: RouteMode) -> &'static str {
    match mode {
        RouteMode::Driving => "/v3/direction/driving",
        RouteMode::Transit => "/v3/direction/transit/integrated",
        RouteMode::Walking => "/v3/direction/walking",
    }
}

/// A loaded AMap routing capability for one mode.
///
/// Searches run on the ambient Tokio runtime and report through the
/// callback once the HTTP exchange finishes.
#[derive(Debug, Clone)]
pub struct AmapRouteBackend {
    client: Client,
    endpoint: Url,
    api_key: String,
    mode: RouteMode,
}

impl AmapRouteBackend {
    /// Backend for `mode` calling `endpoint`.
    #[must_use]
    pub fn new(client: Client, endpoint: Url, api_key: impl Into<String>, mode: RouteMode) -> Self {
        Self {
            client,
            endpoint,
            api_key: api_key.into(),
            mode,
        }
    }

    /// Query parameters for `request`.
    ///
    /// Driving forwards waypoints; walking has no waypoint support and
    /// transit uses the region scope instead.
    fn query(&self, request: &RouteRequest) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("key", self.api_key.clone()),
            ("origin", format_point(request.origin)),
            ("destination", format_point(request.destination)),
        ];
        match self.mode {
            RouteMode::Driving if !request.waypoints.is_empty() => {
                let waypoints: Vec<_> = request.waypoints.iter().copied().map(format_point).collect();
                params.push(("waypoints", waypoints.join(";")));
            }
            RouteMode::Transit => {
                if let Some(scope) = &request.scope {
                    params.push(("city", scope.clone()));
                }
            }
            RouteMode::Driving | RouteMode::Walking => {}
        }
        params
    }

    async fn fetch(&self, request: RouteRequest) -> (SearchStatus, SearchPayload) {
        let params = self.query(&request);
        let response = match self
            .client
            .get(self.endpoint.clone())
            .query(&params)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
        {
            Ok(response) => response,
            Err(err) => return transport_failure(self.mode, &err),
        };
        match response.json::<DirectionResponse>().await {
            Ok(body) => body.into_search(self.mode),
            Err(err) => transport_failure(self.mode, &err),
        }
    }
}

impl RouteBackend for AmapRouteBackend {
    fn search(&self, request: RouteRequest, callback: SearchCallback) {
        let Ok(handle) = Handle::try_current() else {
            callback(
                SearchStatus::Error,
                SearchPayload::Diagnostic("no async runtime available for the search".to_owned()),
            );
            return;
        };
        debug!("dispatching {} search to {}", self.mode, self.endpoint);
        let backend = self.clone();
        handle.spawn(async move {
            let (status, payload) = backend.fetch(request).await;
            callback(status, payload);
        });
    }
}

fn transport_failure(mode: RouteMode, err: &reqwest::Error) -> (SearchStatus, SearchPayload) {
    warn!("{mode} search failed: {err}");
    (SearchStatus::Error, SearchPayload::Diagnostic(err.to_string()))
}

fn format_point(point: LngLat) -> String {
    format!("{:.6},{:.6}", point.lng, point.lat)
}
