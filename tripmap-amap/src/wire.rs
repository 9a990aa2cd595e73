//! AMap REST direction response types.
//!
//! The v3 direction services report `status` `"1"` on success and `"0"` on
//! failure, with numbers encoded as strings. Empty objects and strings are
//! often sent as `[]`, so those fields go through [`Lenient`].
//!
//! See: <https://lbs.amap.com/api/webservice/guide/api/direction>

use log::debug;
use serde::Deserialize;
use serde::de::IgnoredAny;
use tripmap_core::RouteMode;
use tripmap_core::path::{RawPoint, RawRoute, RawStep, RoutePayload, TransitLeg, TransitSegment, WalkingLeg};
use tripmap_core::provider::{SearchPayload, SearchStatus};

/// A value AMap may replace with an empty array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Lenient<T> {
    /// The value was present.
    Present(T),
    /// AMap sent `[]` or `null`.
    Missing(Option<Vec<IgnoredAny>>),
}

impl<T> Default for Lenient<T> {
    fn default() -> Self {
        Self::Missing(None)
    }
}

impl<T> Lenient<T> {
    /// The value, if present.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Present(value) => Some(value),
            Self::Missing(_) => None,
        }
    }
}

/// Response of any v3 direction service.
#[derive(Debug, Deserialize)]
pub struct DirectionResponse {
    /// `"1"` on success, `"0"` on failure.
    pub status: String,
    /// Status text, e.g. `"OK"` or `"INVALID_USER_KEY"`.
    #[serde(default)]
    pub info: Option<String>,
    /// Number of routes found, as a string.
    #[serde(default)]
    pub count: Option<String>,
    /// Route body.
    #[serde(default)]
    pub route: Lenient<RouteBody>,
}

/// Route candidates of a direction response.
#[derive(Debug, Default, Deserialize)]
pub struct RouteBody {
    /// Driving or walking paths.
    #[serde(default)]
    pub paths: Vec<WirePath>,
    /// Transit itineraries.
    #[serde(default)]
    pub transits: Vec<WireTransit>,
}

/// One driving or walking path.
#[derive(Debug, Deserialize)]
pub struct WirePath {
    /// Steps in travel order.
    #[serde(default)]
    pub steps: Vec<WireStep>,
}

/// One step with its encoded polyline.
#[derive(Debug, Deserialize)]
pub struct WireStep {
    /// `"lng,lat;lng,lat;..."`.
    #[serde(default)]
    pub polyline: Lenient<String>,
}

/// One transit itinerary.
#[derive(Debug, Deserialize)]
pub struct WireTransit {
    /// Segments in travel order.
    #[serde(default)]
    pub segments: Vec<WireSegment>,
}

/// A walking leg followed by a bus or subway leg.
///
/// Railway and taxi legs are not decoded; a segment made only of those
/// contributes no points.
#[derive(Debug, Deserialize)]
pub struct WireSegment {
    /// Walk to the boarding stop.
    #[serde(default)]
    pub walking: Lenient<WireWalking>,
    /// Ride on a line.
    #[serde(default)]
    pub bus: Lenient<WireBus>,
}

/// Walking part of a transit segment.
#[derive(Debug, Deserialize)]
pub struct WireWalking {
    /// Steps in travel order.
    #[serde(default)]
    pub steps: Vec<WireStep>,
}

/// Transit part of a transit segment.
#[derive(Debug, Deserialize)]
pub struct WireBus {
    /// Candidate lines; the first is the one taken.
    #[serde(default)]
    pub buslines: Vec<WireBusline>,
}

/// One bus or subway line.
#[derive(Debug, Deserialize)]
pub struct WireBusline {
    /// `"lng,lat;lng,lat;..."`.
    #[serde(default)]
    pub polyline: Lenient<String>,
}

impl DirectionResponse {
    /// Check if the service reported success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == "1"
    }

    /// Translate the response into the status and payload a search callback
    /// receives for `mode`.
    #[must_use]
    pub fn into_search(self, mode: RouteMode) -> (SearchStatus, SearchPayload) {
        let info = self.info.clone().unwrap_or_default();
        if !self.is_ok() {
            return (SearchStatus::Error, SearchPayload::Diagnostic(info));
        }
        if self.count.as_deref() == Some("0") {
            return (SearchStatus::NoData, SearchPayload::Diagnostic(info));
        }
        let body = self.route.into_option().unwrap_or_default();
        let mut payload = match mode {
            RouteMode::Driving | RouteMode::Walking => {
                RoutePayload::with_routes(body.paths.into_iter().map(WirePath::into_route).collect())
            }
            RouteMode::Transit => RoutePayload::with_plans(
                body.transits
                    .into_iter()
                    .map(WireTransit::into_route)
                    .collect(),
            ),
        };
        if payload.routes.is_empty() && payload.plans.is_empty() {
            return (SearchStatus::NoData, SearchPayload::Diagnostic(info));
        }
        payload.info = Some(info);
        (SearchStatus::Complete, SearchPayload::Routes(payload))
    }
}

impl WirePath {
    fn into_route(self) -> RawRoute {
        RawRoute::from_steps(self.steps.into_iter().map(WireStep::into_step).collect())
    }
}

impl WireStep {
    fn into_step(self) -> RawStep {
        RawStep::new(parse_polyline(self.polyline.into_option().as_deref()))
    }
}

impl WireTransit {
    fn into_route(self) -> RawRoute {
        RawRoute::from_segments(
            self.segments
                .into_iter()
                .map(WireSegment::into_segment)
                .collect(),
        )
    }
}

impl WireSegment {
    fn into_segment(self) -> TransitSegment {
        let walking = self.walking.into_option().map(|walking| WalkingLeg {
            steps: walking.steps.into_iter().map(WireStep::into_step).collect(),
            path: Vec::new(),
        });
        let transit = self
            .bus
            .into_option()
            .and_then(|bus| bus.buslines.into_iter().next())
            .map(|line| TransitLeg {
                path: parse_polyline(line.polyline.into_option().as_deref()),
            });
        if walking.is_none() && transit.is_none() {
            debug!("transit segment has neither a walking nor a bus leg; no points drawn");
        }
        TransitSegment { walking, transit }
    }
}

/// Decode an AMap `"lng,lat;lng,lat"` polyline into ordered pairs.
///
/// Malformed pairs are skipped.
///
/// # Examples
/// ```
/// use tripmap_amap::wire::parse_polyline;
///
/// let points = parse_polyline(Some("116.1,39.9;116.2,39.8"));
/// assert_eq!(points.len(), 2);
/// assert!(parse_polyline(None).is_empty());
/// ```
#[must_use]
pub fn parse_polyline(encoded: Option<&str>) -> Vec<RawPoint> {
    let Some(encoded) = encoded else {
        return Vec::new();
    };
    encoded
        .split(';')
        .filter(|pair| !pair.trim().is_empty())
        .filter_map(|pair| {
            let parsed = pair.split_once(',').and_then(|(lng, lat)| {
                Some(RawPoint::Pair([
                    lng.trim().parse().ok()?,
                    lat.trim().parse().ok()?,
                ]))
            });
            if parsed.is_none() {
                debug!("skipping malformed polyline pair '{pair}'");
            }
            parsed
        })
        .collect()
}
