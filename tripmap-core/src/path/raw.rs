//! Raw route shapes as routing backends report them.
//!
//! Driving and walking results nest points under a list of steps; transit
//! results nest them two levels deeper, under itinerary segments made of
//! walking and transit legs. Every route may also carry a flat `path`.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use crate::{LngLat, RouteMode};

/// A point exposing its coordinates through getter calls.
///
/// SDK bindings hand out position objects of this kind instead of plain
/// values.
pub trait PointAccessor: Send + Sync {
    /// Longitude in decimal degrees.
    fn lng(&self) -> f64;
    /// Latitude in decimal degrees.
    fn lat(&self) -> f64;
}

/// One path point in any of the encodings a backend may use.
///
/// Deserialisation accepts `[lng, lat]` arrays and `{"lng": .., "lat": ..}`
/// objects; accessor points only come from in-process bindings.
#[derive(Clone, Deserialize)]
#[serde(from = "WirePoint")]
pub enum RawPoint {
    /// Ordered `[lng, lat]` pair.
    Pair([f64; 2]),
    /// Named `lng`/`lat` fields.
    Fields {
        /// Longitude.
        lng: f64,
        /// Latitude.
        lat: f64,
    },
    /// Getter-based point.
    Accessor(Arc<dyn PointAccessor>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WirePoint {
    Pair([f64; 2]),
    Fields { lng: f64, lat: f64 },
}

impl From<WirePoint> for RawPoint {
    fn from(value: WirePoint) -> Self {
        match value {
            WirePoint::Pair(pair) => Self::Pair(pair),
            WirePoint::Fields { lng, lat } => Self::Fields { lng, lat },
        }
    }
}

impl RawPoint {
    /// Wrap a getter-based point.
    pub fn accessor(point: impl PointAccessor + 'static) -> Self {
        Self::Accessor(Arc::new(point))
    }

    /// Read the position regardless of encoding.
    #[must_use]
    pub fn resolve(&self) -> LngLat {
        match self {
            Self::Pair([lng, lat]) => LngLat::new(*lng, *lat),
            Self::Fields { lng, lat } => LngLat::new(*lng, *lat),
            Self::Accessor(point) => LngLat::new(point.lng(), point.lat()),
        }
    }
}

impl fmt::Debug for RawPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pair(pair) => f.debug_tuple("Pair").field(pair).finish(),
            Self::Fields { lng, lat } => f
                .debug_struct("Fields")
                .field("lng", lng)
                .field("lat", lat)
                .finish(),
            Self::Accessor(point) => f
                .debug_struct("Accessor")
                .field("lng", &point.lng())
                .field("lat", &point.lat())
                .finish(),
        }
    }
}

impl From<LngLat> for RawPoint {
    fn from(value: LngLat) -> Self {
        Self::Pair(value.to_pair())
    }
}

/// A step of a driving or walking route.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStep {
    /// Points covered by the step.
    #[serde(default)]
    pub path: Vec<RawPoint>,
}

impl RawStep {
    /// Construct a step from its points.
    #[must_use]
    pub fn new(path: Vec<RawPoint>) -> Self {
        Self { path }
    }
}

/// Walking leg of a transit itinerary segment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WalkingLeg {
    /// Walking steps, each with its own points.
    #[serde(default)]
    pub steps: Vec<RawStep>,
    /// Flat points used when the leg has no steps.
    #[serde(default)]
    pub path: Vec<RawPoint>,
}

/// Transit leg (bus, metro, rail) of an itinerary segment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransitLeg {
    /// Points along the line.
    #[serde(default)]
    pub path: Vec<RawPoint>,
}

/// One segment of a transit itinerary.
///
/// A segment usually holds one leg; when it holds both, the walking leg
/// comes first (walk to the stop, then ride).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransitSegment {
    /// Walking part of the segment.
    #[serde(default)]
    pub walking: Option<WalkingLeg>,
    /// Riding part of the segment.
    #[serde(default)]
    pub transit: Option<TransitLeg>,
}

impl TransitSegment {
    /// Segment consisting of a walking leg with the given steps.
    #[must_use]
    pub fn walking(steps: Vec<RawStep>) -> Self {
        Self {
            walking: Some(WalkingLeg {
                steps,
                path: Vec::new(),
            }),
            transit: None,
        }
    }

    /// Segment consisting of a transit leg with the given points.
    #[must_use]
    pub fn transit(path: Vec<RawPoint>) -> Self {
        Self {
            walking: None,
            transit: Some(TransitLeg { path }),
        }
    }
}

/// A single route or itinerary in backend form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRoute {
    /// Driving/walking steps.
    #[serde(default)]
    pub steps: Vec<RawStep>,
    /// Transit itinerary segments.
    #[serde(default)]
    pub segments: Vec<TransitSegment>,
    /// Flat fallback points.
    #[serde(default)]
    pub path: Vec<RawPoint>,
}

impl RawRoute {
    /// Route made of driving/walking steps.
    #[must_use]
    pub fn from_steps(steps: Vec<RawStep>) -> Self {
        Self {
            steps,
            ..Self::default()
        }
    }

    /// Itinerary made of transit segments.
    #[must_use]
    pub fn from_segments(segments: Vec<TransitSegment>) -> Self {
        Self {
            segments,
            ..Self::default()
        }
    }
}

/// Success payload of a backend search.
///
/// Driving and walking backends fill `routes`; transit backends fill
/// `plans`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoutePayload {
    /// Candidate driving/walking routes, best first.
    #[serde(default)]
    pub routes: Vec<RawRoute>,
    /// Candidate transit itineraries, best first.
    #[serde(default)]
    pub plans: Vec<RawRoute>,
    /// Backend info string.
    #[serde(default)]
    pub info: Option<String>,
}

impl RoutePayload {
    /// Payload holding driving/walking routes.
    #[must_use]
    pub fn with_routes(routes: Vec<RawRoute>) -> Self {
        Self {
            routes,
            ..Self::default()
        }
    }

    /// Payload holding transit itineraries.
    #[must_use]
    pub fn with_plans(plans: Vec<RawRoute>) -> Self {
        Self {
            plans,
            ..Self::default()
        }
    }

    /// The route the resolver should draw for `mode`.
    #[must_use]
    pub fn primary_route(&self, mode: RouteMode) -> Option<&RawRoute> {
        match mode {
            RouteMode::Driving | RouteMode::Walking => self.routes.first(),
            RouteMode::Transit => self.plans.first(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    struct Getter;

    impl PointAccessor for Getter {
        fn lng(&self) -> f64 {
            1.5
        }

        fn lat(&self) -> f64 {
            2.5
        }
    }

    #[rstest]
    #[case(r#"[1.5, 2.5]"#)]
    #[case(r#"{"lng": 1.5, "lat": 2.5}"#)]
    #[case(r#"{"lat": 2.5, "lng": 1.5, "Q": 2.5, "R": 1.5}"#)]
    fn wire_encodings_resolve_equally(#[case] json: &str) {
        let point: RawPoint = serde_json::from_str(json).expect("point should parse");
        assert_eq!(point.resolve(), LngLat::new(1.5, 2.5));
    }

    #[rstest]
    fn accessor_resolves_through_getters() {
        let point = RawPoint::accessor(Getter);
        assert_eq!(point.resolve(), LngLat::new(1.5, 2.5));
        assert!(format!("{point:?}").contains("Accessor"));
    }

    #[rstest]
    fn primary_route_is_keyed_by_mode() {
        let payload = RoutePayload {
            routes: vec![RawRoute::from_steps(Vec::new())],
            plans: Vec::new(),
            info: None,
        };
        assert!(payload.primary_route(RouteMode::Driving).is_some());
        assert!(payload.primary_route(RouteMode::Walking).is_some());
        assert!(payload.primary_route(RouteMode::Transit).is_none());
    }

    #[rstest]
    fn payload_deserialises_nested_transit_shape() {
        let json = r#"{
            "plans": [{
                "segments": [
                    {"walking": {"steps": [{"path": [[1.0, 1.0]]}]}},
                    {"transit": {"path": [{"lng": 2.0, "lat": 2.0}]}}
                ]
            }]
        }"#;
        let payload: RoutePayload = serde_json::from_str(json).expect("payload should parse");
        let plan = payload
            .primary_route(RouteMode::Transit)
            .expect("plan present");
        assert_eq!(plan.segments.len(), 2);
        assert!(plan.segments[0].walking.is_some());
        assert!(plan.segments[1].transit.is_some());
    }
}
