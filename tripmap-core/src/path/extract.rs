//! Mode-keyed flattening of raw routes into coordinate sequences.

use crate::{CoordinateSequence, RouteMode};

use super::raw::{RawPoint, RawRoute, RawStep, TransitSegment};

/// Flatten `route` into an ordered coordinate sequence.
///
/// Driving and walking routes concatenate the points of every step in step
/// order. Transit itineraries concatenate, segment by segment, the walking
/// leg followed by the transit leg. When that nesting yields nothing the
/// route's flat `path` is used instead. Points are emitted in traversal
/// order without de-duplication, so an empty result means the route carries
/// no geometry at all.
///
/// # Examples
/// ```
/// use tripmap_core::path::{RawPoint, RawRoute, RawStep, extract_path};
/// use tripmap_core::{LngLat, RouteMode};
///
/// let route = RawRoute::from_steps(vec![
///     RawStep::new(vec![RawPoint::Pair([1.0, 1.0])]),
///     RawStep::new(vec![RawPoint::Fields { lng: 2.0, lat: 2.0 }]),
/// ]);
/// let path = extract_path(RouteMode::Driving, &route);
/// assert_eq!(path, vec![LngLat::new(1.0, 1.0), LngLat::new(2.0, 2.0)]);
/// ```
#[must_use]
pub fn extract_path(mode: RouteMode, route: &RawRoute) -> CoordinateSequence {
    let nested = match mode {
        RouteMode::Driving | RouteMode::Walking => flatten_steps(&route.steps),
        RouteMode::Transit => flatten_segments(&route.segments),
    };
    if nested.is_empty() {
        resolve_all(&route.path)
    } else {
        nested
    }
}

fn flatten_steps(steps: &[RawStep]) -> CoordinateSequence {
    steps.iter().flat_map(|step| step.path.iter()).map(RawPoint::resolve).collect()
}

fn flatten_segments(segments: &[TransitSegment]) -> CoordinateSequence {
    let mut points = CoordinateSequence::new();
    for segment in segments {
        if let Some(walking) = &segment.walking {
            let legs = flatten_steps(&walking.steps);
            if legs.is_empty() {
                points.extend(resolve_all(&walking.path));
            } else {
                points.extend(legs);
            }
        }
        if let Some(transit) = &segment.transit {
            points.extend(resolve_all(&transit.path));
        }
    }
    points
}

fn resolve_all(points: &[RawPoint]) -> CoordinateSequence {
    points.iter().map(RawPoint::resolve).collect()
}
