#![expect(
    clippy::expect_used,
    reason = "behaviour tests use expect for readable failures"
)]

//! Behavioural tests for overlays and route resolution using rstest-bdd.

use std::cell::RefCell;
use std::sync::Arc;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tokio::runtime::Runtime;
use tripmap_core::path::{RawPoint, RawRoute, RawStep, RoutePayload, TransitSegment};
use tripmap_core::provider::{
    Credentials, MarkerVisual, SearchPayload, SearchStatus, SurfaceSize,
};
use tripmap_core::{CoordinateSequence, LngLat, Location, MapError, RouteMode};
use tripmap_map::test_support::{
    RecordingRuntime, RecordingView, ScriptedSurface, StubBootstrap, StubRouteBackend,
};
use tripmap_map::{MapSession, MarkerHandle, SessionConfig};

/// Session, its view and the scenario's observations.
struct PlanningWorld {
    executor: Runtime,
    session: RefCell<Option<MapSession>>,
    view: RefCell<Option<Arc<RecordingView>>>,
    backend: RefCell<Option<Arc<StubRouteBackend>>>,
    markers: RefCell<Vec<MarkerHandle>>,
    outcome: RefCell<Option<Result<CoordinateSequence, MapError>>>,
}

impl PlanningWorld {
    fn start(&self, runtime: RecordingRuntime) {
        let runtime = Arc::new(runtime);
        let session = MapSession::new(
            Arc::new(StubBootstrap::new(runtime.clone())),
            Credentials::new("test-key"),
            Arc::new(ScriptedSurface::new("map", [SurfaceSize::new(800, 600)])),
            SessionConfig::default(),
        );
        self.executor
            .block_on(session.initialize("map"))
            .expect("session should initialize");
        let markers = ["A", "B"]
            .into_iter()
            .enumerate()
            .filter_map(|(i, name)| {
                session
                    .overlays()
                    .add_marker(stop(name, index_f64(i)), None, false)
            })
            .collect();
        self.markers.replace(markers);
        self.view.replace(Some(runtime.view()));
        self.session.replace(Some(session));
    }

    fn with_session<T>(&self, act: impl FnOnce(&MapSession) -> T) -> T {
        let borrowed = self.session.borrow();
        act(borrowed.as_ref().expect("session should be started"))
    }

    fn view(&self) -> Arc<RecordingView> {
        self.view.borrow().clone().expect("view should exist")
    }

    fn backend(&self) -> Arc<StubRouteBackend> {
        self.backend.borrow().clone().expect("backend should exist")
    }

    fn marker(&self, name: &str) -> MarkerHandle {
        let index = usize::from(name != "A");
        *self
            .markers
            .borrow()
            .get(index)
            .expect("marker should exist")
    }
}

fn index_f64(index: usize) -> f64 {
    f64::from(u32::try_from(index).expect("small index"))
}

fn stop(name: &str, offset: f64) -> Location {
    Location::new(name, LngLat::new(116.0 + offset, 39.0 + offset), "attraction")
}

fn line(points: usize) -> Vec<RawPoint> {
    (0..points)
        .map(|i| RawPoint::from(LngLat::new(index_f64(i), 1.0)))
        .collect()
}

fn route_of(points: usize) -> SearchPayload {
    SearchPayload::Routes(RoutePayload::with_routes(vec![RawRoute::from_steps(vec![
        RawStep::new(line(points)),
    ])]))
}

#[fixture]
fn world() -> PlanningWorld {
    PlanningWorld {
        executor: tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .start_paused(true)
            .build()
            .expect("test runtime"),
        session: RefCell::new(None),
        view: RefCell::new(None),
        backend: RefCell::new(None),
        markers: RefCell::new(Vec::new()),
        outcome: RefCell::new(None),
    }
}

#[given("an initialized session with markers A and B")]
fn given_markers(world: &PlanningWorld) {
    world.start(RecordingRuntime::new());
}

#[given("an initialized session with a driving backend returning {count} points")]
fn given_driving_backend(world: &PlanningWorld, count: usize) {
    let backend = Arc::new(StubRouteBackend::deferred(
        SearchStatus::Complete,
        route_of(count),
    ));
    world.backend.replace(Some(backend.clone()));
    world.start(RecordingRuntime::new().with_backend(RouteMode::Driving, backend));
}

#[given("an initialized session whose driving backend returns {first} points and then {second} points")]
fn given_two_routes(world: &PlanningWorld, first: usize, second: usize) {
    let backend = Arc::new(
        StubRouteBackend::deferred(SearchStatus::Complete, route_of(first))
            .then_replying(SearchStatus::Complete, route_of(second)),
    );
    world.backend.replace(Some(backend.clone()));
    world.start(RecordingRuntime::new().with_backend(RouteMode::Driving, backend));
}

#[given("an initialized session whose driving backend returns {count} points and then fails with {message}")]
fn given_route_then_failure(world: &PlanningWorld, count: usize, message: String) {
    let backend = Arc::new(
        StubRouteBackend::deferred(SearchStatus::Complete, route_of(count)).then_replying(
            SearchStatus::Error,
            SearchPayload::Diagnostic(message.trim_matches('"').to_owned()),
        ),
    );
    world.backend.replace(Some(backend.clone()));
    world.start(RecordingRuntime::new().with_backend(RouteMode::Driving, backend));
}

#[given("an initialized session with a driving backend failing with {message}")]
fn given_failing_backend(world: &PlanningWorld, message: String) {
    let backend = Arc::new(StubRouteBackend::replying(
        SearchStatus::Error,
        SearchPayload::Diagnostic(message.trim_matches('"').to_owned()),
    ));
    world.backend.replace(Some(backend.clone()));
    world.start(RecordingRuntime::new().with_backend(RouteMode::Driving, backend));
}

#[given("an initialized session whose transit capability fails to load")]
fn given_failed_transit(world: &PlanningWorld) {
    world.start(RecordingRuntime::new().with_failing_capability(RouteMode::Transit, "denied"));
}

#[given("an initialized session with a transit backend returning no path points")]
fn given_empty_transit(world: &PlanningWorld) {
    let payload = RoutePayload::with_plans(vec![RawRoute::from_segments(vec![
        TransitSegment::default(),
    ])]);
    let backend = Arc::new(StubRouteBackend::deferred(
        SearchStatus::Complete,
        SearchPayload::Routes(payload),
    ));
    world.backend.replace(Some(backend.clone()));
    world.start(RecordingRuntime::new().with_backend(RouteMode::Transit, backend));
}

#[when("marker {name} is highlighted")]
fn when_highlighted(world: &PlanningWorld, name: String) {
    let handle = world.marker(&name);
    world.with_session(|session| {
        session
            .overlays()
            .highlight_marker(handle)
            .expect("marker should be live");
    });
}

#[when("a driving path of {count} points is drawn")]
fn when_driving_path(world: &PlanningWorld, count: usize) {
    let path = line(count).iter().map(RawPoint::resolve).collect();
    world.with_session(|session| session.overlays().draw_path(path, RouteMode::Driving));
}

#[when("a walking path of {count} points is drawn")]
fn when_walking_path(world: &PlanningWorld, count: usize) {
    let path = line(count).iter().map(RawPoint::resolve).collect();
    world.with_session(|session| session.overlays().draw_path(path, RouteMode::Walking));
}

#[when("a {mode} route is planned through {count} locations")]
fn when_planned(world: &PlanningWorld, mode: RouteMode, count: usize) {
    let stops: Vec<_> = (0..count)
        .map(|i| stop(&format!("S{i}"), index_f64(i)))
        .collect();
    let outcome = world.with_session(|session| {
        world.executor.block_on(session.plan_route(&stops, mode))
    });
    world.outcome.replace(Some(outcome));
}

#[then("only marker {name} is highlighted")]
fn then_only_highlighted(world: &PlanningWorld, name: String) {
    let expected = world.marker(&name);
    world.with_session(|session| {
        let overlays = session.overlays();
        assert_eq!(overlays.highlighted(), Some(expected));
        let highlighted: Vec<_> = overlays
            .markers()
            .into_iter()
            .filter(|marker| marker.highlighted)
            .map(|marker| marker.handle)
            .collect();
        assert_eq!(highlighted, vec![expected]);
    });
}

#[then("marker {name} shows its default appearance")]
fn then_default_appearance(world: &PlanningWorld, name: String) {
    let handle = world.marker(&name);
    let overlay = world.with_session(|session| {
        session
            .overlays()
            .markers()
            .into_iter()
            .find(|marker| marker.handle == handle)
            .map(|marker| marker.overlay())
            .expect("marker should be live")
    });
    assert_eq!(
        world.view().marker_visual(overlay),
        Some(MarkerVisual::Default { icon: None })
    );
}

#[then("exactly one path of {count} points is shown")]
fn then_one_path(world: &PlanningWorld, count: usize) {
    let paths = world.with_session(|session| session.overlays().paths());
    assert_eq!(paths.len(), 1);
    assert_eq!(paths.first().map(|path| path.path.len()), Some(count));
    let polylines = world.view().polylines();
    assert_eq!(polylines.len(), 1);
    assert_eq!(polylines.first().map(|line| line.path.len()), Some(count));
}

#[then("planning fails with insufficient waypoints")]
fn then_insufficient(world: &PlanningWorld) {
    assert!(matches!(
        world.outcome.borrow().as_ref(),
        Some(Err(MapError::InsufficientWaypoints { count: 1 }))
    ));
}

#[then("planning fails because transit is unavailable")]
fn then_unavailable(world: &PlanningWorld) {
    assert!(matches!(
        world.outcome.borrow().as_ref(),
        Some(Err(MapError::CapabilityUnavailable {
            mode: RouteMode::Transit,
            ..
        }))
    ));
}

#[then("planning fails with route not found and message {message}")]
fn then_route_not_found(world: &PlanningWorld, message: String) {
    let outcome = world.outcome.borrow();
    let Some(Err(MapError::RouteNotFound {
        status,
        message: actual,
        ..
    })) = outcome.as_ref()
    else {
        panic!("expected RouteNotFound, got {outcome:?}");
    };
    assert_eq!(status, "error");
    assert_eq!(actual, message.trim_matches('"'));
}

#[then("the driving backend received {count} searches")]
fn then_searches(world: &PlanningWorld, count: usize) {
    assert_eq!(world.backend().calls(), count);
}

#[then("the last search carried {count} waypoints")]
fn then_waypoints(world: &PlanningWorld, count: usize) {
    let requests = world.backend().requests();
    let last = requests.last().expect("a search should have run");
    assert_eq!(last.waypoints.len(), count);
}

#[then("the planned route is empty")]
fn then_empty_route(world: &PlanningWorld) {
    assert!(matches!(
        world.outcome.borrow().as_ref(),
        Some(Ok(path)) if path.is_empty()
    ));
}

#[then("no path is shown")]
fn then_no_path(world: &PlanningWorld) {
    assert!(world.with_session(|session| session.overlays().paths().is_empty()));
    assert!(world.view().polylines().is_empty());
}

#[then("the view was fitted to the markers")]
fn then_fitted_to_markers(world: &PlanningWorld) {
    let markers = world.with_session(|session| session.overlays().markers());
    let expected: Vec<_> = markers.iter().map(|marker| marker.overlay()).collect();
    let fits = world.view().fits();
    let last = fits.last().expect("view should have been fitted");
    assert_eq!(last.0, expected);
}

#[scenario(path = "tests/features/route_planning.feature", index = 0)]
fn highlight_moves(world: PlanningWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/route_planning.feature", index = 1)]
fn redraw_replaces_path(world: PlanningWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/route_planning.feature", index = 2)]
fn too_few_locations(world: PlanningWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/route_planning.feature", index = 3)]
fn unavailable_mode(world: PlanningWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/route_planning.feature", index = 4)]
fn waypoints_forwarded(world: PlanningWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/route_planning.feature", index = 5)]
fn backend_error(world: PlanningWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/route_planning.feature", index = 6)]
fn transit_without_points(world: PlanningWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/route_planning.feature", index = 7)]
fn replanning_replaces_route(world: PlanningWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/route_planning.feature", index = 8)]
fn failed_replan_clears_route(world: PlanningWorld) {
    let _ = world;
}
