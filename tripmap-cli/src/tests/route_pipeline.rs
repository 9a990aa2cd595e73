//! Behavioural coverage for route runs against a mock AMap service.

use std::cell::RefCell;
use std::sync::Arc;

use super::helpers::{TWO_STOPS, Workspace, args_for};
use crate::CliError;
use crate::document::load_locations;
use crate::route::{RouteArgs, RouteConfig, plan_scene};
use camino::Utf8PathBuf;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::{Value, json};
use tokio::runtime::Runtime;
use tripmap_amap::AmapBootstrap;
use tripmap_core::MapError;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mock AMap service, trip document and the command's outcome.
struct RouteWorld {
    executor: Runtime,
    server: MockServer,
    workspace: Workspace,
    document: RefCell<Option<Utf8PathBuf>>,
    bootstrap: RefCell<Option<Arc<AmapBootstrap>>>,
    outcome: RefCell<Option<Result<Value, CliError>>>,
}

impl RouteWorld {
    fn mount(&self, mock: Mock) {
        self.executor.block_on(mock.mount(&self.server));
    }

    fn config(&self, args: RouteArgs) -> RouteConfig {
        let args = RouteArgs {
            rest_base_url: Some(self.server.uri()),
            loader_url: Some(format!("{}/maps", self.server.uri())),
            ..args
        };
        RouteConfig::try_from(args).expect("config should build")
    }

    fn run(&self, mode: &str, highlight: Option<usize>) {
        let document = self
            .document
            .borrow()
            .clone()
            .expect("document should be written");
        let config = self.config(RouteArgs {
            mode: Some(mode.to_owned()),
            highlight,
            ..args_for(&document)
        });
        let locations = load_locations(&config.document, config.day).expect("document loads");
        let bootstrap =
            Arc::new(AmapBootstrap::new(config.amap_config()).expect("bootstrap should build"));
        let outcome = self.executor.block_on(plan_scene(
            &config,
            Arc::clone(&bootstrap),
            &locations,
        ));
        self.bootstrap.replace(Some(bootstrap));
        self.outcome.replace(Some(outcome));
    }

    fn scene(&self) -> Value {
        match self.outcome.borrow().as_ref() {
            Some(Ok(scene)) => scene.clone(),
            other => panic!("expected a scene, found {other:?}"),
        }
    }

    fn features(&self, overlay: &str) -> Vec<Value> {
        self.scene()["features"]
            .as_array()
            .expect("features array")
            .iter()
            .filter(|feature| feature["properties"]["overlay"] == overlay)
            .cloned()
            .collect()
    }
}

#[fixture]
fn route_world() -> RouteWorld {
    let executor = Runtime::new().expect("mock runtime");
    let server = executor.block_on(MockServer::start());
    RouteWorld {
        executor,
        server,
        workspace: Workspace::new(),
        document: RefCell::new(None),
        bootstrap: RefCell::new(None),
        outcome: RefCell::new(None),
    }
}

#[given("a mock AMap service that accepts the key")]
fn accepting_service(#[from(route_world)] world: &RouteWorld) {
    world.mount(
        Mock::given(method("GET"))
            .and(path("/maps"))
            .respond_with(ResponseTemplate::new(200).set_body_string("/* loader */")),
    );
}

#[given("a mock AMap service that rejects the key")]
fn rejecting_service(#[from(route_world)] world: &RouteWorld) {
    world.mount(
        Mock::given(method("GET"))
            .and(path("/maps"))
            .respond_with(ResponseTemplate::new(403)),
    );
}

#[given("the walking service returns a three point route")]
fn walking_route(#[from(route_world)] world: &RouteWorld) {
    world.mount(
        Mock::given(method("GET"))
            .and(path("/v3/direction/walking"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "1",
                "info": "OK",
                "count": "1",
                "route": {"paths": [{"steps": [
                    {"polyline": "116.39,39.90;116.395,39.91"},
                    {"polyline": "116.40,39.92"}
                ]}]}
            }))),
    );
}

#[given("a document with two stops")]
fn two_stops(#[from(route_world)] world: &RouteWorld) {
    let document = world.workspace.write("stops.json", TWO_STOPS);
    world.document.replace(Some(document));
}

#[when("I run the route command in {mode} mode highlighting stop {index}")]
fn run_highlighting(#[from(route_world)] world: &RouteWorld, mode: String, index: usize) {
    world.run(&mode, Some(index));
}

#[when("I run the route command in {mode} mode")]
fn run_plain(#[from(route_world)] world: &RouteWorld, mode: String) {
    world.run(&mode, None);
}

#[then("the scene has {markers} markers and one path of {points} points")]
fn scene_shape(#[from(route_world)] world: &RouteWorld, markers: usize, points: usize) {
    assert_eq!(world.scene()["type"], "FeatureCollection");
    assert_eq!(world.features("marker").len(), markers);
    let paths = world.features("path");
    assert_eq!(paths.len(), 1);
    assert_eq!(
        paths[0]["geometry"]["coordinates"].as_array().map(Vec::len),
        Some(points)
    );
}

#[then("the path is stroked {color}")]
fn path_stroke(#[from(route_world)] world: &RouteWorld, color: String) {
    let paths = world.features("path");
    assert_eq!(paths[0]["properties"]["stroke"], color.trim_matches('"'));
}

#[then("the open popup mentions {name}")]
fn popup_mentions(#[from(route_world)] world: &RouteWorld, name: String) {
    let popups = world.features("popup");
    assert_eq!(popups.len(), 1);
    assert!(
        popups[0]["properties"]["content"]
            .as_str()
            .is_some_and(|content| content.contains(name.trim_matches('"')))
    );
}

#[then("the session was torn down")]
fn torn_down(#[from(route_world)] world: &RouteWorld) {
    let bootstrap = world.bootstrap.borrow();
    let bootstrap = bootstrap.as_ref().expect("command should have run");
    assert!(bootstrap.scene().is_none(), "runtime teardown releases the map");
}

#[then("the command fails to load the runtime")]
fn runtime_load_failure(#[from(route_world)] world: &RouteWorld) {
    match world.outcome.borrow().as_ref() {
        Some(Err(CliError::Map(MapError::RuntimeLoad { .. }))) => {}
        other => panic!("expected RuntimeLoad, found {other:?}"),
    }
}

#[then("the command reports highlight {index} out of {count} stops")]
fn highlight_out_of_range(#[from(route_world)] world: &RouteWorld, index: usize, count: usize) {
    match world.outcome.borrow().as_ref() {
        Some(Err(CliError::HighlightOutOfRange {
            index: actual,
            count: stops,
        })) => assert_eq!((*actual, *stops), (index, count)),
        other => panic!("expected HighlightOutOfRange, found {other:?}"),
    }
}

#[scenario(
    path = "tests/features/route_pipeline.feature",
    name = "rendering a walking route with a highlighted stop"
)]
fn walking_route_rendered(#[from(route_world)] world: RouteWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/route_pipeline.feature",
    name = "rejecting an unknown key"
)]
fn unknown_key_rejected(#[from(route_world)] world: RouteWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/route_pipeline.feature",
    name = "rejecting a highlight beyond the stops"
)]
fn highlight_rejected(#[from(route_world)] world: RouteWorld) {
    let _ = world;
}
