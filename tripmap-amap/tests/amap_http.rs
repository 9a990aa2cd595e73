#![expect(
    clippy::expect_used,
    reason = "integration tests use expect for readable failures"
)]

//! HTTP-level tests for the AMap bootstrap and direction backends.

use std::sync::Arc;

use rstest::rstest;
use serde_json::json;
use tripmap_amap::{AmapBootstrap, AmapConfig};
use tripmap_core::path::RoutePayload;
use tripmap_core::provider::{
    Credentials, MapRuntime, RouteBackend, RouteRequest, RuntimeBootstrap, SearchPayload,
    SearchStatus,
};
use tripmap_core::{LngLat, MapError, RouteMode, extract_path};
use tripmap_map::search_route;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn bootstrap(server: &MockServer) -> AmapBootstrap {
    let config = AmapConfig::new()
        .with_loader_url(format!("{}/maps", server.uri()))
        .with_rest_base_url(server.uri());
    AmapBootstrap::new(config).expect("bootstrap should build")
}

async fn accept_loader(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/maps"))
        .and(query_param("v", "2.0"))
        .and(query_param("key", "k"))
        .respond_with(ResponseTemplate::new(200).set_body_string("/* loader */"))
        .mount(server)
        .await;
}

async fn backend(server: &MockServer, mode: RouteMode) -> Arc<dyn RouteBackend> {
    accept_loader(server).await;
    let credentials = Credentials::new("k");
    let runtime: Arc<dyn MapRuntime> = bootstrap(server)
        .load(&credentials)
        .await
        .expect("runtime should load");
    runtime
        .load_capability(mode)
        .await
        .expect("capability should load")
}

fn request(scope: Option<&str>) -> RouteRequest {
    RouteRequest {
        origin: LngLat::new(116.0, 39.0),
        destination: LngLat::new(116.2, 39.2),
        waypoints: vec![LngLat::new(116.1, 39.1)],
        scope: scope.map(str::to_owned),
    }
}

fn routes(payload: SearchPayload) -> RoutePayload {
    match payload {
        SearchPayload::Routes(routes) => routes,
        other => panic!("expected routes, got {other:?}"),
    }
}

#[rstest]
#[tokio::test]
async fn bootstrap_accepts_a_valid_key() {
    let server = MockServer::start().await;
    accept_loader(&server).await;
    let credentials = Credentials::new("k");

    let loaded = bootstrap(&server).load(&credentials).await;

    assert!(loaded.is_ok());
}

#[rstest]
#[tokio::test]
async fn bootstrap_rejection_is_a_runtime_load_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/maps"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    let credentials = Credentials::new("bad");

    let err = bootstrap(&server)
        .load(&credentials)
        .await
        .err()
        .expect("load should fail");

    assert!(matches!(err, MapError::RuntimeLoad { .. }));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn driving_search_forwards_waypoints_and_decodes_steps() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/direction/driving"))
        .and(query_param("waypoints", "116.100000,39.100000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "1",
            "info": "OK",
            "count": "1",
            "route": {"paths": [{"steps": [
                {"polyline": "116.0,39.0;116.05,39.05"},
                {"polyline": "116.1,39.1;116.2,39.2"}
            ]}]}
        })))
        .mount(&server)
        .await;
    let backend = backend(&server, RouteMode::Driving).await;

    let (status, payload) = search_route(backend.as_ref(), request(None)).await;

    assert_eq!(status, SearchStatus::Complete);
    let routes = routes(payload);
    let route = routes
        .primary_route(RouteMode::Driving)
        .expect("a driving route");
    assert_eq!(extract_path(RouteMode::Driving, route).len(), 4);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn transit_search_sends_the_city_scope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/direction/transit/integrated"))
        .and(query_param("city", "nationwide"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "1",
            "info": "OK",
            "count": "1",
            "route": {"transits": [{"segments": [{
                "walking": {"steps": [{"polyline": "1,1;1.5,1.5"}]},
                "bus": {"buslines": [{"polyline": "2,2;3,3"}]}
            }]}]}
        })))
        .mount(&server)
        .await;
    let backend = backend(&server, RouteMode::Transit).await;

    let (status, payload) = search_route(backend.as_ref(), request(Some("nationwide"))).await;

    assert_eq!(status, SearchStatus::Complete);
    let routes = routes(payload);
    let plan = routes
        .primary_route(RouteMode::Transit)
        .expect("a transit plan");
    assert_eq!(
        extract_path(RouteMode::Transit, plan).first(),
        Some(&LngLat::new(1.0, 1.0))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn service_failure_surfaces_the_info_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/direction/walking"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "0",
            "info": "INVALID_USER_KEY",
            "infocode": "10001"
        })))
        .mount(&server)
        .await;
    let backend = backend(&server, RouteMode::Walking).await;

    let (status, payload) = search_route(backend.as_ref(), request(None)).await;

    assert_eq!(status, SearchStatus::Error);
    assert_eq!(payload.diagnostic(), Some("INVALID_USER_KEY"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn http_failure_is_an_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/direction/walking"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let backend = backend(&server, RouteMode::Walking).await;

    let (status, payload) = search_route(backend.as_ref(), request(None)).await;

    assert_eq!(status, SearchStatus::Error);
    assert!(payload.diagnostic().is_some());
}
