//! Route command implementation for the tripmap CLI.

use std::io::Write;
use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::Parser;
use log::{info, warn};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tripmap_amap::{AmapBootstrap, AmapConfig, FixedSurface};
use tripmap_core::provider::Credentials;
use tripmap_core::{CapabilityState, Location, RouteMode};
use tripmap_map::{MapSession, SessionConfig};

use crate::document::load_locations;
use crate::{
    ARG_AMAP_KEY, ARG_DOCUMENT, ARG_HEIGHT, ARG_WIDTH, CliError, ENV_AMAP_KEY, ENV_DOCUMENT,
};

/// Identifier of the headless surface the map is built on.
const CONTAINER_ID: &str = "map";
const DEFAULT_WIDTH: u32 = 1024;
const DEFAULT_HEIGHT: u32 = 768;

/// CLI arguments for the `route` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "route",
    long_about = "Place a marker for every stop in a trip document, plan a \
                 route through them with the AMap direction services and \
                 print the resulting map scene as GeoJSON. The API key can \
                 come from CLI flags, configuration files, or environment \
                 variables.",
    about = "Plan and draw a route through a trip's stops"
)]
#[ortho_config(prefix = "TRIPMAP")]
pub(crate) struct RouteArgs {
    /// Path to a JSON location list or trip document.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) document: Option<Utf8PathBuf>,
    /// Travel mode: driving, transit or walking.
    #[arg(long, value_name = "mode")]
    #[serde(default)]
    pub(crate) mode: Option<String>,
    /// Plan only this day of a trip document.
    #[arg(long, value_name = "n")]
    #[serde(default)]
    pub(crate) day: Option<u32>,
    /// Highlight the stop at this zero-based index and open its popup.
    #[arg(long, value_name = "index")]
    #[serde(default)]
    pub(crate) highlight: Option<usize>,
    /// City that scopes transit searches.
    #[arg(long, value_name = "city")]
    #[serde(default)]
    pub(crate) city: Option<String>,
    /// AMap API key.
    #[arg(long = ARG_AMAP_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) amap_key: Option<String>,
    /// AMap security code paired with the key.
    #[arg(long, value_name = "code")]
    #[serde(default)]
    pub(crate) amap_security_code: Option<String>,
    /// Width of the rendering surface in pixels.
    #[arg(long = ARG_WIDTH, value_name = "px")]
    #[serde(default)]
    pub(crate) width: Option<u32>,
    /// Height of the rendering surface in pixels.
    #[arg(long = ARG_HEIGHT, value_name = "px")]
    #[serde(default)]
    pub(crate) height: Option<u32>,
    /// Override the AMap REST base URL.
    #[arg(long, value_name = "url")]
    #[serde(default)]
    pub(crate) rest_base_url: Option<String>,
    /// Override the AMap loader URL.
    #[arg(long, value_name = "url")]
    #[serde(default)]
    pub(crate) loader_url: Option<String>,
}

impl RouteArgs {
    pub(crate) fn into_config(self) -> Result<RouteConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RouteConfig::try_from(merged)
    }
}

/// Resolved `route` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RouteConfig {
    pub(crate) document: Utf8PathBuf,
    pub(crate) mode: RouteMode,
    pub(crate) day: Option<u32>,
    pub(crate) highlight: Option<usize>,
    pub(crate) city: Option<String>,
    pub(crate) credentials: Credentials,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) rest_base_url: Option<String>,
    pub(crate) loader_url: Option<String>,
}

impl TryFrom<RouteArgs> for RouteConfig {
    type Error = CliError;

    fn try_from(args: RouteArgs) -> Result<Self, Self::Error> {
        let document = args.document.ok_or(CliError::MissingArgument {
            field: ARG_DOCUMENT,
            env: ENV_DOCUMENT,
        })?;
        let api_key = args.amap_key.ok_or(CliError::MissingArgument {
            field: ARG_AMAP_KEY,
            env: ENV_AMAP_KEY,
        })?;
        let mode = args
            .mode
            .as_deref()
            .map_or(Ok(RouteMode::Driving), str::parse)
            .map_err(|reason| CliError::InvalidMode { reason })?;
        let width = args.width.unwrap_or(DEFAULT_WIDTH);
        let height = args.height.unwrap_or(DEFAULT_HEIGHT);
        if width == 0 || height == 0 {
            return Err(CliError::InvalidSurface { width, height });
        }
        let mut credentials = Credentials::new(api_key);
        credentials.security_code = args.amap_security_code;
        Ok(Self {
            document,
            mode,
            day: args.day,
            highlight: args.highlight,
            city: args.city,
            credentials,
            width,
            height,
            rest_base_url: args.rest_base_url,
            loader_url: args.loader_url,
        })
    }
}

impl RouteConfig {
    pub(crate) fn amap_config(&self) -> AmapConfig {
        let mut config = AmapConfig::new();
        if let Some(url) = &self.rest_base_url {
            config = config.with_rest_base_url(url.clone());
        }
        if let Some(url) = &self.loader_url {
            config = config.with_loader_url(url.clone());
        }
        config
    }

    fn session_config(&self) -> SessionConfig {
        let config = SessionConfig::default();
        match &self.city {
            Some(city) => config.with_transit_scope(city.clone()),
            None => config,
        }
    }
}

pub(super) fn run_route(args: RouteArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_route_with(args, &mut stdout)
}

pub(super) fn run_route_with(args: RouteArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let scene = execute_route(&config)?;
    write_scene(writer, &scene)
}

pub(crate) fn execute_route(config: &RouteConfig) -> Result<Value, CliError> {
    let locations = load_locations(&config.document, config.day)?;
    let bootstrap = Arc::new(AmapBootstrap::new(config.amap_config())?);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    runtime.block_on(plan_scene(config, bootstrap, &locations))
}

/// Draw `locations` on a fresh session and export the scene.
///
/// The session is torn down whether or not planning succeeds.
pub(crate) async fn plan_scene(
    config: &RouteConfig,
    bootstrap: Arc<AmapBootstrap>,
    locations: &[Location],
) -> Result<Value, CliError> {
    let session = MapSession::new(
        bootstrap.clone(),
        config.credentials.clone(),
        Arc::new(FixedSurface::new(CONTAINER_ID, config.width, config.height)),
        config.session_config(),
    );
    let scene = draw_scene(&session, &bootstrap, config, locations).await;
    session.destroy();
    scene
}

async fn draw_scene(
    session: &MapSession,
    bootstrap: &AmapBootstrap,
    config: &RouteConfig,
    locations: &[Location],
) -> Result<Value, CliError> {
    let report = session.initialize(CONTAINER_ID).await?;
    for outcome in report.outcomes() {
        if outcome.state == CapabilityState::Failed {
            warn!(
                "{} routing unavailable: {}",
                outcome.mode,
                outcome.diagnostic.as_deref().unwrap_or("no diagnostic")
            );
        }
    }

    let overlays = session.overlays();
    let markers: Vec<_> = locations
        .iter()
        .filter_map(|location| overlays.add_marker(location.clone(), None, false))
        .collect();
    if let Some(index) = config.highlight {
        let handle = *markers.get(index).ok_or(CliError::HighlightOutOfRange {
            index,
            count: markers.len(),
        })?;
        overlays.highlight_marker(handle)?;
        overlays.open_popup(handle)?;
    }

    let path = session.plan_route(locations, config.mode).await?;
    info!("planned {} route with {} points", config.mode, path.len());
    Ok(bootstrap.scene().ok_or(CliError::NoScene)?.to_geojson())
}

fn write_scene(writer: &mut dyn Write, scene: &Value) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(scene).map_err(CliError::SerializeScene)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteScene)?;
    writer.write_all(b"\n").map_err(CliError::WriteScene)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<RouteConfig, CliError> {
    let merged = RouteArgs::merge_from_layers(layers).map_err(CliError::from)?;
    RouteConfig::try_from(merged)
}
