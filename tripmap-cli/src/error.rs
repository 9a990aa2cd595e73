//! Error types emitted by the tripmap CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;
use tripmap_amap::AmapBuildError;
use tripmap_core::MapError;

/// Errors emitted by the tripmap CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// The route mode is not one of driving, transit or walking.
    #[error("invalid --mode: {reason}")]
    InvalidMode { reason: String },
    /// The rendering surface would have no area.
    #[error("surface size {width}x{height} must be positive in both dimensions")]
    InvalidSurface { width: u32, height: u32 },
    /// Opening the trip document failed.
    #[error("failed to open trip document at {path:?}: {source}")]
    OpenDocument {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The trip document is neither a location list nor a trip with day plans.
    #[error("failed to parse trip document at {path:?}: {source}")]
    ParseDocument {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The requested day has no plan in the trip document.
    #[error("trip document has no plan for day {day}")]
    UnknownDay { day: u32 },
    /// The marker to highlight does not exist.
    #[error("cannot highlight location {index}: the route has {count} locations")]
    HighlightOutOfRange { index: usize, count: usize },
    /// Building the AMap provider failed.
    #[error("failed to configure AMap: {0}")]
    BuildProvider(#[from] AmapBuildError),
    /// Starting the async runtime failed.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// The map session failed.
    #[error(transparent)]
    Map(#[from] MapError),
    /// The session finished without constructing a map.
    #[error("no map was constructed")]
    NoScene,
    /// Serializing the scene failed.
    #[error("failed to serialize scene: {0}")]
    SerializeScene(#[source] serde_json::Error),
    /// Writing the scene failed.
    #[error("failed to write scene: {0}")]
    WriteScene(#[source] std::io::Error),
}
