//! Command-line interface for planning trip routes on AMap.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod document;
mod error;
mod route;

pub use document::{DayPlan, TripDocument};
pub use error::CliError;

pub(crate) const ARG_DOCUMENT: &str = "document";
pub(crate) const ARG_AMAP_KEY: &str = "amap-key";
pub(crate) const ARG_WIDTH: &str = "width";
pub(crate) const ARG_HEIGHT: &str = "height";
pub(crate) const ENV_DOCUMENT: &str = "TRIPMAP_CMDS_ROUTE_DOCUMENT";
pub(crate) const ENV_AMAP_KEY: &str = "TRIPMAP_CMDS_ROUTE_AMAP_KEY";

/// Run the tripmap CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when arguments or configuration are invalid, the
/// trip document cannot be read, or the map session fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Route(args) => route::run_route(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "tripmap",
    about = "Plan and render trip routes on AMap",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Plan a route through a trip's stops and print the map scene.
    Route(route::RouteArgs),
}

#[cfg(test)]
mod tests;
