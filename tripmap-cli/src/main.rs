//! Entry point for the `tripmap` command-line interface.
#![forbid(unsafe_code)]

use env_logger::{Env, Target};
use tripmap_cli::CliError;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
        .target(Target::Stderr)
        .init();
    match tripmap_cli::run() {
        Ok(()) => {}
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("tripmap: {err}");
            std::process::exit(1);
        }
    }
}
