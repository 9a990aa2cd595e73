//! Shared test harness modules for the tripmap CLI.
#![expect(
    clippy::panic,
    clippy::expect_used,
    clippy::indexing_slicing,
    reason = "Tests assert panic branches to surface unexpected CLI outcomes"
)]

use super::*;

mod document_unit;
mod helpers;
mod route_pipeline;
