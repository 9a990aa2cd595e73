//! Unit tests for trip document loading.

use super::helpers::{TRIP, TWO_STOPS, Workspace};
use crate::document::load_locations;
use crate::CliError;
use rstest::rstest;

fn names(locations: &[tripmap_core::Location]) -> Vec<&str> {
    locations.iter().map(|l| l.name.as_str()).collect()
}

#[rstest]
fn location_lists_load_in_order() {
    let workspace = Workspace::new();
    let path = workspace.write("stops.json", TWO_STOPS);

    let locations = load_locations(&path, None).expect("document loads");

    assert_eq!(names(&locations), ["Hotel", "Museum"]);
}

#[rstest]
fn trips_concatenate_days_in_day_order() {
    let workspace = Workspace::new();
    let path = workspace.write("trip.json", TRIP);

    let locations = load_locations(&path, None).expect("document loads");

    assert_eq!(names(&locations), ["Hotel", "Forbidden City", "Summer Palace"]);
}

#[rstest]
#[case(1, 2)]
#[case(2, 1)]
fn trips_select_one_day(#[case] day: u32, #[case] expected: usize) {
    let workspace = Workspace::new();
    let path = workspace.write("trip.json", TRIP);

    let locations = load_locations(&path, Some(day)).expect("document loads");

    assert_eq!(locations.len(), expected);
}

#[rstest]
fn unknown_day_is_reported() {
    let workspace = Workspace::new();
    let path = workspace.write("trip.json", TRIP);

    let err = load_locations(&path, Some(9)).expect_err("day 9 is missing");

    match err {
        CliError::UnknownDay { day } => assert_eq!(day, 9),
        other => panic!("expected UnknownDay, found {other:?}"),
    }
}

#[rstest]
fn missing_document_reports_its_path() {
    let workspace = Workspace::new();
    let path = workspace.root().join("absent.json");

    let err = load_locations(&path, None).expect_err("document is missing");

    match err {
        CliError::OpenDocument { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("expected OpenDocument, found {other:?}"),
    }
}

#[rstest]
fn malformed_document_is_a_parse_error() {
    let workspace = Workspace::new();
    let path = workspace.write("bad.json", r#"{"dayPlans": "soon"}"#);

    let err = load_locations(&path, None).expect_err("document is malformed");

    assert!(matches!(err, CliError::ParseDocument { .. }));
}
