//! Trip documents: a bare location list or a trip with day plans.

use std::io::BufReader;

use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8};
use log::{debug, warn};
use serde::Deserialize;
use tripmap_core::Location;

use crate::CliError;

/// A trip as returned by the planning service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripDocument {
    /// Trip title, if any.
    #[serde(default)]
    pub title: Option<String>,
    /// Per-day itineraries.
    #[serde(default)]
    pub day_plans: Vec<DayPlan>,
}

/// One day of a trip.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DayPlan {
    /// Day number, starting at 1.
    pub day: u32,
    /// Stops in visiting order.
    #[serde(default)]
    pub locations: Vec<Location>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DocumentBody {
    Locations(Vec<Location>),
    Trip(TripDocument),
}

impl TripDocument {
    /// Locations for `day`, or every day in day order when `None`.
    ///
    /// # Errors
    /// Returns [`CliError::UnknownDay`] when no plan exists for `day`.
    pub fn locations(self, day: Option<u32>) -> Result<Vec<Location>, CliError> {
        let mut plans = self.day_plans;
        if let Some(wanted) = day {
            return plans
                .into_iter()
                .find(|plan| plan.day == wanted)
                .map(|plan| plan.locations)
                .ok_or(CliError::UnknownDay { day: wanted });
        }
        plans.sort_by_key(|plan| plan.day);
        Ok(plans.into_iter().flat_map(|plan| plan.locations).collect())
    }
}

/// Load the stops to plan through from the document at `path`.
pub(crate) fn load_locations(path: &Utf8Path, day: Option<u32>) -> Result<Vec<Location>, CliError> {
    let file = fs_utf8::File::open_ambient(path, ambient_authority()).map_err(|source| {
        CliError::OpenDocument {
            path: path.to_path_buf(),
            source,
        }
    })?;
    let body: DocumentBody =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| CliError::ParseDocument {
            path: path.to_path_buf(),
            source,
        })?;
    match body {
        DocumentBody::Locations(locations) => {
            if let Some(ignored) = day {
                warn!("--day {ignored} ignored: {path} is a plain location list");
            }
            Ok(locations)
        }
        DocumentBody::Trip(trip) => {
            debug!(
                "trip '{}' has {} day plans",
                trip.title.as_deref().unwrap_or("untitled"),
                trip.day_plans.len()
            );
            trip.locations(day)
        }
    }
}
