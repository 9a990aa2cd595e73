//! Error taxonomy shared by every map integration component.

use thiserror::Error;

use crate::{CapabilityState, RouteMode};

/// Errors surfaced by runtime bootstrap, map construction, overlay handling
/// and route resolution.
///
/// Capability load failures never appear here: they are recorded per mode as
/// [`CapabilityState::Failed`] so the remaining modes stay usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    /// The provider's bootstrap resource failed to load.
    #[error("failed to load map runtime: {message}")]
    RuntimeLoad {
        /// Diagnostic from the bootstrap (network or credential failure).
        message: String,
    },
    /// No rendering surface exists with the requested identifier.
    #[error("map container '{id}' does not exist")]
    ContainerMissing {
        /// Identifier that was looked up.
        id: String,
    },
    /// The provider refused to construct a map on the surface.
    #[error("failed to construct map: {message}")]
    MapConstruction {
        /// Diagnostic from the provider.
        message: String,
    },
    /// A route was requested before the mode's capability became ready.
    #[error("{mode} routing is unavailable (capability {state})")]
    CapabilityUnavailable {
        /// Requested mode.
        mode: RouteMode,
        /// State the capability was in at request time.
        state: CapabilityState,
    },
    /// Fewer than two locations were supplied.
    #[error("route planning needs at least 2 locations, got {count}")]
    InsufficientWaypoints {
        /// Number of locations supplied.
        count: usize,
    },
    /// The backend reported an error, no data, or an unknown status.
    #[error("no {mode} route found ({status}): {message}")]
    RouteNotFound {
        /// Requested mode.
        mode: RouteMode,
        /// Status tag reported by the backend.
        status: String,
        /// Backend diagnostic, verbatim.
        message: String,
    },
    /// The backend reported success but no path points could be extracted.
    #[error("{mode} route completed without extractable path points")]
    PathExtraction {
        /// Requested mode.
        mode: RouteMode,
    },
    /// A marker handle does not refer to a live marker.
    #[error("marker {handle} is not registered")]
    UnknownOverlay {
        /// Raw handle value.
        handle: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_not_found_keeps_backend_message() {
        let err = MapError::RouteNotFound {
            mode: RouteMode::Transit,
            status: "error".into(),
            message: "INVALID_USER_KEY".into(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("transit"));
        assert!(rendered.contains("INVALID_USER_KEY"));
    }

    #[test]
    fn capability_unavailable_names_state() {
        let err = MapError::CapabilityUnavailable {
            mode: RouteMode::Walking,
            state: CapabilityState::Loading,
        };
        assert_eq!(
            err.to_string(),
            "walking routing is unavailable (capability loading)"
        );
    }
}
