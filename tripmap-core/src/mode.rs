//! Travel modes and the load state of their routing capabilities.

use serde::{Deserialize, Serialize};

/// A travel mode served by one routing capability.
///
/// # Examples
/// ```
/// use tripmap_core::RouteMode;
///
/// let mode: RouteMode = "transit".parse()?;
/// assert_eq!(mode, RouteMode::Transit);
/// assert_eq!(mode.to_string(), "transit");
/// # Ok::<(), String>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteMode {
    /// Road routing for cars.
    Driving,
    /// Public transport itineraries.
    Transit,
    /// Pedestrian routing.
    Walking,
}

impl RouteMode {
    /// Every mode, in capability load order.
    pub const ALL: [Self; 3] = [Self::Driving, Self::Transit, Self::Walking];

    /// Return the mode as a lowercase `&str`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Driving => "driving",
            Self::Transit => "transit",
            Self::Walking => "walking",
        }
    }

    /// Stroke color used when drawing a path for this mode.
    #[must_use]
    pub const fn stroke_color(self) -> &'static str {
        match self {
            Self::Driving => "#1890ff",
            Self::Transit => "#52c41a",
            Self::Walking => "#fa8c16",
        }
    }
}

impl std::fmt::Display for RouteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RouteMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "driving" => Ok(Self::Driving),
            "transit" => Ok(Self::Transit),
            "walking" => Ok(Self::Walking),
            _ => Err(format!("unknown route mode '{s}'")),
        }
    }
}

/// Load state of a routing capability.
///
/// `Unloaded → Loading → Ready | Failed`. `Ready` and `Failed` are terminal
/// until the session is destroyed, which resets every mode to `Unloaded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CapabilityState {
    /// No load has been requested.
    #[default]
    Unloaded,
    /// A load request is in flight.
    Loading,
    /// The capability loaded and can serve searches.
    Ready,
    /// The load failed; the mode stays unusable for this session.
    Failed,
}

impl CapabilityState {
    /// Whether the capability has reported, successfully or not.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Ready | Self::Failed)
    }
}

impl std::fmt::Display for CapabilityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Unloaded => "unloaded",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Failed => "failed",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn display_matches_as_str() {
        for mode in RouteMode::ALL {
            assert_eq!(mode.to_string(), mode.as_str());
            assert_eq!(RouteMode::from_str(mode.as_str()), Ok(mode));
        }
    }

    #[test]
    fn parsing_rejects_unknown() {
        let err = RouteMode::from_str("cycling").unwrap_err();
        assert!(err.contains("unknown route mode"));
    }

    #[test]
    fn modes_have_distinct_colors() {
        assert_ne!(
            RouteMode::Driving.stroke_color(),
            RouteMode::Transit.stroke_color()
        );
        assert_ne!(
            RouteMode::Transit.stroke_color(),
            RouteMode::Walking.stroke_color()
        );
    }

    #[test]
    fn only_ready_and_failed_are_terminal() {
        assert!(!CapabilityState::Unloaded.is_terminal());
        assert!(!CapabilityState::Loading.is_terminal());
        assert!(CapabilityState::Ready.is_terminal());
        assert!(CapabilityState::Failed.is_terminal());
    }
}
