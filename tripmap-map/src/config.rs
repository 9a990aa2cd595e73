//! Tunables for a [`MapSession`](crate::MapSession).

use std::time::Duration;

use tripmap_core::provider::{MapOptions, Padding};

/// Delay between container size checks.
pub const DEFAULT_CONTAINER_BACKOFF: Duration = Duration::from_millis(200);

/// Zoom level applied when a marker is highlighted.
pub const DEFAULT_HIGHLIGHT_ZOOM: f64 = 15.0;

/// Padding applied on each side when fitting the view to a new path.
pub const DEFAULT_FIT_PADDING: u32 = 50;

/// Transit region scope used when none is configured.
pub const NATIONWIDE_SCOPE: &str = "nationwide";

/// Configuration for [`MapSession`](crate::MapSession).
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use tripmap_map::SessionConfig;
///
/// let config = SessionConfig::default()
///     .with_backoff(Duration::from_millis(50))
///     .with_transit_scope("Shanghai");
/// assert_eq!(config.transit_scope, "Shanghai");
/// assert_eq!(config.highlight_zoom, 15.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Initial map view.
    pub map_options: MapOptions,
    /// Delay between container size checks.
    pub container_backoff: Duration,
    /// Zoom applied when highlighting a marker.
    pub highlight_zoom: f64,
    /// Padding used when fitting the view to a path.
    pub fit_padding: Padding,
    /// Region scope forwarded to transit searches.
    pub transit_scope: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            map_options: MapOptions::default(),
            container_backoff: DEFAULT_CONTAINER_BACKOFF,
            highlight_zoom: DEFAULT_HIGHLIGHT_ZOOM,
            fit_padding: Padding::uniform(DEFAULT_FIT_PADDING),
            transit_scope: NATIONWIDE_SCOPE.to_owned(),
        }
    }
}

impl SessionConfig {
    /// Set the initial map view.
    #[must_use]
    pub fn with_map_options(mut self, options: MapOptions) -> Self {
        self.map_options = options;
        self
    }

    /// Set the container polling delay.
    #[must_use]
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.container_backoff = backoff;
        self
    }

    /// Set the zoom used for highlighted markers.
    #[must_use]
    pub fn with_highlight_zoom(mut self, zoom: f64) -> Self {
        self.highlight_zoom = zoom;
        self
    }

    /// Set a uniform fit padding.
    #[must_use]
    pub fn with_fit_padding(mut self, padding: u32) -> Self {
        self.fit_padding = Padding::uniform(padding);
        self
    }

    /// Narrow the transit search scope.
    #[must_use]
    pub fn with_transit_scope(mut self, scope: impl Into<String>) -> Self {
        self.transit_scope = scope.into();
        self
    }
}
