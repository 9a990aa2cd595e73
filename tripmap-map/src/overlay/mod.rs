//! Markers, route paths and popups drawn on the map.

mod popup;

use std::sync::{Arc, Mutex};

use log::debug;
use tripmap_core::provider::{
    MapView, MarkerSpec, MarkerVisual, OverlayId, Padding, PolylineSpec, PopupSpec,
};
use tripmap_core::{CoordinateSequence, LngLat, Location, MapError, RouteMode};

use crate::{SessionConfig, lock};

pub use popup::popup_content;

/// Stroke width of drawn route paths.
const PATH_STROKE_WEIGHT: u32 = 6;
/// Stroke opacity of drawn route paths.
const PATH_STROKE_OPACITY: f64 = 0.8;

/// Handle to a marker owned by an [`OverlayRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerHandle(u64);

impl MarkerHandle {
    /// Raw handle value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Handle to a route path owned by an [`OverlayRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathHandle(u64);

impl PathHandle {
    /// Raw handle value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// A marker placed for a location.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    /// Registry handle.
    pub handle: MarkerHandle,
    /// Location the marker represents.
    pub location: Location,
    /// Icon override restored when the marker loses its highlight.
    pub icon: Option<String>,
    /// Whether this is the highlighted marker.
    pub highlighted: bool,
    overlay: OverlayId,
    popup: OverlayId,
}

impl Marker {
    /// Provider overlay of the marker itself.
    #[must_use]
    pub const fn overlay(&self) -> OverlayId {
        self.overlay
    }

    /// Provider overlay of the marker's popup.
    #[must_use]
    pub const fn popup(&self) -> OverlayId {
        self.popup
    }
}

/// A drawn route path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathOverlay {
    /// Registry handle.
    pub handle: PathHandle,
    /// Mode the path was drawn for.
    pub mode: RouteMode,
    /// Points in drawing order.
    pub path: CoordinateSequence,
    overlay: OverlayId,
}

impl PathOverlay {
    /// Provider overlay of the polyline.
    #[must_use]
    pub const fn overlay(&self) -> OverlayId {
        self.overlay
    }
}

#[derive(Default)]
struct RegistryState {
    view: Option<Arc<dyn MapView>>,
    markers: Vec<Marker>,
    paths: Vec<PathOverlay>,
    highlighted: Option<MarkerHandle>,
    open_popup: Option<MarkerHandle>,
    next_handle: u64,
}

impl RegistryState {
    fn next_handle(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    fn marker_index(&self, handle: MarkerHandle) -> Result<usize, MapError> {
        self.markers
            .iter()
            .position(|marker| marker.handle == handle)
            .ok_or(MapError::UnknownOverlay {
                handle: handle.raw(),
            })
    }

    fn clear_paths(&mut self, view: &dyn MapView) {
        for path in self.paths.drain(..) {
            view.remove(path.overlay);
        }
    }
}

/// Owns every overlay placed on one map.
///
/// Before a view is attached, operations that need one are no-ops. At most
/// one marker is highlighted, and at most one route path exists, at a time.
pub struct OverlayRegistry {
    state: Mutex<RegistryState>,
    highlight_zoom: f64,
    fit_padding: Padding,
}

impl std::fmt::Debug for OverlayRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = lock(&self.state);
        f.debug_struct("OverlayRegistry")
            .field("attached", &state.view.is_some())
            .field("markers", &state.markers.len())
            .field("paths", &state.paths.len())
            .field("highlighted", &state.highlighted)
            .finish_non_exhaustive()
    }
}

impl OverlayRegistry {
    /// Create an unattached registry using the highlight zoom and fit
    /// padding from `config`.
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            state: Mutex::new(RegistryState::default()),
            highlight_zoom: config.highlight_zoom,
            fit_padding: config.fit_padding,
        }
    }

    /// Attach the view overlays are drawn on.
    pub fn attach(&self, view: Arc<dyn MapView>) {
        lock(&self.state).view = Some(view);
    }

    /// Attach the view built by `build` unless one is already attached.
    ///
    /// Returns whether `build` ran.
    ///
    /// # Errors
    /// Propagates the error from `build`.
    pub fn attach_with<F>(&self, build: F) -> Result<bool, MapError>
    where
        F: FnOnce() -> Result<Arc<dyn MapView>, MapError>,
    {
        let mut state = lock(&self.state);
        if state.view.is_some() {
            return Ok(false);
        }
        state.view = Some(build()?);
        Ok(true)
    }

    /// Whether a view is attached.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        lock(&self.state).view.is_some()
    }

    /// Place a marker for `location` with a popup describing it.
    ///
    /// Returns `None` when no view is attached. A `highlighted` marker takes
    /// the highlight from any other marker.
    pub fn add_marker(
        &self,
        location: Location,
        icon: Option<String>,
        highlighted: bool,
    ) -> Option<MarkerHandle> {
        let mut state = lock(&self.state);
        let view = state.view.clone()?;
        let overlay = view.add_marker(&MarkerSpec {
            position: location.position(),
            title: location.name.clone(),
            visual: MarkerVisual::Default { icon: icon.clone() },
        });
        let popup = view.create_popup(&PopupSpec {
            content: popup_content(&location),
        });
        let handle = MarkerHandle(state.next_handle());
        debug!("marker {} placed for '{}'", handle.raw(), location.name);
        state.markers.push(Marker {
            handle,
            location,
            icon,
            highlighted: false,
            overlay,
            popup,
        });
        if highlighted {
            self.apply_highlight(&mut state, view.as_ref(), handle);
        }
        Some(handle)
    }

    /// Highlight `handle`, restoring the previously highlighted marker and
    /// centering the view on the new one at the highlight zoom.
    ///
    /// # Errors
    /// Returns [`MapError::UnknownOverlay`] for a handle that is not live.
    pub fn highlight_marker(&self, handle: MarkerHandle) -> Result<(), MapError> {
        let mut state = lock(&self.state);
        state.marker_index(handle)?;
        let Some(view) = state.view.clone() else {
            return Ok(());
        };
        self.apply_highlight(&mut state, view.as_ref(), handle);
        Ok(())
    }

    /// Open the popup of `handle`, closing any other open popup.
    ///
    /// # Errors
    /// Returns [`MapError::UnknownOverlay`] for a handle that is not live.
    pub fn open_popup(&self, handle: MarkerHandle) -> Result<(), MapError> {
        let mut state = lock(&self.state);
        let index = state.marker_index(handle)?;
        let Some(view) = state.view.clone() else {
            return Ok(());
        };
        for marker in &state.markers {
            view.close_popup(marker.popup);
        }
        if let Some(marker) = state.markers.get(index) {
            view.open_popup(marker.popup, marker.location.position());
        }
        state.open_popup = Some(handle);
        Ok(())
    }

    /// Remove every marker and its popup.
    pub fn clear_markers(&self) {
        let mut state = lock(&self.state);
        let markers = std::mem::take(&mut state.markers);
        state.highlighted = None;
        state.open_popup = None;
        let Some(view) = state.view.clone() else {
            return;
        };
        for marker in markers {
            view.close_popup(marker.popup);
            view.remove(marker.popup);
            view.remove(marker.overlay);
        }
    }

    /// Remove every route path.
    pub fn clear_paths(&self) {
        let mut state = lock(&self.state);
        match state.view.clone() {
            Some(view) => state.clear_paths(view.as_ref()),
            None => state.paths.clear(),
        }
    }

    /// Replace any existing path with `path`, styled for `mode`, and fit the
    /// view to it.
    ///
    /// Returns `None` when no view is attached or `path` is empty.
    pub fn draw_path(&self, path: CoordinateSequence, mode: RouteMode) -> Option<PathHandle> {
        let mut state = lock(&self.state);
        let view = state.view.clone()?;
        state.clear_paths(view.as_ref());
        if path.is_empty() {
            return None;
        }
        let overlay = view.add_polyline(&PolylineSpec {
            path: path.clone(),
            stroke_color: mode.stroke_color().to_owned(),
            stroke_weight: PATH_STROKE_WEIGHT,
            stroke_opacity: PATH_STROKE_OPACITY,
        });
        view.fit_view(&[overlay], self.fit_padding);
        let handle = PathHandle(state.next_handle());
        debug!("{mode} path {} drawn with {} points", handle.raw(), path.len());
        state.paths.push(PathOverlay {
            handle,
            mode,
            path,
            overlay,
        });
        Some(handle)
    }

    /// Draw a straight line through `locations` in order.
    ///
    /// Needs at least two locations; otherwise existing paths are cleared
    /// and nothing is drawn.
    pub fn draw_route(&self, locations: &[Location], mode: RouteMode) -> Option<PathHandle> {
        if locations.len() < 2 {
            self.clear_paths();
            return None;
        }
        let path = locations.iter().map(Location::position).collect();
        self.draw_path(path, mode)
    }

    /// Fit the view to every marker. No-op without markers.
    pub fn fit_to_markers(&self) {
        let state = lock(&self.state);
        let Some(view) = state.view.as_ref() else {
            return;
        };
        if state.markers.is_empty() {
            return;
        }
        let overlays: Vec<_> = state.markers.iter().map(|marker| marker.overlay).collect();
        view.fit_view(&overlays, self.fit_padding);
    }

    /// Move the view center.
    pub fn set_center(&self, center: LngLat) {
        if let Some(view) = lock(&self.state).view.as_ref() {
            view.set_center(center);
        }
    }

    /// Change the zoom level.
    pub fn set_zoom(&self, zoom: f64) {
        if let Some(view) = lock(&self.state).view.as_ref() {
            view.set_zoom(zoom);
        }
    }

    /// Forget every overlay and tear down the attached view. Idempotent.
    pub fn destroy(&self) {
        let view = {
            let mut state = lock(&self.state);
            let view = state.view.take();
            state.markers.clear();
            state.paths.clear();
            state.highlighted = None;
            state.open_popup = None;
            view
        };
        if let Some(view) = view {
            view.destroy();
            debug!("map view destroyed");
        }
    }

    /// Live markers in placement order.
    #[must_use]
    pub fn markers(&self) -> Vec<Marker> {
        lock(&self.state).markers.clone()
    }

    /// Live route paths.
    #[must_use]
    pub fn paths(&self) -> Vec<PathOverlay> {
        lock(&self.state).paths.clone()
    }

    /// The highlighted marker, if any.
    #[must_use]
    pub fn highlighted(&self) -> Option<MarkerHandle> {
        lock(&self.state).highlighted
    }

    /// The marker whose popup is open, if any.
    #[must_use]
    pub fn open_popup_marker(&self) -> Option<MarkerHandle> {
        lock(&self.state).open_popup
    }

    fn apply_highlight(&self, state: &mut RegistryState, view: &dyn MapView, handle: MarkerHandle) {
        if let Some(previous) = state.highlighted.filter(|previous| *previous != handle) {
            if let Some(marker) = state.markers.iter_mut().find(|m| m.handle == previous) {
                view.set_marker_visual(
                    marker.overlay,
                    &MarkerVisual::Default {
                        icon: marker.icon.clone(),
                    },
                );
                marker.highlighted = false;
            }
        }
        let Some(marker) = state.markers.iter_mut().find(|m| m.handle == handle) else {
            return;
        };
        view.set_marker_visual(marker.overlay, &MarkerVisual::Highlighted);
        marker.highlighted = true;
        view.set_center(marker.location.position());
        view.set_zoom(self.highlight_zoom);
        state.highlighted = Some(handle);
    }
}
