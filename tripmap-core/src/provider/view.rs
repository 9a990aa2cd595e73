//! Overlay and viewport operations on a constructed map.

use crate::{CoordinateSequence, LngLat};

/// Provider-side identifier of an overlay (marker, polyline or popup).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayId(pub u64);

/// Visual state of a marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerVisual {
    /// Regular appearance, optionally with a custom icon.
    Default {
        /// Icon URL overriding the provider's default pin.
        icon: Option<String>,
    },
    /// Emphasised appearance for the single highlighted marker.
    Highlighted,
}

/// Marker creation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    /// Marker position.
    pub position: LngLat,
    /// Hover title.
    pub title: String,
    /// Initial appearance.
    pub visual: MarkerVisual,
}

/// Polyline creation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct PolylineSpec {
    /// Points in drawing order.
    pub path: CoordinateSequence,
    /// CSS color string.
    pub stroke_color: String,
    /// Line width in pixels.
    pub stroke_weight: u32,
    /// Opacity in `[0, 1]`.
    pub stroke_opacity: f64,
}

/// Popup creation parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupSpec {
    /// HTML content.
    pub content: String,
}

/// Padding, in view units, applied when fitting the view to overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Padding {
    /// Top padding.
    pub top: u32,
    /// Right padding.
    pub right: u32,
    /// Bottom padding.
    pub bottom: u32,
    /// Left padding.
    pub left: u32,
}

impl Padding {
    /// The same padding on every side.
    #[must_use]
    pub const fn uniform(value: u32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

/// A constructed map surface.
///
/// Methods are synchronous: providers apply overlay and viewport changes
/// immediately.
pub trait MapView: Send + Sync {
    /// Place a marker.
    fn add_marker(&self, spec: &MarkerSpec) -> OverlayId;
    /// Change a marker's appearance.
    fn set_marker_visual(&self, marker: OverlayId, visual: &MarkerVisual);
    /// Draw a polyline.
    fn add_polyline(&self, spec: &PolylineSpec) -> OverlayId;
    /// Create a closed popup.
    fn create_popup(&self, spec: &PopupSpec) -> OverlayId;
    /// Open a popup anchored at `at`.
    fn open_popup(&self, popup: OverlayId, at: LngLat);
    /// Close a popup.
    fn close_popup(&self, popup: OverlayId);
    /// Remove a marker, polyline or popup.
    fn remove(&self, overlay: OverlayId);
    /// Move the view center.
    fn set_center(&self, center: LngLat);
    /// Change the zoom level.
    fn set_zoom(&self, zoom: f64);
    /// Fit the view to the given overlays, or to every overlay when empty.
    fn fit_view(&self, overlays: &[OverlayId], padding: Padding);
    /// Tear the map down.
    fn destroy(&self);
}
