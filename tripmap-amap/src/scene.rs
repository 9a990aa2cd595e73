//! A headless map surface that records its scene for export.
//!
//! [`HeadlessMap`] keeps every overlay and the viewport in memory and renders
//! them as a GeoJSON `FeatureCollection`. It stands in for the browser map
//! when planning routes from the command line.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use geo::{BoundingRect, Coord, LineString, MultiPoint, Point, Rect};
use serde_json::{Value, json};
use tripmap_core::provider::{
    ContainerHandle, MapOptions, MapView, MarkerSpec, MarkerVisual, OverlayId, Padding,
    PolylineSpec, PopupSpec, SurfaceProbe, SurfaceSize,
};
use tripmap_core::{CoordinateSequence, LngLat};

/// Smallest zoom produced by fitting.
const MIN_FIT_ZOOM: f64 = 3.0;
/// Largest zoom produced by fitting.
const MAX_FIT_ZOOM: f64 = 18.0;
/// Web Mercator tile size in pixels.
const TILE_SIZE: f64 = 256.0;

/// A surface with fixed, configured dimensions.
#[derive(Debug, Clone)]
pub struct FixedSurface {
    id: String,
    size: SurfaceSize,
}

impl FixedSurface {
    /// Surface `id` measuring `width` by `height`.
    pub fn new(id: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id: id.into(),
            size: SurfaceSize::new(width, height),
        }
    }
}

impl SurfaceProbe for FixedSurface {
    fn measure(&self, id: &str) -> Option<SurfaceSize> {
        (id == self.id).then_some(self.size)
    }
}

#[derive(Debug, Clone)]
enum SceneOverlay {
    Marker {
        position: LngLat,
        title: String,
        visual: MarkerVisual,
    },
    Polyline(PolylineSpec),
    Popup {
        content: String,
        anchor: Option<LngLat>,
    },
}

impl SceneOverlay {
    fn coordinates(&self) -> Vec<Coord<f64>> {
        match self {
            Self::Marker { position, .. } => vec![Coord::from(*position)],
            Self::Polyline(spec) => spec.path.iter().copied().map(Coord::from).collect(),
            Self::Popup { anchor, .. } => anchor.iter().copied().map(Coord::from).collect(),
        }
    }
}

#[derive(Debug)]
struct Scene {
    next_id: u64,
    overlays: BTreeMap<OverlayId, SceneOverlay>,
    center: LngLat,
    zoom: f64,
    bounds: Option<Rect<f64>>,
    destroyed: bool,
}

/// Map view that records its scene in memory.
#[derive(Debug)]
pub struct HeadlessMap {
    container: ContainerHandle,
    options: MapOptions,
    scene: Mutex<Scene>,
}

impl HeadlessMap {
    /// A map on `container` starting at the view in `options`.
    #[must_use]
    pub fn new(container: ContainerHandle, options: MapOptions) -> Self {
        let scene = Scene {
            next_id: 0,
            overlays: BTreeMap::new(),
            center: options.center,
            zoom: options.zoom,
            bounds: None,
            destroyed: false,
        };
        Self {
            container,
            options,
            scene: Mutex::new(scene),
        }
    }

    /// Current view center.
    #[must_use]
    pub fn center(&self) -> LngLat {
        self.scene().center
    }

    /// Current zoom level.
    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.scene().zoom
    }

    /// Whether the map was destroyed.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.scene().destroyed
    }

    /// Points of every polyline, in creation order.
    #[must_use]
    pub fn polylines(&self) -> Vec<CoordinateSequence> {
        self.scene()
            .overlays
            .values()
            .filter_map(|overlay| match overlay {
                SceneOverlay::Polyline(spec) => Some(spec.path.clone()),
                _ => None,
            })
            .collect()
    }

    /// Render the scene as a GeoJSON `FeatureCollection`.
    ///
    /// Markers become `Point` features, polylines `LineString` features and
    /// open popups `Point` features at their anchor. The viewport is carried
    /// in a top-level `viewport` member.
    #[must_use]
    pub fn to_geojson(&self) -> Value {
        let scene = self.scene();
        let features: Vec<Value> = scene
            .overlays
            .iter()
            .filter_map(|(id, overlay)| feature(*id, overlay))
            .collect();
        let bounds = scene.bounds.map(|rect| {
            json!([rect.min().x, rect.min().y, rect.max().x, rect.max().y])
        });
        json!({
            "type": "FeatureCollection",
            "features": features,
            "viewport": {
                "container": self.container.id,
                "width": self.container.size.width,
                "height": self.container.size.height,
                "center": scene.center.to_pair(),
                "zoom": scene.zoom,
                "bounds": bounds,
                "viewMode": self.options.view_mode,
                "style": self.options.style,
            },
        })
    }

    fn scene(&self) -> MutexGuard<'_, Scene> {
        self.scene.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn insert(&self, overlay: SceneOverlay) -> OverlayId {
        let mut scene = self.scene();
        scene.next_id += 1;
        let id = OverlayId(scene.next_id);
        scene.overlays.insert(id, overlay);
        id
    }

    /// Zoom at which `rect` fits the container minus `padding`.
    #[expect(
        clippy::float_arithmetic,
        reason = "Web Mercator zoom is derived from degree spans"
    )]
    fn fit_zoom(&self, rect: Rect<f64>, padding: Padding) -> f64 {
        let usable = |total: u32, a: u32, b: u32| {
            f64::from(total.saturating_sub(a.saturating_add(b)).max(1))
        };
        let width = usable(self.container.size.width, padding.left, padding.right);
        let height = usable(self.container.size.height, padding.top, padding.bottom);
        let zoom_for = |pixels: f64, span: f64, full: f64| {
            if span <= f64::EPSILON {
                MAX_FIT_ZOOM
            } else {
                (pixels * full / (span * TILE_SIZE)).log2()
            }
        };
        let zoom = zoom_for(width, rect.width(), 360.0).min(zoom_for(height, rect.height(), 180.0));
        zoom.floor().clamp(MIN_FIT_ZOOM, MAX_FIT_ZOOM)
    }
}

fn feature(id: OverlayId, overlay: &SceneOverlay) -> Option<Value> {
    let OverlayId(raw) = id;
    let value = match overlay {
        SceneOverlay::Marker {
            position,
            title,
            visual,
        } => {
            let (highlighted, icon) = match visual {
                MarkerVisual::Highlighted => (true, None),
                MarkerVisual::Default { icon } => (false, icon.clone()),
            };
            json!({
                "type": "Feature",
                "id": raw,
                "geometry": {"type": "Point", "coordinates": position.to_pair()},
                "properties": {
                    "overlay": "marker",
                    "title": title,
                    "highlighted": highlighted,
                    "icon": icon,
                },
            })
        }
        SceneOverlay::Polyline(spec) => {
            let line: LineString<f64> = spec.path.iter().copied().map(Coord::from).collect();
            let coordinates: Vec<[f64; 2]> = line.coords().map(|c| [c.x, c.y]).collect();
            json!({
                "type": "Feature",
                "id": raw,
                "geometry": {"type": "LineString", "coordinates": coordinates},
                "properties": {
                    "overlay": "path",
                    "stroke": spec.stroke_color,
                    "stroke-width": spec.stroke_weight,
                    "stroke-opacity": spec.stroke_opacity,
                },
            })
        }
        SceneOverlay::Popup { content, anchor } => {
            let anchor = (*anchor)?;
            json!({
                "type": "Feature",
                "id": raw,
                "geometry": {"type": "Point", "coordinates": anchor.to_pair()},
                "properties": {"overlay": "popup", "content": content},
            })
        }
    };
    Some(value)
}

impl MapView for HeadlessMap {
    fn add_marker(&self, spec: &MarkerSpec) -> OverlayId {
        self.insert(SceneOverlay::Marker {
            position: spec.position,
            title: spec.title.clone(),
            visual: spec.visual.clone(),
        })
    }

    fn set_marker_visual(&self, marker: OverlayId, visual: &MarkerVisual) {
        if let Some(SceneOverlay::Marker { visual: current, .. }) =
            self.scene().overlays.get_mut(&marker)
        {
            *current = visual.clone();
        }
    }

    fn add_polyline(&self, spec: &PolylineSpec) -> OverlayId {
        self.insert(SceneOverlay::Polyline(spec.clone()))
    }

    fn create_popup(&self, spec: &PopupSpec) -> OverlayId {
        self.insert(SceneOverlay::Popup {
            content: spec.content.clone(),
            anchor: None,
        })
    }

    fn open_popup(&self, popup: OverlayId, at: LngLat) {
        if let Some(SceneOverlay::Popup { anchor, .. }) = self.scene().overlays.get_mut(&popup) {
            *anchor = Some(at);
        }
    }

    fn close_popup(&self, popup: OverlayId) {
        if let Some(SceneOverlay::Popup { anchor, .. }) = self.scene().overlays.get_mut(&popup) {
            *anchor = None;
        }
    }

    fn remove(&self, overlay: OverlayId) {
        self.scene().overlays.remove(&overlay);
    }

    fn set_center(&self, center: LngLat) {
        self.scene().center = center;
    }

    fn set_zoom(&self, zoom: f64) {
        self.scene().zoom = zoom;
    }

    fn fit_view(&self, overlays: &[OverlayId], padding: Padding) {
        let coords: Vec<Point<f64>> = {
            let scene = self.scene();
            scene
                .overlays
                .iter()
                .filter(|(id, _)| overlays.is_empty() || overlays.contains(id))
                .flat_map(|(_, overlay)| overlay.coordinates())
                .map(Point::from)
                .collect()
        };
        let Some(rect) = MultiPoint::from(coords).bounding_rect() else {
            return;
        };
        let zoom = self.fit_zoom(rect, padding);
        let mut scene = self.scene();
        scene.center = LngLat::from(rect.center());
        scene.zoom = zoom;
        scene.bounds = Some(rect);
    }

    fn destroy(&self) {
        let mut scene = self.scene();
        scene.overlays.clear();
        scene.bounds = None;
        scene.destroyed = true;
    }
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    clippy::indexing_slicing,
    reason = "tests index fixed GeoJSON and fail fast"
)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn map() -> HeadlessMap {
        HeadlessMap::new(
            ContainerHandle {
                id: "map".into(),
                size: SurfaceSize::new(800, 600),
                retries: 0,
            },
            MapOptions::default(),
        )
    }

    fn polyline(points: &[(f64, f64)]) -> PolylineSpec {
        PolylineSpec {
            path: points.iter().map(|(lng, lat)| LngLat::new(*lng, *lat)).collect(),
            stroke_color: "#1890ff".into(),
            stroke_weight: 6,
            stroke_opacity: 0.8,
        }
    }

    #[rstest]
    fn fixed_surface_only_measures_its_id() {
        let surface = FixedSurface::new("map", 640, 480);

        assert_eq!(surface.measure("map"), Some(SurfaceSize::new(640, 480)));
        assert_eq!(surface.measure("other"), None);
    }

    #[rstest]
    fn fitting_centers_on_the_bounds(map: HeadlessMap) {
        let line = map.add_polyline(&polyline(&[(116.0, 39.0), (117.0, 40.0)]));

        map.fit_view(&[line], Padding::uniform(50));

        assert_eq!(map.center(), LngLat::new(116.5, 39.5));
        assert!((MIN_FIT_ZOOM..=MAX_FIT_ZOOM).contains(&map.zoom()));
    }

    #[rstest]
    fn fitting_nothing_keeps_the_view(map: HeadlessMap) {
        let before = map.center();

        map.fit_view(&[], Padding::uniform(50));

        assert_eq!(map.center(), before);
    }

    #[rstest]
    fn geojson_lists_markers_paths_and_open_popups(map: HeadlessMap) {
        let marker = map.add_marker(&MarkerSpec {
            position: LngLat::new(116.4, 39.9),
            title: "Gate".into(),
            visual: MarkerVisual::Default { icon: None },
        });
        map.set_marker_visual(marker, &MarkerVisual::Highlighted);
        map.add_polyline(&polyline(&[(116.0, 39.0), (116.5, 39.5)]));
        let closed = map.create_popup(&PopupSpec {
            content: "closed".into(),
        });
        let open = map.create_popup(&PopupSpec {
            content: "open".into(),
        });
        map.open_popup(open, LngLat::new(116.4, 39.9));

        let geojson = map.to_geojson();

        let features = geojson["features"].as_array().expect("features");
        assert_eq!(features.len(), 3);
        assert_eq!(features[0]["properties"]["highlighted"], true);
        assert_eq!(features[1]["geometry"]["type"], "LineString");
        assert_eq!(features[2]["properties"]["content"], "open");
        assert!(features.iter().all(|f| f["id"] != closed.0));
    }

    #[rstest]
    fn destroy_clears_the_scene(map: HeadlessMap) {
        map.add_polyline(&polyline(&[(0.0, 0.0), (1.0, 1.0)]));

        map.destroy();

        assert!(map.is_destroyed());
        assert!(map.polylines().is_empty());
    }
}
