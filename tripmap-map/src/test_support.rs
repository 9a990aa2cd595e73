//! Recording doubles for the provider traits.
//!
//! Used by this crate's tests and by downstream crates that exercise a
//! [`MapSession`](crate::MapSession) without a real provider.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tripmap_core::provider::{
    ContainerHandle, Credentials, MapOptions, MapRuntime, MapView, MarkerSpec, MarkerVisual,
    OverlayId, Padding, PolylineSpec, PopupSpec, RouteBackend, RouteRequest, RuntimeBootstrap,
    SearchCallback, SearchPayload, SearchStatus, SurfaceProbe, SurfaceSize,
};
use tripmap_core::{LngLat, MapError, RouteMode};

use crate::lock;

/// Bootstrap that hands out a fixed runtime or a fixed failure.
///
/// Each load yields to the scheduler once so concurrent callers overlap.
pub struct StubBootstrap {
    outcome: Result<Arc<dyn MapRuntime>, MapError>,
    loads: AtomicUsize,
}

impl StubBootstrap {
    /// Succeed with `runtime`.
    pub fn new(runtime: Arc<dyn MapRuntime>) -> Self {
        Self {
            outcome: Ok(runtime),
            loads: AtomicUsize::new(0),
        }
    }

    /// Fail every load with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(MapError::RuntimeLoad {
                message: message.into(),
            }),
            loads: AtomicUsize::new(0),
        }
    }

    /// Number of bootstrap attempts.
    #[must_use]
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RuntimeBootstrap for StubBootstrap {
    async fn load(&self, _credentials: &Credentials) -> Result<Arc<dyn MapRuntime>, MapError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.outcome.clone()
    }
}

/// Runtime that records map construction and capability loads.
///
/// Every capability loads successfully with a [`StubRouteBackend`] that
/// reports `no_data`, unless overridden.
pub struct RecordingRuntime {
    capabilities: HashMap<RouteMode, Result<Arc<dyn RouteBackend>, String>>,
    construction_failure: Option<String>,
    views: Mutex<Vec<Arc<RecordingView>>>,
    capability_loads: Mutex<Vec<RouteMode>>,
    destroyed: AtomicUsize,
}

impl Default for RecordingRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingRuntime {
    /// Runtime whose capabilities all load.
    #[must_use]
    pub fn new() -> Self {
        Self {
            capabilities: HashMap::new(),
            construction_failure: None,
            views: Mutex::new(Vec::new()),
            capability_loads: Mutex::new(Vec::new()),
            destroyed: AtomicUsize::new(0),
        }
    }

    /// Serve `mode` with `backend`.
    #[must_use]
    pub fn with_backend(mut self, mode: RouteMode, backend: Arc<dyn RouteBackend>) -> Self {
        self.capabilities.insert(mode, Ok(backend));
        self
    }

    /// Fail to load `mode` with `message`.
    #[must_use]
    pub fn with_failing_capability(mut self, mode: RouteMode, message: impl Into<String>) -> Self {
        self.capabilities.insert(mode, Err(message.into()));
        self
    }

    /// Refuse to construct maps.
    #[must_use]
    pub fn with_construction_failure(mut self, message: impl Into<String>) -> Self {
        self.construction_failure = Some(message.into());
        self
    }

    /// The most recently constructed view, or a detached one if none was.
    #[must_use]
    pub fn view(&self) -> Arc<RecordingView> {
        lock(&self.views).last().cloned().unwrap_or_default()
    }

    /// Number of maps constructed.
    #[must_use]
    pub fn maps_created(&self) -> usize {
        lock(&self.views).len()
    }

    /// Number of load requests issued for `mode`.
    #[must_use]
    pub fn capability_loads(&self, mode: RouteMode) -> usize {
        lock(&self.capability_loads)
            .iter()
            .filter(|loaded| **loaded == mode)
            .count()
    }

    /// Whether [`MapRuntime::destroy`] ran.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroy_calls() > 0
    }

    /// Number of [`MapRuntime::destroy`] calls.
    #[must_use]
    pub fn destroy_calls(&self) -> usize {
        self.destroyed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MapRuntime for RecordingRuntime {
    fn create_map(
        &self,
        _container: &ContainerHandle,
        _options: &MapOptions,
    ) -> Result<Arc<dyn MapView>, MapError> {
        if let Some(message) = &self.construction_failure {
            return Err(MapError::MapConstruction {
                message: message.clone(),
            });
        }
        let view = Arc::new(RecordingView::default());
        lock(&self.views).push(Arc::clone(&view));
        Ok(view)
    }

    async fn load_capability(&self, mode: RouteMode) -> Result<Arc<dyn RouteBackend>, String> {
        lock(&self.capability_loads).push(mode);
        tokio::task::yield_now().await;
        match self.capabilities.get(&mode) {
            Some(outcome) => outcome.clone(),
            None => Ok(Arc::new(StubRouteBackend::replying(
                SearchStatus::NoData,
                SearchPayload::Empty,
            ))),
        }
    }

    fn destroy(&self) {
        self.destroyed.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct ViewState {
    next_id: u64,
    markers: BTreeMap<OverlayId, MarkerVisual>,
    polylines: BTreeMap<OverlayId, PolylineSpec>,
    popups: BTreeMap<OverlayId, Option<LngLat>>,
    center: Option<LngLat>,
    zoom: Option<f64>,
    fits: Vec<(Vec<OverlayId>, Padding)>,
    destroy_calls: usize,
}

impl ViewState {
    fn allocate(&mut self) -> OverlayId {
        self.next_id += 1;
        OverlayId(self.next_id)
    }
}

/// Map view that records every overlay and viewport change.
#[derive(Default)]
pub struct RecordingView {
    state: Mutex<ViewState>,
}

impl RecordingView {
    /// Current appearance of `marker`.
    #[must_use]
    pub fn marker_visual(&self, marker: OverlayId) -> Option<MarkerVisual> {
        lock(&self.state).markers.get(&marker).cloned()
    }

    /// Number of live markers.
    #[must_use]
    pub fn marker_count(&self) -> usize {
        lock(&self.state).markers.len()
    }

    /// Live polylines in creation order.
    #[must_use]
    pub fn polylines(&self) -> Vec<PolylineSpec> {
        lock(&self.state).polylines.values().cloned().collect()
    }

    /// Popups currently open.
    #[must_use]
    pub fn open_popups(&self) -> Vec<OverlayId> {
        lock(&self.state)
            .popups
            .iter()
            .filter(|(_, anchor)| anchor.is_some())
            .map(|(id, _)| *id)
            .collect()
    }

    /// Last center set.
    #[must_use]
    pub fn center(&self) -> Option<LngLat> {
        lock(&self.state).center
    }

    /// Last zoom set.
    #[must_use]
    pub fn zoom(&self) -> Option<f64> {
        lock(&self.state).zoom
    }

    /// Every fit request in order.
    #[must_use]
    pub fn fits(&self) -> Vec<(Vec<OverlayId>, Padding)> {
        lock(&self.state).fits.clone()
    }

    /// Whether the view was destroyed.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroy_calls() > 0
    }

    /// Number of destroy calls.
    #[must_use]
    pub fn destroy_calls(&self) -> usize {
        lock(&self.state).destroy_calls
    }
}

impl MapView for RecordingView {
    fn add_marker(&self, spec: &MarkerSpec) -> OverlayId {
        let mut state = lock(&self.state);
        let id = state.allocate();
        state.markers.insert(id, spec.visual.clone());
        id
    }

    fn set_marker_visual(&self, marker: OverlayId, visual: &MarkerVisual) {
        if let Some(current) = lock(&self.state).markers.get_mut(&marker) {
            *current = visual.clone();
        }
    }

    fn add_polyline(&self, spec: &PolylineSpec) -> OverlayId {
        let mut state = lock(&self.state);
        let id = state.allocate();
        state.polylines.insert(id, spec.clone());
        id
    }

    fn create_popup(&self, _spec: &PopupSpec) -> OverlayId {
        let mut state = lock(&self.state);
        let id = state.allocate();
        state.popups.insert(id, None);
        id
    }

    fn open_popup(&self, popup: OverlayId, at: LngLat) {
        if let Some(anchor) = lock(&self.state).popups.get_mut(&popup) {
            *anchor = Some(at);
        }
    }

    fn close_popup(&self, popup: OverlayId) {
        if let Some(anchor) = lock(&self.state).popups.get_mut(&popup) {
            *anchor = None;
        }
    }

    fn remove(&self, overlay: OverlayId) {
        let mut state = lock(&self.state);
        state.markers.remove(&overlay);
        state.polylines.remove(&overlay);
        state.popups.remove(&overlay);
    }

    fn set_center(&self, center: LngLat) {
        lock(&self.state).center = Some(center);
    }

    fn set_zoom(&self, zoom: f64) {
        lock(&self.state).zoom = Some(zoom);
    }

    fn fit_view(&self, overlays: &[OverlayId], padding: Padding) {
        lock(&self.state).fits.push((overlays.to_vec(), padding));
    }

    fn destroy(&self) {
        let mut state = lock(&self.state);
        state.markers.clear();
        state.polylines.clear();
        state.popups.clear();
        state.destroy_calls += 1;
    }
}

/// Surface probe that replays scripted sizes for one surface id.
///
/// The last scripted size repeats once the script runs out.
pub struct ScriptedSurface {
    id: String,
    sizes: Mutex<VecDeque<SurfaceSize>>,
    checks: AtomicUsize,
}

impl ScriptedSurface {
    /// Probe for surface `id` reporting `sizes` in turn.
    pub fn new(id: impl Into<String>, sizes: impl IntoIterator<Item = SurfaceSize>) -> Self {
        Self {
            id: id.into(),
            sizes: Mutex::new(sizes.into_iter().collect()),
            checks: AtomicUsize::new(0),
        }
    }

    /// Number of measurements taken.
    #[must_use]
    pub fn checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }
}

impl SurfaceProbe for ScriptedSurface {
    fn measure(&self, id: &str) -> Option<SurfaceSize> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        if id != self.id {
            return None;
        }
        let mut sizes = lock(&self.sizes);
        if sizes.len() > 1 {
            sizes.pop_front()
        } else {
            sizes.front().copied()
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Delivery {
    Immediate,
    Deferred,
    Never,
}

/// Routing backend that answers searches with scripted replies.
///
/// The last reply repeats once the script runs out.
pub struct StubRouteBackend {
    replies: Mutex<VecDeque<(SearchStatus, SearchPayload)>>,
    delivery: Delivery,
    requests: Mutex<Vec<RouteRequest>>,
}

impl StubRouteBackend {
    fn with_delivery(status: SearchStatus, payload: SearchPayload, delivery: Delivery) -> Self {
        Self {
            replies: Mutex::new(VecDeque::from([(status, payload)])),
            delivery,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer the next search with `status` and `payload`.
    #[must_use]
    pub fn then_replying(self, status: SearchStatus, payload: SearchPayload) -> Self {
        lock(&self.replies).push_back((status, payload));
        self
    }

    /// Invoke the callback before `search` returns.
    #[must_use]
    pub fn replying(status: SearchStatus, payload: SearchPayload) -> Self {
        Self::with_delivery(status, payload, Delivery::Immediate)
    }

    /// Invoke the callback later from a spawned task.
    #[must_use]
    pub fn deferred(status: SearchStatus, payload: SearchPayload) -> Self {
        Self::with_delivery(status, payload, Delivery::Deferred)
    }

    /// Drop the callback without invoking it.
    #[must_use]
    pub fn silent() -> Self {
        Self::with_delivery(SearchStatus::Complete, SearchPayload::Empty, Delivery::Never)
    }

    /// Requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RouteRequest> {
        lock(&self.requests).clone()
    }

    /// Number of searches started.
    #[must_use]
    pub fn calls(&self) -> usize {
        lock(&self.requests).len()
    }
}

impl RouteBackend for StubRouteBackend {
    fn search(&self, request: RouteRequest, callback: SearchCallback) {
        lock(&self.requests).push(request);
        let (status, payload) = {
            let mut replies = lock(&self.replies);
            if replies.len() > 1 {
                replies.pop_front()
            } else {
                replies.front().cloned()
            }
        }
        .unwrap_or((SearchStatus::NoData, SearchPayload::Empty));
        match self.delivery {
            Delivery::Immediate => callback(status, payload),
            Delivery::Deferred => {
                tokio::spawn(async move {
                    tokio::task::yield_now().await;
                    callback(status, payload);
                });
            }
            Delivery::Never => drop(callback),
        }
    }
}
