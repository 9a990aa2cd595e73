//! Single-flight loading of the provider runtime.

use std::sync::{Arc, Mutex, Weak};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use log::{debug, info, warn};
use tripmap_core::MapError;
use tripmap_core::provider::{Credentials, MapRuntime, RuntimeBootstrap};

use crate::lock;

type LoadResult = Result<Arc<dyn MapRuntime>, MapError>;
type LoadFuture = Shared<BoxFuture<'static, LoadResult>>;

enum LoaderState {
    Absent,
    Loading { generation: u64, load: LoadFuture },
    Ready(Arc<dyn MapRuntime>),
}

struct LoaderSlot {
    state: LoaderState,
    generation: u64,
}

/// Ensures the provider runtime is loaded exactly once.
///
/// Concurrent [`ensure_runtime`](Self::ensure_runtime) calls share one
/// in-flight bootstrap, which settles the loader state exactly once. A
/// failed bootstrap leaves the loader empty; the caller decides whether to
/// try again.
pub struct RuntimeLoader {
    bootstrap: Arc<dyn RuntimeBootstrap>,
    credentials: Credentials,
    slot: Arc<Mutex<LoaderSlot>>,
}

impl std::fmt::Debug for RuntimeLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeLoader")
            .field("credentials", &self.credentials)
            .field("loaded", &self.is_loaded())
            .finish_non_exhaustive()
    }
}

impl RuntimeLoader {
    /// Create a loader that bootstraps with `credentials`.
    pub fn new(bootstrap: Arc<dyn RuntimeBootstrap>, credentials: Credentials) -> Self {
        Self {
            bootstrap,
            credentials,
            slot: Arc::new(Mutex::new(LoaderSlot {
                state: LoaderState::Absent,
                generation: 0,
            })),
        }
    }

    /// Return the runtime, loading it first if necessary.
    ///
    /// # Errors
    /// Returns [`MapError::RuntimeLoad`] when the bootstrap fails. Every
    /// caller sharing that load receives the same error. A load overtaken
    /// by [`destroy`](Self::destroy) also fails, and the runtime it produced
    /// is torn down.
    pub async fn ensure_runtime(&self) -> LoadResult {
        let load = {
            let mut slot = lock(&self.slot);
            let pending = match &slot.state {
                LoaderState::Ready(runtime) => return Ok(Arc::clone(runtime)),
                LoaderState::Loading { load, .. } => Some(load.clone()),
                LoaderState::Absent => None,
            };
            match pending {
                Some(load) => load,
                None => {
                    slot.generation += 1;
                    let generation = slot.generation;
                    let load = self.start_load(generation);
                    slot.state = LoaderState::Loading {
                        generation,
                        load: load.clone(),
                    };
                    load
                }
            }
        };
        load.await
    }

    /// Whether a runtime is currently loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(lock(&self.slot).state, LoaderState::Ready(_))
    }

    /// Drop the runtime and run its teardown hook. Safe to call repeatedly.
    ///
    /// An in-flight load is abandoned: its callers receive an error and the
    /// runtime it yields is destroyed on arrival.
    pub fn destroy(&self) {
        let previous = std::mem::replace(&mut lock(&self.slot).state, LoaderState::Absent);
        match previous {
            LoaderState::Ready(runtime) => {
                runtime.destroy();
                info!("map runtime destroyed");
            }
            LoaderState::Loading { generation, .. } => {
                debug!("abandoned runtime load {generation}");
            }
            LoaderState::Absent => {}
        }
    }

    fn start_load(&self, generation: u64) -> LoadFuture {
        debug!("loading map runtime");
        let bootstrap = Arc::clone(&self.bootstrap);
        let credentials = self.credentials.clone();
        let slot = Arc::downgrade(&self.slot);
        async move {
            let outcome = bootstrap.load(&credentials).await;
            settle(&slot, generation, outcome)
        }
        .boxed()
        .shared()
    }
}

/// Record the outcome of load `generation`, unless a destroy overtook it.
fn settle(slot: &Weak<Mutex<LoaderSlot>>, generation: u64, outcome: LoadResult) -> LoadResult {
    if let Some(slot) = slot.upgrade() {
        let mut slot = lock(&slot);
        let current = matches!(
            &slot.state,
            LoaderState::Loading { generation: active, .. } if *active == generation
        );
        if current {
            slot.state = match &outcome {
                Ok(runtime) => {
                    info!("map runtime loaded");
                    LoaderState::Ready(Arc::clone(runtime))
                }
                Err(err) => {
                    warn!("map runtime failed to load: {err}");
                    LoaderState::Absent
                }
            };
            return outcome;
        }
    }
    if let Ok(runtime) = &outcome {
        runtime.destroy();
        info!("runtime from abandoned load {generation} destroyed");
    }
    Err(MapError::RuntimeLoad {
        message: "runtime destroyed during load".to_owned(),
    })
}
