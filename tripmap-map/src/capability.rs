//! Per-mode routing capability loading.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures_util::future::{BoxFuture, FutureExt, Shared, join_all};
use log::{debug, info, warn};
use tripmap_core::provider::{MapRuntime, RouteBackend};
use tripmap_core::{CapabilityState, RouteMode};

use crate::lock;

#[derive(Clone, Default)]
struct CapabilitySlot {
    state: CapabilityState,
    backend: Option<Arc<dyn RouteBackend>>,
}

#[derive(Default)]
struct TableState {
    epoch: u64,
    slots: HashMap<RouteMode, CapabilitySlot>,
}

/// Load state and backend of each routing mode.
///
/// Writes carry the epoch they were started under; a [`reset`](Self::reset)
/// advances the epoch so results from abandoned loads are ignored.
#[derive(Default)]
pub struct CapabilityTable {
    inner: Mutex<TableState>,
}

impl std::fmt::Debug for CapabilityTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let states: Vec<_> = RouteMode::ALL
            .iter()
            .map(|mode| (*mode, self.state(*mode)))
            .collect();
        f.debug_struct("CapabilityTable")
            .field("states", &states)
            .finish()
    }
}

impl CapabilityTable {
    /// Current state of `mode`.
    #[must_use]
    pub fn state(&self, mode: RouteMode) -> CapabilityState {
        lock(&self.inner)
            .slots
            .get(&mode)
            .map_or(CapabilityState::Unloaded, |slot| slot.state)
    }

    /// Backend for `mode`, present only once it is ready.
    #[must_use]
    pub fn backend(&self, mode: RouteMode) -> Option<Arc<dyn RouteBackend>> {
        let inner = lock(&self.inner);
        let slot = inner.slots.get(&mode)?;
        match slot.state {
            CapabilityState::Ready => slot.backend.clone(),
            _ => None,
        }
    }

    /// Forget every mode and invalidate in-flight loads.
    pub fn reset(&self) {
        let mut inner = lock(&self.inner);
        inner.epoch += 1;
        inner.slots.clear();
    }

    fn epoch(&self) -> u64 {
        lock(&self.inner).epoch
    }

    fn record(&self, epoch: u64, mode: RouteMode, slot: CapabilitySlot) -> bool {
        let mut inner = lock(&self.inner);
        if inner.epoch != epoch {
            return false;
        }
        inner.slots.insert(mode, slot);
        true
    }
}

/// Outcome of one capability load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityOutcome {
    /// Mode that was loaded.
    pub mode: RouteMode,
    /// Terminal state reached.
    pub state: CapabilityState,
    /// Provider diagnostic for a failed load.
    pub diagnostic: Option<String>,
}

/// Joined outcome of loading every routing capability.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CapabilityReport {
    outcomes: Vec<CapabilityOutcome>,
}

impl CapabilityReport {
    /// Number of capabilities that reported.
    #[must_use]
    pub fn reported(&self) -> usize {
        self.outcomes.len()
    }

    /// Terminal state recorded for `mode`.
    #[must_use]
    pub fn state(&self, mode: RouteMode) -> CapabilityState {
        self.outcomes
            .iter()
            .find(|outcome| outcome.mode == mode)
            .map_or(CapabilityState::Unloaded, |outcome| outcome.state)
    }

    /// Modes whose capability is ready.
    #[must_use]
    pub fn ready_modes(&self) -> Vec<RouteMode> {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.state == CapabilityState::Ready)
            .map(|outcome| outcome.mode)
            .collect()
    }

    /// Every outcome, in load order.
    #[must_use]
    pub fn outcomes(&self) -> &[CapabilityOutcome] {
        &self.outcomes
    }
}

type JoinFuture = Shared<BoxFuture<'static, CapabilityReport>>;

enum InitPhase {
    Idle,
    Running { epoch: u64, join: JoinFuture },
    Done(CapabilityReport),
}

/// Loads the driving, transit and walking capabilities once per session.
///
/// The three loads run concurrently and independently; one failing leaves
/// the others usable. Initialization completes when all three report.
pub struct CapabilityInitializer {
    table: Arc<CapabilityTable>,
    phase: Mutex<InitPhase>,
}

impl std::fmt::Debug for CapabilityInitializer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityInitializer")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

impl CapabilityInitializer {
    /// Create an initializer that records into `table`.
    pub fn new(table: Arc<CapabilityTable>) -> Self {
        Self {
            table,
            phase: Mutex::new(InitPhase::Idle),
        }
    }

    /// Load every capability, or join the load already under way.
    ///
    /// Repeated calls after completion return the first report without
    /// loading anything again.
    pub async fn init_capabilities(&self, runtime: Arc<dyn MapRuntime>) -> CapabilityReport {
        let (epoch, join) = {
            let mut phase = lock(&self.phase);
            let pending = match &*phase {
                InitPhase::Done(report) => return report.clone(),
                InitPhase::Running { epoch, join } => Some((*epoch, join.clone())),
                InitPhase::Idle => None,
            };
            match pending {
                Some(pending) => pending,
                None => {
                    let epoch = self.table.epoch();
                    let join = self.start(epoch, runtime);
                    *phase = InitPhase::Running {
                        epoch,
                        join: join.clone(),
                    };
                    (epoch, join)
                }
            }
        };

        let report = join.await;
        let mut phase = lock(&self.phase);
        if matches!(&*phase, InitPhase::Running { epoch: active, .. } if *active == epoch) {
            *phase = InitPhase::Done(report.clone());
        }
        report
    }

    /// Return to the uninitialized state, discarding in-flight results.
    pub fn reset(&self) {
        *lock(&self.phase) = InitPhase::Idle;
        self.table.reset();
    }

    fn start(&self, epoch: u64, runtime: Arc<dyn MapRuntime>) -> JoinFuture {
        for mode in RouteMode::ALL {
            self.table.record(
                epoch,
                mode,
                CapabilitySlot {
                    state: CapabilityState::Loading,
                    backend: None,
                },
            );
        }
        let table = Arc::clone(&self.table);
        async move {
            let loads = RouteMode::ALL
                .map(|mode| load_capability(Arc::clone(&table), Arc::clone(&runtime), epoch, mode));
            let report = CapabilityReport {
                outcomes: join_all(loads).await,
            };
            info!(
                "{} of {} routing capabilities ready",
                report.ready_modes().len(),
                report.reported()
            );
            report
        }
        .boxed()
        .shared()
    }
}

async fn load_capability(
    table: Arc<CapabilityTable>,
    runtime: Arc<dyn MapRuntime>,
    epoch: u64,
    mode: RouteMode,
) -> CapabilityOutcome {
    debug!("loading {mode} capability");
    let (slot, diagnostic) = match runtime.load_capability(mode).await {
        Ok(backend) => (
            CapabilitySlot {
                state: CapabilityState::Ready,
                backend: Some(backend),
            },
            None,
        ),
        Err(message) => {
            warn!("{mode} capability failed to load: {message}");
            (
                CapabilitySlot {
                    state: CapabilityState::Failed,
                    backend: None,
                },
                Some(message),
            )
        }
    };
    let state = slot.state;
    if !table.record(epoch, mode, slot) {
        debug!("discarding stale {mode} capability result");
    }
    CapabilityOutcome {
        mode,
        state,
        diagnostic,
    }
}
