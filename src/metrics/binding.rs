//! Recompute-on-change binding between a session snapshot and its metrics
//!
//! The binding exposes `{ metrics, loading }` to a presentation layer. Each
//! new snapshot flags `loading`, waits a short debounce so bursts of changes
//! coalesce, computes on the blocking pool and publishes the result. A newer
//! snapshot supersedes any computation still in flight (last write wins).
//! A failed or panicking computation publishes `metrics: None`.

use super::{Metrics, MetricsCalculator};
use crate::session::Snapshot;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Default delay before a computation starts
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// What the presentation layer sees
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsState {
    /// Latest metrics, or `None` before the first result or after a failure
    pub metrics: Option<Metrics>,
    /// Whether a computation is pending
    pub loading: bool,
}

impl Default for MetricsState {
    fn default() -> Self {
        Self {
            metrics: None,
            loading: true,
        }
    }
}

struct Pending {
    snapshot: Snapshot,
    task: JoinHandle<()>,
}

/// Keeps a [`MetricsState`] in step with the latest snapshot
///
/// Must be driven from within a tokio runtime.
///
/// # Examples
///
/// ```
/// use chatlens::metrics::{MetricsBinding, MetricsCalculator, ReportZone};
/// use chatlens::session::Snapshot;
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() {
/// let binding = MetricsBinding::new(MetricsCalculator::new(ReportZone::utc()), Duration::ZERO);
/// binding.update(Snapshot::default());
///
/// let metrics = binding.wait_ready().await.unwrap();
/// assert_eq!(metrics.total_sessions, 0);
/// # }
/// ```
pub struct MetricsBinding {
    calculator: Arc<MetricsCalculator>,
    debounce: Duration,
    generation: Arc<AtomicU64>,
    state: watch::Sender<MetricsState>,
    pending: Mutex<Option<Pending>>,
}

impl MetricsBinding {
    /// Create a binding; nothing is computed until [`update`](Self::update)
    pub fn new(calculator: MetricsCalculator, debounce: Duration) -> Self {
        let (state, _) = watch::channel(MetricsState::default());
        Self {
            calculator: Arc::new(calculator),
            debounce,
            generation: Arc::new(AtomicU64::new(0)),
            state,
            pending: Mutex::new(None),
        }
    }

    /// Schedule a recomputation for `snapshot`
    ///
    /// A snapshot sharing storage with the last one is ignored.
    pub fn update(&self, snapshot: Snapshot) {
        let mut pending = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(previous) = pending.as_ref() {
            if previous.snapshot.same_as(&snapshot) {
                tracing::trace!("Snapshot unchanged, skipping recomputation");
                return;
            }
        }

        if let Some(previous) = pending.take() {
            previous.task.abort();
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|state| state.loading = true);
        tracing::debug!(generation, sessions = snapshot.len(), "Scheduling metrics recomputation");

        let task = tokio::spawn(recompute(
            Arc::clone(&self.calculator),
            snapshot.clone(),
            self.debounce,
            generation,
            Arc::clone(&self.generation),
            self.state.clone(),
        ));

        *pending = Some(Pending { snapshot, task });
    }

    /// Current state
    pub fn state(&self) -> MetricsState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<MetricsState> {
        self.state.subscribe()
    }

    /// Wait until no computation is pending and return the published metrics
    ///
    /// Returns `None` right away when [`update`](Self::update) was never called.
    pub async fn wait_ready(&self) -> Option<Metrics> {
        let mut rx = self.subscribe();
        let scheduled = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some();
        if !scheduled {
            return self.state.borrow().metrics.clone();
        }
        let state = rx.wait_for(|state| !state.loading).await.ok()?;
        state.metrics.clone()
    }
}

impl Drop for MetricsBinding {
    fn drop(&mut self) {
        let pending = self
            .pending
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.take() {
            previous.task.abort();
        }
    }
}

async fn recompute(
    calculator: Arc<MetricsCalculator>,
    snapshot: Snapshot,
    debounce: Duration,
    generation: u64,
    latest: Arc<AtomicU64>,
    state: watch::Sender<MetricsState>,
) {
    if !debounce.is_zero() {
        tokio::time::sleep(debounce).await;
    }

    let outcome =
        tokio::task::spawn_blocking(move || calculator.compute(snapshot.sessions())).await;

    let metrics = match outcome {
        Ok(Ok(metrics)) => Some(metrics),
        Ok(Err(e)) => {
            tracing::error!("Error calculating metrics: {:#}", e);
            None
        }
        Err(e) => {
            tracing::error!("Metrics computation aborted: {}", e);
            None
        }
    };

    state.send_if_modified(|current| {
        if latest.load(Ordering::SeqCst) != generation {
            return false;
        }
        *current = MetricsState {
            metrics,
            loading: false,
        };
        true
    });
}
