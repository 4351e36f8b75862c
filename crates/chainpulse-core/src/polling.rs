//! Resilient polling sources.
//!
//! A [`PollingSource`] keeps one always-renderable value per data kind. It
//! starts at the fallback, refreshes on a fixed interval and on demand, and
//! substitutes the fallback (never the previous success) whenever a fetch
//! fails.
//!
//! # In-flight policy
//!
//! Fetches are single-flight per source. A timer tick or an explicit
//! [`PollingSource::refresh_now`] that arrives while a fetch is outstanding is
//! skipped, and missed timer ticks are not replayed. Completed fetches are
//! applied in completion order.
//!
//! # Teardown
//!
//! [`PollingSource::dispose`] (also run on drop) aborts the timer task and
//! marks the source disposed under the state lock, so a fetch that completes
//! afterwards is discarded.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use time::OffsetDateTime;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::config::duration_millis;
use crate::error::FetchError;
use crate::rpc::ValueFetcher;

/// Whether the current value came from the upstream or from the fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceHealth {
    Fresh,
    Degraded,
}

/// State owned by one source and published to its subscribers.
#[derive(Debug, Clone)]
pub struct PollingState<T> {
    pub current_value: T,
    pub last_updated: OffsetDateTime,
    pub last_error: Option<FetchError>,
    pub health: SourceHealth,
    pub is_loading: bool,
    pub completed_fetches: u64,
}

impl<T> PollingState<T> {
    fn initial(fallback: T, is_loading: bool) -> Self {
        Self {
            current_value: fallback,
            last_updated: OffsetDateTime::now_utc(),
            last_error: None,
            health: SourceHealth::Fresh,
            is_loading,
            completed_fetches: 0,
        }
    }
}

/// Consumer-facing view of a source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceSnapshot<T> {
    pub value: T,
    pub is_loading: bool,
    pub last_error_message: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
    pub health: SourceHealth,
}

impl<T: Clone> From<&PollingState<T>> for SourceSnapshot<T> {
    fn from(state: &PollingState<T>) -> Self {
        Self {
            value: state.current_value.clone(),
            is_loading: state.is_loading,
            last_error_message: state.last_error.as_ref().map(ToString::to_string),
            last_updated: state.last_updated,
            health: state.health,
        }
    }
}

/// Result of a refresh request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied(SourceHealth),
    /// Another fetch for this source was already in flight.
    Skipped,
    Disposed,
}

#[derive(Debug, Clone, Copy)]
enum Trigger {
    Timer,
    Manual,
}

impl Trigger {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Timer => "timer",
            Self::Manual => "manual",
        }
    }
}

struct SourceInner<T> {
    name: String,
    fallback: T,
    fetcher: Option<Arc<dyn ValueFetcher<T>>>,
    state: watch::Sender<PollingState<T>>,
    in_flight: Mutex<()>,
    disposed: AtomicBool,
    attempts: AtomicU64,
}

impl<T> SourceInner<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn refresh(&self, trigger: Trigger) -> RefreshOutcome {
        if self.disposed.load(Ordering::Acquire) {
            return RefreshOutcome::Disposed;
        }

        let Some(fetcher) = self.fetcher.as_ref() else {
            let health = self.state.borrow().health;
            return RefreshOutcome::Applied(health);
        };

        let Ok(_guard) = self.in_flight.try_lock() else {
            debug!(
                source = %self.name,
                trigger = trigger.as_str(),
                "fetch already in flight; skipping"
            );
            return RefreshOutcome::Skipped;
        };

        let started = self.state.send_if_modified(|state| {
            if self.disposed.load(Ordering::Acquire) {
                return false;
            }
            let changed = !state.is_loading;
            state.is_loading = true;
            changed
        });
        if !started && self.disposed.load(Ordering::Acquire) {
            return RefreshOutcome::Disposed;
        }

        self.attempts.fetch_add(1, Ordering::Relaxed);
        debug!(
            source = %self.name,
            fetcher = %fetcher.describe(),
            trigger = trigger.as_str(),
            "fetching"
        );
        let mut loading = LoadingReset::new(self);
        let result = fetcher.fetch().await;
        loading.disarm();
        self.apply(result)
    }

    fn apply(&self, result: Result<T, FetchError>) -> RefreshOutcome {
        let (value, health, failure) = match result {
            Ok(value) => (value, SourceHealth::Fresh, None),
            Err(error) => (self.fallback.clone(), SourceHealth::Degraded, Some(error)),
        };
        let recorded = failure.clone();

        let applied = self.state.send_if_modified(move |state| {
            if self.disposed.load(Ordering::Acquire) {
                return false;
            }
            state.current_value = value;
            state.last_error = recorded;
            state.health = health;
            state.is_loading = false;
            state.last_updated = OffsetDateTime::now_utc();
            state.completed_fetches += 1;
            true
        });

        if !applied {
            debug!(source = %self.name, "source disposed; discarding completed fetch");
            return RefreshOutcome::Disposed;
        }

        match failure {
            Some(error) => error!(
                source = %self.name,
                kind = error.code(),
                error = %error,
                "fetch failed; serving fallback value"
            ),
            None => debug!(source = %self.name, "fetch applied"),
        }
        RefreshOutcome::Applied(health)
    }
}

/// Clears `is_loading` if a fetch is abandoned before its result is applied.
struct LoadingReset<'a, T> {
    inner: &'a SourceInner<T>,
    armed: bool,
}

impl<'a, T> LoadingReset<'a, T> {
    fn new(inner: &'a SourceInner<T>) -> Self {
        Self { inner, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl<T> Drop for LoadingReset<'_, T> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let cleared = self.inner.state.send_if_modified(|state| {
            let was_loading = state.is_loading;
            state.is_loading = false;
            was_loading
        });
        if cleared {
            debug!(source = %self.inner.name, "fetch abandoned before completion");
        }
    }
}

/// Always-available value for one data kind, refreshed on a fixed schedule.
pub struct PollingSource<T> {
    inner: Arc<SourceInner<T>>,
    interval: Option<Duration>,
    timer: Option<JoinHandle<()>>,
}

impl<T> PollingSource<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Starts a source whose first fetch runs immediately and then every
    /// `interval`. Must be called from within a tokio runtime.
    pub fn spawn(
        name: impl Into<String>,
        fallback: T,
        interval: Duration,
        fetcher: Arc<dyn ValueFetcher<T>>,
    ) -> Self {
        let name = name.into();
        let interval = interval.max(Duration::from_millis(1));
        let (state, _) = watch::channel(PollingState::initial(fallback.clone(), true));
        let inner = Arc::new(SourceInner {
            name,
            fallback,
            fetcher: Some(fetcher),
            state,
            in_flight: Mutex::new(()),
            disposed: AtomicBool::new(false),
            attempts: AtomicU64::new(0),
        });

        info!(
            source = %inner.name,
            interval_ms = duration_millis(interval),
            "polling source started"
        );

        let timer = tokio::spawn(run_timer(Arc::clone(&inner), interval));
        Self {
            inner,
            interval: Some(interval),
            timer: Some(timer),
        }
    }

    /// A source that never fetches: it serves `fallback` and reports `reason`
    /// as its error. Used when the upstream is not configured.
    pub fn permanent_fallback(name: impl Into<String>, fallback: T, reason: FetchError) -> Self {
        let mut initial = PollingState::initial(fallback.clone(), false);
        initial.health = SourceHealth::Degraded;
        initial.last_error = Some(reason);
        let (state, _) = watch::channel(initial);

        Self {
            inner: Arc::new(SourceInner {
                name: name.into(),
                fallback,
                fetcher: None,
                state,
                in_flight: Mutex::new(()),
                disposed: AtomicBool::new(false),
                attempts: AtomicU64::new(0),
            }),
            interval: None,
            timer: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    pub fn fallback(&self) -> &T {
        &self.inner.fallback
    }

    /// Latest cached value.
    pub fn current_value(&self) -> T {
        self.inner.state.borrow().current_value.clone()
    }

    pub fn snapshot(&self) -> SourceSnapshot<T> {
        SourceSnapshot::from(&*self.inner.state.borrow())
    }

    pub fn state(&self) -> PollingState<T> {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified on every applied update.
    pub fn subscribe(&self) -> watch::Receiver<PollingState<T>> {
        self.inner.state.subscribe()
    }

    /// Number of fetches started so far.
    pub fn attempts(&self) -> u64 {
        self.inner.attempts.load(Ordering::Relaxed)
    }

    /// Fetches out of band, subject to the single-flight policy.
    pub async fn refresh_now(&self) -> RefreshOutcome {
        self.inner.refresh(Trigger::Manual).await
    }

    /// Waits until no fetch is in flight and returns the resulting snapshot.
    pub async fn settled(&self) -> SourceSnapshot<T> {
        let mut receiver = self.subscribe();
        let snapshot = match receiver.wait_for(|state| !state.is_loading).await {
            Ok(state) => SourceSnapshot::from(&*state),
            Err(_) => self.snapshot(),
        };
        snapshot
    }
}

impl<T> PollingSource<T> {
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::Acquire)
    }

    /// Stops the timer; later fetch completions are discarded.
    pub fn dispose(&self) {
        let mut newly_disposed = false;
        self.inner.state.send_if_modified(|state| {
            newly_disposed = !self.inner.disposed.swap(true, Ordering::AcqRel);
            let was_loading = state.is_loading;
            state.is_loading = false;
            was_loading
        });

        if let Some(timer) = &self.timer {
            timer.abort();
        }

        if newly_disposed {
            info!(source = %self.inner.name, "polling source disposed");
        }
    }
}

impl<T> Drop for PollingSource<T> {
    fn drop(&mut self) {
        self.dispose();
    }
}

async fn run_timer<T>(inner: Arc<SourceInner<T>>, interval: Duration)
where
    T: Clone + Send + Sync + 'static,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        if inner.disposed.load(Ordering::Acquire) {
            break;
        }
        if inner.refresh(Trigger::Timer).await == RefreshOutcome::Disposed {
            break;
        }
    }

    debug!(source = %inner.name, "timer stopped");
}
