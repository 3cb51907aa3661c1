//! Single repeating timer driving the sampling cycles.
//!
//! At most one timer is armed at any time. `start` re-arms (stopping the
//! previous timer first), `stop` disarms, and changing the interval only
//! affects the next `start`.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

/// Future returned by a tick callback.
pub type TickFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Callback run on every tick.
pub type TickFn = Arc<dyn Fn() -> TickFuture + Send + Sync>;

struct ArmedTimer {
    period: Duration,
    /// Dropping or firing this ends the timer task after its current cycle.
    stop_tx: oneshot::Sender<()>,
}

struct SchedulerState {
    interval: Duration,
    armed: Option<ArmedTimer>,
}

/// Owns the repeating timer.
pub struct Scheduler {
    state: Mutex<SchedulerState>,
    tick: TickFn,
}

impl Scheduler {
    pub fn new(interval: Duration, tick: TickFn) -> Self {
        Self {
            state: Mutex::new(SchedulerState {
                interval,
                armed: None,
            }),
            tick,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SchedulerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Arms the timer with the stored interval, replacing any active timer.
    ///
    /// The first tick fires one full period after this call. Must be called
    /// from within a Tokio runtime.
    pub fn start(&self) {
        let mut state = self.lock();
        if let Some(previous) = state.armed.take() {
            let _ = previous.stop_tx.send(());
        }

        let period = state.interval;
        let (stop_tx, stop_rx) = oneshot::channel();
        tokio::spawn(run_timer(period, stop_rx, Arc::clone(&self.tick)));
        state.armed = Some(ArmedTimer { period, stop_tx });
    }

    /// Disarms the active timer. Returns `false` if none was active.
    ///
    /// A cycle already in progress is allowed to finish.
    pub fn stop(&self) -> bool {
        match self.lock().armed.take() {
            Some(timer) => {
                let _ = timer.stop_tx.send(());
                true
            }
            None => false,
        }
    }

    /// Stores a new interval. Returns whether a timer is currently armed.
    pub fn set_interval(&self, interval: Duration) -> bool {
        let mut state = self.lock();
        state.interval = interval;
        state.armed.is_some()
    }

    pub fn interval(&self) -> Duration {
        self.lock().interval
    }

    pub fn is_running(&self) -> bool {
        self.lock().armed.is_some()
    }

    /// Period of the active timer, `None` when stopped.
    pub fn armed_period(&self) -> Option<Duration> {
        self.lock().armed.as_ref().map(|t| t.period)
    }
}

async fn run_timer(period: Duration, mut stop_rx: oneshot::Receiver<()>, tick: TickFn) {
    // tokio intervals panic on a zero period.
    let period = period.max(Duration::from_nanos(1));
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = &mut stop_rx => break,
            _ = ticker.tick() => {}
        }

        let t0 = Instant::now();
        tick().await;
        let elapsed = t0.elapsed();

        if elapsed > period / 2 {
            warn!(
                duration_ms = elapsed.as_millis() as u64,
                interval_ms = period.as_millis() as u64,
                "cycle exceeded 50% of interval"
            );
        }
    }

    debug!(interval_ms = period.as_millis() as u64, "timer stopped");
}
