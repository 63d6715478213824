//! Periodic housekeeping scheduler for Study With Pride.
//!
//! Session expiry is lazy: an expired session is only deleted when its
//! token is looked up again. Sessions that are simply abandoned stay in
//! memory. A [`SweepScheduler`] fires at a fixed interval so the server
//! can clear them out in the background.
//!
//! # Disabled mode
//!
//! When `interval` is zero, the scheduler is disabled and
//! [`SweepScheduler::wait_for_sweep`] pends forever. That's the default:
//! sweeping is an optimization and nothing depends on it.
//!
//! Intervals and jitter are capped at [`SweepConfig::MAX_INTERVAL`].
//!
//! # Integration
//!
//! ```ignore
//! let mut scheduler = SweepScheduler::new(config);
//! loop {
//!     scheduler.wait_for_sweep().await;
//!     let evicted = sessions.sweep_expired();
//!     scheduler.record_sweep(evicted);
//! }
//! ```

use std::time::Duration;

use rand::Rng;
use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for the sweep scheduler.
#[derive(Debug, Clone, Default)]
pub struct SweepConfig {
    /// Time between sweeps. Zero disables sweeping.
    pub interval: Duration,
    /// Upper bound on random delay added to the *first* sweep, so
    /// instances started together don't sweep in lockstep.
    pub initial_jitter: Duration,
}

impl SweepConfig {
    /// Shortest interval accepted; anything lower is raised to this.
    pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

    /// Longest interval (and initial jitter) accepted; anything higher is
    /// lowered to this.
    pub const MAX_INTERVAL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

    /// Create a config sweeping every `interval`, with up to 1 s of
    /// initial jitter.
    pub fn every(interval: Duration) -> Self {
        Self {
            interval,
            initial_jitter: Duration::from_secs(1),
        }
    }

    /// Returns `true` if this config never sweeps.
    pub fn is_disabled(&self) -> bool {
        self.interval.is_zero()
    }

    /// Clamp out-of-range values so the config is safe to use.
    ///
    /// Called automatically by [`SweepScheduler::new`]. A non-zero
    /// interval below [`Self::MIN_INTERVAL`] is raised to it; an interval
    /// or jitter above [`Self::MAX_INTERVAL`] is lowered to it.
    pub fn validated(mut self) -> Self {
        if !self.interval.is_zero() && self.interval < Self::MIN_INTERVAL {
            warn!(
                interval_ms = self.interval.as_millis() as u64,
                min_ms = Self::MIN_INTERVAL.as_millis() as u64,
                "sweep interval below minimum, clamping"
            );
            self.interval = Self::MIN_INTERVAL;
        }
        if self.interval > Self::MAX_INTERVAL {
            warn!(
                interval_secs = self.interval.as_secs(),
                max_secs = Self::MAX_INTERVAL.as_secs(),
                "sweep interval above maximum, clamping"
            );
            self.interval = Self::MAX_INTERVAL;
        }
        self.initial_jitter = self.initial_jitter.min(Self::MAX_INTERVAL);
        self
    }
}

// ---------------------------------------------------------------------------
// Sweep info and metrics
// ---------------------------------------------------------------------------

/// Returned by [`SweepScheduler::wait_for_sweep`] each time it fires.
#[derive(Debug, Clone)]
pub struct SweepInfo {
    /// Monotonically increasing sweep number (starts at 1).
    pub sweep: u64,
    /// How late the sweep fired relative to its schedule.
    pub late_by: Duration,
}

/// Running totals, updated by [`SweepScheduler::record_sweep`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepMetrics {
    /// Sweeps recorded.
    pub total_sweeps: u64,
    /// Entries evicted across all sweeps.
    pub total_evicted: u64,
    /// Entries evicted by the most recent sweep.
    pub last_evicted: u64,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Fixed-interval sweep scheduler.
///
/// Missed deadlines are never caught up: after a late sweep the next one
/// is scheduled a full interval from now.
pub struct SweepScheduler {
    config: SweepConfig,
    sweep_count: u64,
    /// When the next sweep should fire. `None` when disabled.
    next_sweep: Option<Instant>,
    metrics: SweepMetrics,
}

impl SweepScheduler {
    /// Create a new scheduler from config.
    pub fn new(config: SweepConfig) -> Self {
        let config = config.validated();

        let next_sweep = if config.is_disabled() {
            None
        } else {
            let jitter = if config.initial_jitter.is_zero() {
                Duration::ZERO
            } else {
                let max_ms = config.initial_jitter.as_millis().max(1) as u64;
                Duration::from_millis(rand::rng().random_range(0..max_ms))
            };
            deadline(Instant::now(), config.interval + jitter)
        };

        if config.is_disabled() {
            debug!("sweep scheduler disabled");
        } else {
            debug!(
                interval_secs = config.interval.as_secs_f64(),
                "sweep scheduler created"
            );
        }

        Self {
            config,
            sweep_count: 0,
            next_sweep,
            metrics: SweepMetrics::default(),
        }
    }

    /// Create a scheduler sweeping every `interval`.
    pub fn every(interval: Duration) -> Self {
        Self::new(SweepConfig::every(interval))
    }

    /// Wait until the next sweep is due.
    ///
    /// When disabled this future never resolves, so it is safe to use as
    /// one branch of a `tokio::select!`.
    pub async fn wait_for_sweep(&mut self) -> SweepInfo {
        let Some(next) = self.next_sweep else {
            return std::future::pending().await;
        };

        time::sleep_until(next).await;

        let now = Instant::now();
        self.sweep_count += 1;
        let late_by = now.saturating_duration_since(next);
        self.next_sweep = deadline(now, self.config.interval);

        trace!(sweep = self.sweep_count, "sweep due");

        SweepInfo {
            sweep: self.sweep_count,
            late_by,
        }
    }

    /// Record how many entries the sweep that just ran evicted.
    pub fn record_sweep(&mut self, evicted: usize) {
        let evicted = evicted as u64;
        self.metrics.total_sweeps += 1;
        self.metrics.total_evicted += evicted;
        self.metrics.last_evicted = evicted;
        debug!(sweep = self.sweep_count, evicted, "sweep finished");
    }

    /// Whether sweeping is disabled (interval zero).
    pub fn is_disabled(&self) -> bool {
        self.config.is_disabled()
    }

    /// Sweeps fired so far.
    pub fn sweep_count(&self) -> u64 {
        self.sweep_count
    }

    /// The configured interval.
    pub fn interval(&self) -> Duration {
        self.config.interval
    }

    /// Snapshot of current metrics.
    pub fn metrics(&self) -> &SweepMetrics {
        &self.metrics
    }
}

/// `from + delay`, or `None` (never) if that isn't representable.
fn deadline(from: Instant, delay: Duration) -> Option<Instant> {
    let next = from.checked_add(delay);
    if next.is_none() {
        warn!(delay_secs = delay.as_secs(), "sweep deadline out of range, disabling");
    }
    next
}
