//! Integration tests for the sweep scheduler.
//!
//! Uses paused Tokio time so `sleep_until` resolves as soon as nothing
//! else is runnable.

use std::time::Duration;

use pride_sweep::{SweepConfig, SweepMetrics, SweepScheduler};

// =========================================================================
// Helpers
// =========================================================================

fn every_minute() -> SweepConfig {
    SweepConfig {
        interval: Duration::from_secs(60),
        initial_jitter: Duration::ZERO,
    }
}

// =========================================================================
// SweepConfig
// =========================================================================

#[test]
fn test_default_config_is_disabled() {
    let cfg = SweepConfig::default();
    assert!(cfg.is_disabled());
    assert_eq!(cfg.interval, Duration::ZERO);
}

#[test]
fn test_validated_raises_tiny_interval() {
    let cfg = SweepConfig {
        interval: Duration::from_millis(10),
        initial_jitter: Duration::ZERO,
    }
    .validated();

    assert_eq!(cfg.interval, SweepConfig::MIN_INTERVAL);
}

#[test]
fn test_validated_lowers_huge_interval_and_jitter() {
    let cfg = SweepConfig {
        interval: Duration::from_secs(u64::MAX),
        initial_jitter: Duration::MAX,
    }
    .validated();

    assert_eq!(cfg.interval, SweepConfig::MAX_INTERVAL);
    assert_eq!(cfg.initial_jitter, SweepConfig::MAX_INTERVAL);
}

#[tokio::test(start_paused = true)]
async fn test_huge_interval_schedules_at_max_interval() {
    let mut s = SweepScheduler::new(SweepConfig::every(Duration::from_secs(u64::MAX)));
    assert!(!s.is_disabled());
    assert_eq!(s.interval(), SweepConfig::MAX_INTERVAL);

    let start = tokio::time::Instant::now();
    let info = s.wait_for_sweep().await;

    assert_eq!(info.sweep, 1);
    assert!(start.elapsed() >= SweepConfig::MAX_INTERVAL);
}

#[test]
fn test_validated_keeps_zero_interval_disabled() {
    assert!(SweepConfig::default().validated().is_disabled());
}

// =========================================================================
// Firing
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_wait_for_sweep_fires_after_interval() {
    let mut s = SweepScheduler::new(every_minute());
    let start = tokio::time::Instant::now();

    let info = s.wait_for_sweep().await;

    assert_eq!(info.sweep, 1);
    assert_eq!(s.sweep_count(), 1);
    assert!(start.elapsed() >= Duration::from_secs(60));
}

#[tokio::test(start_paused = true)]
async fn test_sweeps_increment_monotonically() {
    let mut s = SweepScheduler::new(every_minute());

    for expected in 1..=4 {
        let info = s.wait_for_sweep().await;
        assert_eq!(info.sweep, expected);
    }
}

#[tokio::test(start_paused = true)]
async fn test_jitter_delays_first_sweep_only_within_bound() {
    let mut s = SweepScheduler::new(SweepConfig {
        interval: Duration::from_secs(60),
        initial_jitter: Duration::from_secs(5),
    });
    let start = tokio::time::Instant::now();

    s.wait_for_sweep().await;

    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(60));
    assert!(elapsed < Duration::from_secs(65));
}

#[tokio::test(start_paused = true)]
async fn test_disabled_never_fires() {
    let mut s = SweepScheduler::new(SweepConfig::default());
    assert!(s.is_disabled());

    let result = tokio::time::timeout(Duration::from_secs(3600), s.wait_for_sweep()).await;

    assert!(result.is_err(), "disabled scheduler should pend forever");
}

// =========================================================================
// Metrics
// =========================================================================

#[test]
fn test_initial_metrics_are_zero() {
    let s = SweepScheduler::new(SweepConfig::default());
    assert_eq!(s.metrics(), &SweepMetrics::default());
}

#[tokio::test(start_paused = true)]
async fn test_record_sweep_accumulates() {
    let mut s = SweepScheduler::new(every_minute());

    for evicted in [3, 0, 5] {
        s.wait_for_sweep().await;
        s.record_sweep(evicted);
    }

    let m = s.metrics();
    assert_eq!(m.total_sweeps, 3);
    assert_eq!(m.total_evicted, 8);
    assert_eq!(m.last_evicted, 5);
}

// =========================================================================
// select! loop pattern (mirrors the server's sweeper task)
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_select_loop_pattern() {
    let mut s = SweepScheduler::new(every_minute());
    let (tx, mut rx) = tokio::sync::mpsc::channel::<()>(1);

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(185)).await;
        tx.send(()).await.ok();
    });

    let mut fired = 0u64;
    loop {
        tokio::select! {
            Some(()) = rx.recv() => break,
            info = s.wait_for_sweep() => {
                fired += 1;
                s.record_sweep(0);
                assert_eq!(info.sweep, fired);
            }
        }
    }

    assert_eq!(fired, 3, "sweeps at 60s, 120s and 180s");
}
