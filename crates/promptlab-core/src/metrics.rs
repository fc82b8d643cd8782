//! Usage counters for promptlab.
//!
//! Counters are incremented silently at the call site. Call
//! [`UsageTracker::flush`] to emit current values as a single
//! `tracing::info!` event (e.g. at the end of a suite run).
//!
//! The tracker is an ordinary value shared through an `Arc`; each service
//! owns or is handed its own.

use std::sync::atomic::{AtomicU64, Ordering};

/// Lightweight atomic counters.
#[derive(Debug, Default)]
pub struct UsageTracker {
    validations_run: AtomicU64,
    validations_failed: AtomicU64,
    analyses_run: AtomicU64,
    ab_runs: AtomicU64,
    feedback_recorded: AtomicU64,
}

impl UsageTracker {
    pub const fn new() -> Self {
        Self {
            validations_run: AtomicU64::new(0),
            validations_failed: AtomicU64::new(0),
            analyses_run: AtomicU64::new(0),
            ab_runs: AtomicU64::new(0),
            feedback_recorded: AtomicU64::new(0),
        }
    }

    pub fn inc_validations(&self) {
        self.validations_run.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "validations_run", "counter incremented");
    }

    pub fn inc_validation_failures(&self) {
        self.validations_failed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "validations_failed", "counter incremented");
    }

    pub fn inc_analyses(&self) {
        self.analyses_run.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "analyses_run", "counter incremented");
    }

    pub fn inc_ab_runs(&self) {
        self.ab_runs.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "ab_runs", "counter incremented");
    }

    pub fn inc_feedback(&self) {
        self.feedback_recorded.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "feedback_recorded", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            validations_run = self.validations_run(),
            validations_failed = self.validations_failed(),
            analyses_run = self.analyses_run(),
            ab_runs = self.ab_runs(),
            feedback_recorded = self.feedback_recorded(),
        );
    }

    pub fn validations_run(&self) -> u64 {
        self.validations_run.load(Ordering::Relaxed)
    }

    pub fn validations_failed(&self) -> u64 {
        self.validations_failed.load(Ordering::Relaxed)
    }

    pub fn analyses_run(&self) -> u64 {
        self.analyses_run.load(Ordering::Relaxed)
    }

    pub fn ab_runs(&self) -> u64 {
        self.ab_runs.load(Ordering::Relaxed)
    }

    pub fn feedback_recorded(&self) -> u64 {
        self.feedback_recorded.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.validations_run.store(0, Ordering::Relaxed);
        self.validations_failed.store(0, Ordering::Relaxed);
        self.analyses_run.store(0, Ordering::Relaxed);
        self.ab_runs.store(0, Ordering::Relaxed);
        self.feedback_recorded.store(0, Ordering::Relaxed);
    }
}
