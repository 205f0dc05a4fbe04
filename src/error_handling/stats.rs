//! Lookup statistics tracking.
//!
//! This module provides thread-safe counters for lookup outcomes, shared by
//! all request handlers and read by the status and metrics endpoints.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::LookupOutcome;

/// Thread-safe lookup statistics tracker.
///
/// Every `LookupOutcome` is initialized to zero on creation, so the map is
/// never mutated afterwards and can be shared through `Arc` without locking.
pub struct LookupStats {
    outcomes: HashMap<LookupOutcome, AtomicUsize>,
}

impl LookupStats {
    /// Counters for every outcome, all at zero
    pub fn new() -> Self {
        let mut outcomes = HashMap::new();
        for outcome in LookupOutcome::iter() {
            outcomes.insert(outcome, AtomicUsize::new(0));
        }
        LookupStats { outcomes }
    }

    /// Increment an outcome counter.
    pub fn record(&self, outcome: LookupOutcome) {
        if let Some(counter) = self.outcomes.get(&outcome) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment counter for {:?} which is not in the map. \
                 This indicates a bug in LookupStats initialization.",
                outcome
            );
        }
    }

    /// Get the count for an outcome.
    pub fn get(&self, outcome: LookupOutcome) -> usize {
        self.outcomes
            .get(&outcome)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Total number of lookups handled, whatever the outcome.
    pub fn total(&self) -> usize {
        self.outcomes.values().map(|c| c.load(Ordering::SeqCst)).sum()
    }

    /// Number of lookups answered with an error status.
    pub fn total_errors(&self) -> usize {
        LookupOutcome::iter()
            .filter(LookupOutcome::is_error)
            .map(|o| self.get(o))
            .sum()
    }
}

impl Default for LookupStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_stats_initialized_to_zero() {
        let stats = LookupStats::new();
        for outcome in LookupOutcome::iter() {
            assert_eq!(stats.get(outcome), 0);
        }
        assert_eq!(stats.total(), 0);
        assert_eq!(stats.total_errors(), 0);
    }

    #[test]
    fn test_record_and_totals() {
        let stats = LookupStats::new();
        stats.record(LookupOutcome::Found);
        stats.record(LookupOutcome::Found);
        stats.record(LookupOutcome::NotFound);
        stats.record(LookupOutcome::InvalidAddress);
        stats.record(LookupOutcome::ResolutionFailed);

        assert_eq!(stats.get(LookupOutcome::Found), 2);
        assert_eq!(stats.get(LookupOutcome::NotFound), 1);
        assert_eq!(stats.total(), 5);
        assert_eq!(stats.total_errors(), 2);
    }

    #[test]
    fn test_concurrent_recording() {
        let stats = Arc::new(LookupStats::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let stats = Arc::clone(&stats);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        stats.record(LookupOutcome::Found);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("recording thread panicked");
        }
        assert_eq!(stats.get(LookupOutcome::Found), 8000);
    }
}
