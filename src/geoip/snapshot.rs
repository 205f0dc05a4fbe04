//! In-memory range snapshots.
//!
//! A `RangeSnapshot` is an immutable, sorted copy of the range table. The
//! server holds the current one in a `SnapshotHandle`; reloading builds a new
//! snapshot and swaps the `Arc`, so a lookup in flight keeps reading the
//! snapshot it started with.

use std::future::{ready, Future};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use super::resolve::RangeSource;
use super::types::{AddressKey, RangeRecord};
use crate::error_handling::SourceError;

/// Where a snapshot came from and when it was built
#[derive(Debug, Clone)]
pub struct SnapshotMetadata {
    /// Source path or description
    pub source: String,
    /// Build timestamp
    pub loaded_at: SystemTime,
}

/// Immutable range table sorted by `ip_from`.
#[derive(Debug)]
pub struct RangeSnapshot {
    records: Vec<RangeRecord>,
    /// `reach[i]` is the largest `ip_to` among `records[..=i]`
    reach: Vec<AddressKey>,
    metadata: SnapshotMetadata,
}

impl RangeSnapshot {
    /// Builds a snapshot from records in any order.
    ///
    /// The sort is stable, so records sharing an `ip_from` keep their input
    /// order (which the tie-break relies on).
    pub fn new(mut records: Vec<RangeRecord>, source: impl Into<String>) -> Self {
        records.sort_by_key(|r| r.ip_from);

        let mut reach = Vec::with_capacity(records.len());
        let mut furthest = AddressKey::MIN;
        for record in &records {
            furthest = furthest.max(record.ip_to);
            reach.push(furthest);
        }

        RangeSnapshot {
            records,
            reach,
            metadata: SnapshotMetadata {
                source: source.into(),
                loaded_at: SystemTime::now(),
            },
        }
    }

    /// Snapshot with no ranges; every lookup misses.
    pub fn empty() -> Self {
        Self::new(Vec::new(), "empty")
    }

    /// Number of ranges
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the snapshot holds no ranges
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Where and when the snapshot was built
    pub fn metadata(&self) -> &SnapshotMetadata {
        &self.metadata
    }

    /// Ranges sorted by `ip_from`, ties in load order
    pub fn records(&self) -> &[RangeRecord] {
        &self.records
    }

    /// Every record containing `key`, in ascending `ip_from` order.
    ///
    /// Binary search finds the last range starting at or before `key`; the
    /// backward scan stops as soon as no earlier range reaches `key`. With
    /// non-overlapping data that is a single step.
    pub fn covering(&self, key: AddressKey) -> Vec<RangeRecord> {
        let end = self.records.partition_point(|r| r.ip_from <= key);

        let mut found = Vec::new();
        for idx in (0..end).rev() {
            if self.reach[idx] < key {
                break;
            }
            if self.records[idx].ip_to >= key {
                found.push(self.records[idx].clone());
            }
        }
        found.reverse();
        found
    }

    /// Number of ranges that start inside an earlier range.
    pub fn overlap_count(&self) -> usize {
        self.records
            .iter()
            .skip(1)
            .zip(&self.reach)
            .filter(|(record, previous_reach)| record.ip_from <= **previous_reach)
            .count()
    }
}

impl RangeSource for RangeSnapshot {
    fn candidates(
        &self,
        key: AddressKey,
    ) -> impl Future<Output = Result<Vec<RangeRecord>, SourceError>> + Send {
        ready(Ok(self.covering(key)))
    }
}

/// Owner of the snapshot currently being served.
pub struct SnapshotHandle {
    current: RwLock<Arc<RangeSnapshot>>,
}

impl SnapshotHandle {
    /// Handle serving `snapshot` until the first `replace`.
    pub fn new(snapshot: RangeSnapshot) -> Self {
        SnapshotHandle {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// The snapshot lookups should use right now.
    pub fn current(&self) -> Result<Arc<RangeSnapshot>, SourceError> {
        self.current
            .read()
            .map(|guard| Arc::clone(&guard))
            .map_err(|_| SourceError::SnapshotPoisoned)
    }

    /// Installs `snapshot` and returns the one it replaced.
    ///
    /// Swapping an `Arc` cannot leave the slot half-written, so a poisoned
    /// lock is recovered here and cleared.
    pub fn replace(&self, snapshot: RangeSnapshot) -> Arc<RangeSnapshot> {
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let previous = std::mem::replace(&mut *guard, Arc::new(snapshot));
        drop(guard);
        self.current.clear_poison();
        previous
    }

    /// Number of ranges in the current snapshot, or `None` if the lock is poisoned.
    pub fn row_count(&self) -> Option<usize> {
        self.current().ok().map(|snapshot| snapshot.len())
    }
}

impl RangeSource for SnapshotHandle {
    fn candidates(
        &self,
        key: AddressKey,
    ) -> impl Future<Output = Result<Vec<RangeRecord>, SourceError>> + Send {
        ready(self.current().map(|snapshot| snapshot.covering(key)))
    }
}
