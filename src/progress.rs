//! Per-user chapter completion tracking.
//!
//! The tracker is a client-side mirror of the backend's progress
//! collection. It is refreshed wholesale after every update rather than
//! patched locally, so the backend stays the source of truth, and it is
//! invalidated entirely on logout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One (user, chapter) completion record. The backend upserts these, so
/// marking an already-complete chapter again is a no-op success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub user_id: String,
    pub chapter_id: String,
    pub completed: bool,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// The signed-in user's progress records.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    records: Vec<ProgressRecord>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole record set with a fresh fetch from the backend.
    pub fn replace_all(&mut self, records: Vec<ProgressRecord>) {
        self.records = records;
    }

    /// Drop all records (logout).
    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn record(&self, chapter_id: &str) -> Option<&ProgressRecord> {
        self.records.iter().find(|r| r.chapter_id == chapter_id)
    }

    pub fn is_completed(&self, chapter_id: &str) -> bool {
        self.record(chapter_id).is_some_and(|r| r.completed)
    }

    pub fn completed_count(&self) -> usize {
        self.records.iter().filter(|r| r.completed).count()
    }

    /// Completion percentage over `total` chapters, recomputed on every
    /// call. A zero total yields 0.0, not NaN.
    pub fn percent(&self, total: usize) -> f64 {
        if total == 0 {
            return 0.0;
        }
        self.completed_count() as f64 / total as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(chapter_id: &str, completed: bool) -> ProgressRecord {
        ProgressRecord {
            user_id: "u1".into(),
            chapter_id: chapter_id.into(),
            completed,
            updated_at: Some(Utc::now()),
        }
    }

    #[test]
    fn test_zero_total_percent_is_zero() {
        let tracker = ProgressTracker::new();
        assert_eq!(tracker.percent(0), 0.0);
    }

    #[test]
    fn test_percent_derived_from_records() {
        let mut tracker = ProgressTracker::new();
        tracker.replace_all(vec![record("a", true), record("b", false), record("c", true)]);

        assert_eq!(tracker.completed_count(), 2);
        assert_eq!(tracker.percent(4), 50.0);
    }

    #[test]
    fn test_replace_all_is_wholesale() {
        let mut tracker = ProgressTracker::new();
        tracker.replace_all(vec![record("a", true)]);
        tracker.replace_all(vec![record("b", true)]);

        assert!(!tracker.is_completed("a"));
        assert!(tracker.is_completed("b"));
    }

    #[test]
    fn test_clear_on_logout() {
        let mut tracker = ProgressTracker::new();
        tracker.replace_all(vec![record("a", true)]);
        tracker.clear();
        assert_eq!(tracker.completed_count(), 0);
        assert!(tracker.record("a").is_none());
    }

    #[test]
    fn test_incomplete_record_is_not_completed() {
        let mut tracker = ProgressTracker::new();
        tracker.replace_all(vec![record("a", false)]);
        assert!(!tracker.is_completed("a"));
        assert!(tracker.record("a").is_some());
    }
}
