//! Bounded history of delete errors

use crate::DeleteError;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

/// Default number of delete errors retained
pub const DEFAULT_MAX_RECENT_ERRORS: usize = 500;

/// Fixed-capacity ring buffer of recent delete errors plus a lifetime total
///
/// Appends come from the single cleanup worker; reads may come from any
/// thread at any time and see a consistent snapshot. When full, the oldest
/// error is evicted. The total is never reset and keeps counting past the
/// capacity.
#[derive(Debug)]
pub struct ErrorHistory {
    recent: RwLock<VecDeque<DeleteError>>,
    capacity: usize,
    total: AtomicU64,
}

impl ErrorHistory {
    /// Create a history retaining at most `capacity` errors (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            recent: RwLock::new(VecDeque::with_capacity(capacity.min(64))),
            capacity,
            total: AtomicU64::new(0),
        }
    }

    /// Append an error, evicting the oldest when full
    pub fn record(&self, error: DeleteError) {
        let mut recent = self.recent.write().unwrap_or_else(PoisonError::into_inner);
        if recent.len() == self.capacity {
            recent.pop_front();
        }
        recent.push_back(error);
        self.total.fetch_add(1, Ordering::SeqCst);
    }

    /// Snapshot of retained errors, oldest first
    pub fn recent(&self) -> Vec<DeleteError> {
        self.recent
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Most recently recorded error
    pub fn latest(&self) -> Option<DeleteError> {
        self.recent
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .back()
            .cloned()
    }

    /// Number of errors recorded since creation
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::SeqCst)
    }

    /// Maximum number of retained errors
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for ErrorHistory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RECENT_ERRORS)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: the total counts every append, whatever the capacity
        #[test]
        fn test_total_counts_every_append(capacity in 0usize..64, appends in 0usize..300) {
            let history = ErrorHistory::new(capacity);
            for i in 0..appends {
                history.record(DeleteError::from_path(format!("/entry-{}", i)));
            }

            prop_assert_eq!(history.total(), appends as u64);
            prop_assert_eq!(history.recent().len(), appends.min(history.capacity()));
        }

        /// Property: the newest appends are the ones retained, in order
        #[test]
        fn test_retains_newest(capacity in 1usize..32, appends in 1usize..100) {
            let history = ErrorHistory::new(capacity);
            for i in 0..appends {
                history.record(DeleteError::from_path(format!("/entry-{}", i)));
            }

            let recent = history.recent();
            let first_kept = appends - recent.len();
            for (offset, error) in recent.iter().enumerate() {
                let expected = format!("/entry-{}", first_kept + offset);
                prop_assert_eq!(error.target(), std::path::Path::new(&expected));
            }
        }
    }
}
