//! # Undo/Redo History
//!
//! Snapshot-based, linear history over any document value.
//!
//! ```text
//! past: [v0, v1]   present: v2   future: [v3]
//!        undo ──►  past: [v0]  present: v1  future: [v2, v3]
//!        set(x) ►  past: [v0, v1, v2]  present: x  future: []
//! ```
//!
//! Snapshots are held behind [`Arc`] so unchanged values are shared rather
//! than copied, and a `set` with the very same snapshot is recognised by
//! pointer identity and ignored.

use std::collections::VecDeque;
use std::sync::Arc;

/// Linear undo/redo container.
///
/// All operations are total: undo with an empty past or redo with an empty
/// future simply report `false`.
#[derive(Debug, Clone)]
pub struct History<T> {
    past: VecDeque<Arc<T>>,
    present: Arc<T>,
    future: VecDeque<Arc<T>>,
    /// Maximum `past` length; oldest entries are dropped first.
    limit: Option<usize>,
}

impl<T: Default> Default for History<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> History<T> {
    /// Start a history with no past or future.
    #[must_use]
    pub fn new(present: T) -> Self {
        Self {
            past: VecDeque::new(),
            present: Arc::new(present),
            future: VecDeque::new(),
            limit: None,
        }
    }

    /// Cap the number of undo steps kept.
    #[must_use]
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self.enforce_limit();
        self
    }

    /// The current value.
    #[must_use]
    pub fn present(&self) -> &T {
        &self.present
    }

    /// The current snapshot, shareable without copying.
    #[must_use]
    pub fn snapshot(&self) -> Arc<T> {
        Arc::clone(&self.present)
    }

    /// Install a new value.
    ///
    /// A snapshot pointer-equal to the present is a no-op. Otherwise the
    /// present moves onto the past and the future is discarded. Returns
    /// whether a history entry was pushed.
    pub fn set(&mut self, next: impl Into<Arc<T>>) -> bool {
        let next = next.into();
        if Arc::ptr_eq(&next, &self.present) {
            return false;
        }
        let previous = std::mem::replace(&mut self.present, next);
        self.past.push_back(previous);
        self.future.clear();
        self.enforce_limit();
        true
    }

    /// Derive the next value from the present.
    ///
    /// The updater returns `None` to signal "unchanged", which pushes nothing.
    pub fn update<F>(&mut self, f: F) -> bool
    where
        F: FnOnce(&T) -> Option<T>,
    {
        match f(&self.present) {
            Some(next) => self.set(next),
            None => false,
        }
    }

    /// Step back one entry. Returns `false` if there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.past.pop_back() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, previous);
        self.future.push_front(current);
        tracing::debug!(
            past = self.past.len(),
            future = self.future.len(),
            "History undo"
        );
        true
    }

    /// Step forward one entry. Returns `false` if there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.future.pop_front() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, next);
        self.past.push_back(current);
        tracing::debug!(
            past = self.past.len(),
            future = self.future.len(),
            "History redo"
        );
        true
    }

    /// Whether [`History::undo`] would do anything.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    /// Whether [`History::redo`] would do anything.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Number of undo steps available.
    #[must_use]
    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    /// Number of redo steps available.
    #[must_use]
    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    /// Replace the base value and forget all history.
    ///
    /// Used when a different document is opened; undo must never cross it.
    pub fn reset(&mut self, present: impl Into<Arc<T>>) {
        self.past.clear();
        self.future.clear();
        self.present = present.into();
    }

    fn enforce_limit(&mut self) {
        if let Some(limit) = self.limit {
            while self.past.len() > limit {
                self.past.pop_front();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_undo_redo() {
        let mut history = History::new(0);
        assert!(!history.can_undo());
        history.set(1);
        history.set(2);
        assert_eq!(*history.present(), 2);

        assert!(history.undo());
        assert_eq!(*history.present(), 1);
        assert!(history.can_redo());

        assert!(history.redo());
        assert_eq!(*history.present(), 2);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_redo_on_empty_are_noops() {
        let mut history = History::new("base");
        assert!(!history.undo());
        assert!(!history.redo());
        assert_eq!(*history.present(), "base");
    }

    #[test]
    fn test_same_snapshot_is_ignored() {
        let mut history = History::new(vec![1, 2, 3]);
        let same = history.snapshot();
        assert!(!history.set(same));
        assert_eq!(history.past_len(), 0);
        assert_eq!(history.future_len(), 0);
    }

    #[test]
    fn test_update_none_pushes_nothing() {
        let mut history = History::new(5);
        assert!(!history.update(|_| None));
        assert!(history.update(|v| Some(v + 1)));
        assert_eq!(*history.present(), 6);
        assert_eq!(history.past_len(), 1);
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut history = History::new(0);
        history.set(1);
        history.set(2);
        history.undo();
        history.set(10);
        assert!(!history.can_redo());
        assert_eq!(history.future_len(), 0);
        history.undo();
        assert_eq!(*history.present(), 1);
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut history = History::new(0).with_limit(Some(2));
        for v in 1..=5 {
            history.set(v);
        }
        assert_eq!(history.past_len(), 2);
        history.undo();
        history.undo();
        assert!(!history.undo());
        assert_eq!(*history.present(), 3);
    }

    #[test]
    fn test_reset_forgets_history() {
        let mut history = History::new(0);
        history.set(1);
        history.undo();
        history.reset(99);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(*history.present(), 99);
    }
}
