//! Atomically replaceable fitted state.
//!
//! Engines keep their fitted model in a [`Snapshot`]. Readers take a cheap `Arc`
//! clone under a read lock and score without holding any lock; `fit` builds the
//! replacement completely before taking the write lock, so a failed fit never
//! disturbs the current model and an in-flight query keeps the model it started on.

use crate::Error;
use parking_lot::RwLock;
use std::sync::Arc;

/// Slot holding the currently fitted model, if any.
#[derive(Debug)]
pub struct Snapshot<T> {
    current: RwLock<Option<Arc<T>>>,
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Snapshot<T> {
    /// Create an empty (unfitted) slot.
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
        }
    }

    /// Current model, or [`Error::NotFitted`].
    pub fn load(&self) -> Result<Arc<T>, Error> {
        self.current.read().clone().ok_or(Error::NotFitted)
    }

    /// Whether a model has been committed.
    pub fn is_fitted(&self) -> bool {
        self.current.read().is_some()
    }

    /// Replace the current model, returning the previous one.
    pub fn store(&self, model: T) -> Option<Arc<T>> {
        let next = Arc::new(model);
        self.current.write().replace(next)
    }
}
