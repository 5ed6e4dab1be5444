//! Single-slot guard keeping reconciliation passes from overlapping
//!
//! Two passes running at once could issue conflicting patches for the same
//! record. The guard holds one permit; a trigger that cannot take it is
//! coalesced instead of queued.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// One-permit guard shared by everything that can start a pass
#[derive(Debug, Clone)]
pub struct PassGuard {
    slot: Arc<Semaphore>,
}

/// Proof that the holder owns the pass slot; released on drop
#[derive(Debug)]
pub struct PassPermit {
    _permit: OwnedSemaphorePermit,
}

impl PassGuard {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Semaphore::new(1)),
        }
    }

    /// Take the slot without waiting, or `None` if a pass is in flight
    pub fn try_begin(&self) -> Option<PassPermit> {
        Arc::clone(&self.slot)
            .try_acquire_owned()
            .ok()
            .map(|permit| PassPermit { _permit: permit })
    }

    /// Whether a pass currently holds the slot
    pub fn is_busy(&self) -> bool {
        self.slot.available_permits() == 0
    }
}

impl Default for PassGuard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_begin_is_refused_until_release() {
        let guard = PassGuard::new();

        let permit = guard.try_begin().expect("slot is free");
        assert!(guard.is_busy());
        assert!(guard.try_begin().is_none());

        drop(permit);
        assert!(!guard.is_busy());
        assert!(guard.try_begin().is_some());
    }

    #[test]
    fn test_clones_share_the_slot() {
        let guard = PassGuard::new();
        let other = guard.clone();

        let _permit = guard.try_begin().expect("slot is free");
        assert!(other.try_begin().is_none());
    }
}
