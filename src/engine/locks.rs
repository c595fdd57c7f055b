//! Per-match serialization of mutating calls.

use crate::domain::MatchId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Registry of one async mutex per match.
///
/// Writers to the same match queue behind each other; different matches
/// proceed in parallel.
#[derive(Debug, Default)]
pub struct MatchLocks {
    slots: Mutex<HashMap<MatchId, Arc<AsyncMutex<()>>>>,
}

impl MatchLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `match_id`.
    pub async fn acquire(&self, match_id: MatchId) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.entry(match_id).or_default().clone()
        };
        slot.lock_owned().await
    }

    /// Drop the slot of a match that will not be written again.
    ///
    /// A holder that still has the guard keeps its mutex alive; a later
    /// `acquire` simply allocates a fresh slot.
    pub fn forget(&self, match_id: MatchId) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.remove(&match_id);
    }

    pub fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_match_is_serialized() {
        let locks = Arc::new(MatchLocks::new());
        let id = MatchId::new();

        let guard = locks.acquire(id).await;
        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(id).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());
        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn test_different_matches_do_not_block() {
        let locks = MatchLocks::new();
        let _a = locks.acquire(MatchId::new()).await;
        let b = tokio::time::timeout(Duration::from_millis(50), locks.acquire(MatchId::new())).await;
        assert!(b.is_ok());
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn test_forget_removes_slot() {
        let locks = MatchLocks::new();
        let id = MatchId::new();
        drop(locks.acquire(id).await);
        locks.forget(id);
        assert!(locks.is_empty());
    }
}
