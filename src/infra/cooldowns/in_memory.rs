// In-memory CooldownStore. Timestamps live for the lifetime of the process.

use crate::core::dispatch::{CooldownCheck, CooldownError, CooldownStore};
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

#[derive(Hash, Eq, PartialEq, Clone, Debug)]
struct CooldownKey {
    actor_id: u64,
    command: String,
}

/// DashMap-backed store, so checks for different actors never block each other.
pub struct InMemoryCooldownStore {
    entries: DashMap<CooldownKey, i64>,
}

impl InMemoryCooldownStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl Default for InMemoryCooldownStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CooldownStore for InMemoryCooldownStore {
    async fn last_invocation(
        &self,
        actor_id: u64,
        command: &str,
    ) -> Result<Option<i64>, CooldownError> {
        let key = CooldownKey {
            actor_id,
            command: command.to_string(),
        };
        Ok(self.entries.get(&key).map(|at| *at))
    }

    async fn try_acquire(
        &self,
        actor_id: u64,
        command: &str,
        cooldown_millis: u64,
        now_millis: i64,
    ) -> Result<CooldownCheck, CooldownError> {
        let key = CooldownKey {
            actor_id,
            command: command.to_string(),
        };
        // The entry guard holds the shard lock until the decision is written.
        let check = match self.entries.entry(key) {
            Entry::Occupied(mut slot) => {
                let check =
                    CooldownCheck::evaluate(Some(*slot.get()), cooldown_millis, now_millis);
                if check.allowed {
                    slot.insert(now_millis);
                }
                check
            }
            Entry::Vacant(slot) => {
                slot.insert(now_millis);
                CooldownCheck::allowed()
            }
        };
        Ok(check)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dispatch::CooldownTracker;

    #[tokio::test]
    async fn test_in_memory_store() {
        let store = InMemoryCooldownStore::new();

        assert_eq!(store.last_invocation(1, "kick").await.unwrap(), None);

        assert!(store.try_acquire(1, "kick", 5_000, 1_000).await.unwrap().allowed);
        assert_eq!(store.last_invocation(1, "kick").await.unwrap(), Some(1_000));

        // Other actors and commands are independent
        assert_eq!(store.last_invocation(2, "kick").await.unwrap(), None);
        assert_eq!(store.last_invocation(1, "purge").await.unwrap(), None);

        // A rejection leaves the stored timestamp alone
        let blocked = store.try_acquire(1, "kick", 5_000, 3_000).await.unwrap();
        assert!(!blocked.allowed);
        assert_eq!(blocked.remaining_millis, 3_000);
        assert_eq!(store.last_invocation(1, "kick").await.unwrap(), Some(1_000));

        assert!(store.try_acquire(1, "kick", 5_000, 9_000).await.unwrap().allowed);
        assert_eq!(store.last_invocation(1, "kick").await.unwrap(), Some(9_000));
    }

    #[tokio::test]
    async fn test_concurrent_acquire_allows_one() {
        let tracker = CooldownTracker::new(InMemoryCooldownStore::new());

        let (a, b, c) = tokio::join!(
            tracker.check(1, "kick", 5_000, 1_000),
            tracker.check(1, "kick", 5_000, 1_000),
            tracker.check(1, "kick", 5_000, 1_000)
        );
        let allowed = [a.unwrap(), b.unwrap(), c.unwrap()]
            .iter()
            .filter(|check| check.allowed)
            .count();
        assert_eq!(allowed, 1);
    }

    #[tokio::test]
    async fn test_tracker_over_memory_store() {
        let tracker = CooldownTracker::new(InMemoryCooldownStore::new());

        assert!(tracker.check(1, "kick", 5_000, 0).await.unwrap().allowed);

        let blocked = tracker.check(1, "kick", 5_000, 4_999).await.unwrap();
        assert!(!blocked.allowed);
        assert_eq!(blocked.remaining_millis, 1);

        assert!(tracker.check(1, "kick", 5_000, 5_000).await.unwrap().allowed);
    }
}
