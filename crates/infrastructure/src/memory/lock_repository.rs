//! 内存锁仓储
//!
//! DashMap 的 entry API 保证同一作用域上的并发 try_acquire 串行化，
//! 与 SQL 实现一样满足"至多一个成功"的原子语义。

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use mtf_engine_domain::traits::LockRepository;
use mtf_engine_domain::{AcquireOutcome, MtfLock};

/// 内存锁仓储（测试与 dry-run 场景）
#[derive(Default)]
pub struct InMemoryLockRepository {
    locks: DashMap<String, MtfLock>,
}

impl InMemoryLockRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LockRepository for InMemoryLockRepository {
    async fn try_acquire(
        &self,
        scope: &str,
        owner_id: &str,
        lease: Duration,
    ) -> Result<AcquireOutcome> {
        let now = Utc::now();
        match self.locks.entry(scope.to_string()) {
            Entry::Vacant(slot) => {
                let lock = MtfLock::new(scope, owner_id, lease);
                slot.insert(lock.clone());
                Ok(AcquireOutcome::Acquired(lock))
            }
            Entry::Occupied(mut slot) => {
                let existing = slot.get();
                if existing.is_expired(now) || existing.owner_id == owner_id {
                    // 过期租约可被抢占；同一持有者重入视为重新拿锁
                    let lock = MtfLock::new(scope, owner_id, lease);
                    slot.insert(lock.clone());
                    Ok(AcquireOutcome::Acquired(lock))
                } else {
                    Ok(AcquireOutcome::Busy {
                        holder: existing.owner_id.clone(),
                    })
                }
            }
        }
    }

    async fn release(&self, scope: &str, owner_id: &str) -> Result<bool> {
        let removed = self
            .locks
            .remove_if(scope, |_, lock| lock.owner_id == owner_id);
        Ok(removed.is_some())
    }

    async fn renew(&self, scope: &str, owner_id: &str, new_expiry: DateTime<Utc>) -> Result<bool> {
        match self.locks.get_mut(scope) {
            Some(mut lock) if lock.owner_id == owner_id => {
                lock.expires_at = Some(new_expiry);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn get(&self, scope: &str) -> Result<Option<MtfLock>> {
        Ok(self.locks.get(scope).map(|l| l.clone()))
    }

    async fn list_active(&self) -> Result<Vec<MtfLock>> {
        let now = Utc::now();
        Ok(self
            .locks
            .iter()
            .filter(|e| !e.value().is_expired(now))
            .map(|e| e.value().clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mutual_exclusion() {
        let repo = InMemoryLockRepository::new();
        let a = repo
            .try_acquire("SYMBOL:BTC-USDT", "a", Duration::seconds(60))
            .await
            .unwrap();
        assert!(a.is_acquired());

        let b = repo
            .try_acquire("SYMBOL:BTC-USDT", "b", Duration::seconds(60))
            .await
            .unwrap();
        assert!(matches!(b, AcquireOutcome::Busy { holder } if holder == "a"));
    }

    #[tokio::test]
    async fn test_stale_lease_is_stealable() {
        let repo = InMemoryLockRepository::new();
        repo.try_acquire("RUN:GLOBAL", "dead", Duration::seconds(-1))
            .await
            .unwrap();

        let stolen = repo
            .try_acquire("RUN:GLOBAL", "alive", Duration::seconds(60))
            .await
            .unwrap();
        assert!(stolen.is_acquired());
    }

    #[tokio::test]
    async fn test_release_by_non_owner_is_noop() {
        let repo = InMemoryLockRepository::new();
        repo.try_acquire("RUN:GLOBAL", "a", Duration::seconds(60))
            .await
            .unwrap();

        assert!(!repo.release("RUN:GLOBAL", "b").await.unwrap());
        assert!(repo.get("RUN:GLOBAL").await.unwrap().is_some());

        assert!(repo.release("RUN:GLOBAL", "a").await.unwrap());
        assert!(repo.get("RUN:GLOBAL").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_renew_requires_ownership() {
        let repo = InMemoryLockRepository::new();
        repo.try_acquire("RUN:GLOBAL", "a", Duration::seconds(60))
            .await
            .unwrap();

        let later = Utc::now() + Duration::seconds(300);
        assert!(repo.renew("RUN:GLOBAL", "a", later).await.unwrap());
        assert!(!repo.renew("RUN:GLOBAL", "b", later).await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_acquire_single_winner() {
        use std::sync::Arc;

        let repo = Arc::new(InMemoryLockRepository::new());
        let mut handles = Vec::new();
        for i in 0..16 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                repo.try_acquire("SYMBOL:BTC-USDT", &format!("w{}", i), Duration::seconds(60))
                    .await
                    .unwrap()
                    .is_acquired()
            }));
        }

        let mut winners = 0;
        for h in handles {
            if h.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }
}
