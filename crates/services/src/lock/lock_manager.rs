//! 租约锁管理器 (LockManager)
//!
//! 在 LockRepository 之上封装作用域与租约时长：
//! - 运行级锁 `RUN:GLOBAL`，长租约，整场运行持有
//! - 交易对级锁 `SYMBOL:{symbol}`，短租约，单交易对处理期间持有
//!
//! 锁竞争 (Busy) 是正常信号；只有存储故障才是错误。

use std::sync::Arc;

use anyhow::Result;
use chrono::{Duration, Utc};
use tracing::{info, warn};

use mtf_engine_core::config::environment;
use mtf_engine_domain::traits::LockRepository;
use mtf_engine_domain::{AcquireOutcome, MtfLock};

pub struct LockManager {
    locks: Arc<dyn LockRepository>,
    /// 本进程的持有者标识
    owner_id: String,
}

impl LockManager {
    pub fn new(locks: Arc<dyn LockRepository>, owner_id: &str) -> Self {
        Self {
            locks,
            owner_id: owner_id.to_string(),
        }
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// 获取运行级锁；`force` 时抢占当前持有者（仅限人工恢复场景）
    pub async fn acquire_run_lock(&self, force: bool) -> Result<AcquireOutcome> {
        let scope = MtfLock::run_scope();
        let lease = Duration::seconds(environment::run_lock_lease_secs());

        let outcome = self.locks.try_acquire(&scope, &self.owner_id, lease).await?;
        if outcome.is_acquired() || !force {
            return Ok(outcome);
        }

        // 强制模式：释放当前持有者的租约后重试一次
        if let Some(current) = self.locks.get(&scope).await? {
            warn!(
                "Force-stealing run lock: holder={}, new_owner={}",
                current.owner_id, self.owner_id
            );
            self.locks.release(&scope, &current.owner_id).await?;
        }
        self.locks.try_acquire(&scope, &self.owner_id, lease).await
    }

    pub async fn release_run_lock(&self) -> Result<bool> {
        self.locks.release(&MtfLock::run_scope(), &self.owner_id).await
    }

    /// 运行级锁续租；持有权已丢失返回 false
    pub async fn renew_run_lock(&self) -> Result<bool> {
        let expiry = Utc::now() + Duration::seconds(environment::run_lock_lease_secs());
        self.locks
            .renew(&MtfLock::run_scope(), &self.owner_id, expiry)
            .await
    }

    pub async fn acquire_symbol_lock(&self, symbol: &str) -> Result<AcquireOutcome> {
        let lease = Duration::seconds(environment::symbol_lock_lease_secs());
        let outcome = self
            .locks
            .try_acquire(&MtfLock::symbol_scope(symbol), &self.owner_id, lease)
            .await?;
        if let AcquireOutcome::Busy { holder } = &outcome {
            info!("Symbol lock busy: symbol={}, holder={}", symbol, holder);
        }
        Ok(outcome)
    }

    pub async fn release_symbol_lock(&self, symbol: &str) -> Result<bool> {
        self.locks
            .release(&MtfLock::symbol_scope(symbol), &self.owner_id)
            .await
    }

    pub async fn list_active(&self) -> Result<Vec<MtfLock>> {
        self.locks.list_active().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mtf_engine_infrastructure::InMemoryLockRepository;

    fn manager(repo: Arc<InMemoryLockRepository>, owner: &str) -> LockManager {
        LockManager::new(repo, owner)
    }

    #[tokio::test]
    async fn test_run_lock_mutual_exclusion() {
        let repo = Arc::new(InMemoryLockRepository::new());
        let a = manager(repo.clone(), "worker-a");
        let b = manager(repo, "worker-b");

        assert!(a.acquire_run_lock(false).await.unwrap().is_acquired());
        match b.acquire_run_lock(false).await.unwrap() {
            AcquireOutcome::Busy { holder } => assert_eq!(holder, "worker-a"),
            AcquireOutcome::Acquired(_) => panic!("second owner must not acquire"),
        }

        assert!(a.release_run_lock().await.unwrap());
        assert!(b.acquire_run_lock(false).await.unwrap().is_acquired());
    }

    #[tokio::test]
    async fn test_force_steals_run_lock() {
        let repo = Arc::new(InMemoryLockRepository::new());
        let a = manager(repo.clone(), "worker-a");
        let b = manager(repo, "worker-b");

        assert!(a.acquire_run_lock(false).await.unwrap().is_acquired());
        let stolen = b.acquire_run_lock(true).await.unwrap();
        assert!(stolen.is_acquired());

        // 原持有者的释放此时是无操作
        assert!(!a.release_run_lock().await.unwrap());
    }

    #[tokio::test]
    async fn test_symbol_locks_are_independent() {
        let repo = Arc::new(InMemoryLockRepository::new());
        let a = manager(repo.clone(), "worker-a");
        let b = manager(repo, "worker-b");

        assert!(a.acquire_symbol_lock("BTC-USDT").await.unwrap().is_acquired());
        assert!(b.acquire_symbol_lock("ETH-USDT").await.unwrap().is_acquired());
        assert!(!b.acquire_symbol_lock("BTC-USDT").await.unwrap().is_acquired());
    }
}
