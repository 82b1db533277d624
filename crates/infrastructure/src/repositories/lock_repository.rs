//! 租约锁仓储实现 (sqlx)
//!
//! 表 `mtf_lock` 以 scope 为唯一键；获取锁走单条带条件的 upsert，
//! 由 MySQL 对唯一键的串行化保证"同一作用域至多一个成功"。

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::{FromRow, MySql, Pool};
use tracing::debug;

use mtf_engine_domain::traits::LockRepository;
use mtf_engine_domain::{AcquireOutcome, MtfLock};

#[derive(Debug, Clone, FromRow)]
pub struct MtfLockEntity {
    pub scope: String,
    pub owner_id: String,
    pub acquired_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl MtfLockEntity {
    pub fn to_domain(&self) -> MtfLock {
        MtfLock {
            scope: self.scope.clone(),
            owner_id: self.owner_id.clone(),
            acquired_at: self.acquired_at,
            expires_at: self.expires_at,
        }
    }
}

/// 租约锁仓储 (基于 sqlx)
pub struct SqlxLockRepository {
    pool: Pool<MySql>,
}

impl SqlxLockRepository {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    async fn fetch(&self, scope: &str) -> Result<Option<MtfLockEntity>> {
        let entity = sqlx::query_as::<_, MtfLockEntity>(
            "SELECT scope, owner_id, acquired_at, expires_at
             FROM mtf_lock WHERE scope = ? LIMIT 1",
        )
        .bind(scope)
        .fetch_optional(&self.pool)
        .await?;
        Ok(entity)
    }
}

#[async_trait]
impl LockRepository for SqlxLockRepository {
    async fn try_acquire(
        &self,
        scope: &str,
        owner_id: &str,
        lease: Duration,
    ) -> Result<AcquireOutcome> {
        let now = Utc::now();
        let expires_at = now + lease;

        // 无行则插入；有行则仅当持有者是自己或租约已过期时接管。
        // owner_id 先赋值，后续两列引用的是赋值后的新值，
        // 因此只有接管成功时才会刷新 acquired_at / expires_at。
        sqlx::query(
            "INSERT INTO mtf_lock (scope, owner_id, acquired_at, expires_at)
             VALUES (?, ?, ?, ?)
             ON DUPLICATE KEY UPDATE
                owner_id = IF(owner_id = VALUES(owner_id)
                              OR (expires_at IS NOT NULL AND expires_at <= VALUES(acquired_at)),
                              VALUES(owner_id), owner_id),
                acquired_at = IF(owner_id = VALUES(owner_id), VALUES(acquired_at), acquired_at),
                expires_at  = IF(owner_id = VALUES(owner_id), VALUES(expires_at), expires_at)",
        )
        .bind(scope)
        .bind(owner_id)
        .bind(now)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        match self.fetch(scope).await? {
            Some(row) if row.owner_id == owner_id => {
                debug!("Lock acquired: scope={}, owner={}", scope, owner_id);
                Ok(AcquireOutcome::Acquired(row.to_domain()))
            }
            Some(row) => Ok(AcquireOutcome::Busy {
                holder: row.owner_id,
            }),
            // 行在 upsert 与查询之间被释放，视为竞争失败
            None => Ok(AcquireOutcome::Busy {
                holder: String::new(),
            }),
        }
    }

    async fn release(&self, scope: &str, owner_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM mtf_lock WHERE scope = ? AND owner_id = ?")
            .bind(scope)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn renew(&self, scope: &str, owner_id: &str, new_expiry: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE mtf_lock SET expires_at = ?
             WHERE scope = ? AND owner_id = ?
               AND (expires_at IS NULL OR expires_at > ?)",
        )
        .bind(new_expiry)
        .bind(scope)
        .bind(owner_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get(&self, scope: &str) -> Result<Option<MtfLock>> {
        Ok(self.fetch(scope).await?.map(|e| e.to_domain()))
    }

    async fn list_active(&self) -> Result<Vec<MtfLock>> {
        let rows = sqlx::query_as::<_, MtfLockEntity>(
            "SELECT scope, owner_id, acquired_at, expires_at
             FROM mtf_lock WHERE expires_at IS NULL OR expires_at > ?",
        )
        .bind(Utc::now())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(|e| e.to_domain()).collect())
    }
}
