//! 冷却 / 黑名单仓储实现 (sqlx)
//!
//! 表 `contract_cooldown` / `blacklisted_contract`，各以 symbol 为唯一键。

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, MySql, Pool};

use mtf_engine_domain::traits::CooldownRepository;
use mtf_engine_domain::{BlacklistReason, BlacklistedContract, ContractCooldown, CooldownReason};

#[derive(Debug, Clone, FromRow)]
pub struct ContractCooldownEntity {
    pub symbol: String,
    pub reason: String,
    pub active_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContractCooldownEntity {
    pub fn to_domain(&self) -> Result<ContractCooldown> {
        let reason = self
            .reason
            .parse::<CooldownReason>()
            .map_err(|e| anyhow::anyhow!(e))?;
        Ok(ContractCooldown {
            symbol: self.symbol.clone(),
            reason,
            active_until: self.active_until,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct BlacklistedContractEntity {
    pub symbol: String,
    pub reason: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl BlacklistedContractEntity {
    pub fn to_domain(&self) -> Result<BlacklistedContract> {
        let reason = self
            .reason
            .parse::<BlacklistReason>()
            .map_err(|e| anyhow::anyhow!(e))?;
        Ok(BlacklistedContract {
            symbol: self.symbol.clone(),
            reason,
            expires_at: self.expires_at,
            created_at: self.created_at,
        })
    }
}

/// 冷却 / 黑名单仓储 (基于 sqlx)
pub struct SqlxCooldownRepository {
    pool: Pool<MySql>,
}

impl SqlxCooldownRepository {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CooldownRepository for SqlxCooldownRepository {
    async fn find_cooldown(&self, symbol: &str) -> Result<Option<ContractCooldown>> {
        let entity = sqlx::query_as::<_, ContractCooldownEntity>(
            "SELECT symbol, reason, active_until, created_at, updated_at
             FROM contract_cooldown WHERE symbol = ? LIMIT 1",
        )
        .bind(symbol)
        .fetch_optional(&self.pool)
        .await?;

        entity.map(|e| e.to_domain()).transpose()
    }

    async fn upsert_cooldown(&self, cooldown: &ContractCooldown) -> Result<()> {
        // 窗口只向前延长；永久冷却 (NULL) 不被续期覆盖
        sqlx::query(
            "INSERT INTO contract_cooldown (symbol, reason, active_until, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)
             ON DUPLICATE KEY UPDATE
                reason = VALUES(reason),
                active_until = IF(active_until IS NULL, active_until,
                                  GREATEST(active_until, COALESCE(VALUES(active_until), active_until))),
                updated_at = VALUES(updated_at)",
        )
        .bind(&cooldown.symbol)
        .bind(cooldown.reason.as_str())
        .bind(cooldown.active_until)
        .bind(cooldown.created_at)
        .bind(cooldown.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn clear_cooldown(&self, symbol: &str) -> Result<()> {
        sqlx::query("DELETE FROM contract_cooldown WHERE symbol = ?")
            .bind(symbol)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_blacklist(&self, symbol: &str) -> Result<Option<BlacklistedContract>> {
        let entity = sqlx::query_as::<_, BlacklistedContractEntity>(
            "SELECT symbol, reason, expires_at, created_at
             FROM blacklisted_contract WHERE symbol = ? LIMIT 1",
        )
        .bind(symbol)
        .fetch_optional(&self.pool)
        .await?;

        entity.map(|e| e.to_domain()).transpose()
    }

    async fn add_blacklist(&self, entry: &BlacklistedContract) -> Result<()> {
        sqlx::query(
            "INSERT INTO blacklisted_contract (symbol, reason, expires_at, created_at)
             VALUES (?, ?, ?, ?)
             ON DUPLICATE KEY UPDATE
                reason = VALUES(reason),
                expires_at = VALUES(expires_at)",
        )
        .bind(&entry.symbol)
        .bind(entry.reason.as_str())
        .bind(entry.expires_at)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_cooldowns(&self) -> Result<Vec<ContractCooldown>> {
        let rows = sqlx::query_as::<_, ContractCooldownEntity>(
            "SELECT symbol, reason, active_until, created_at, updated_at FROM contract_cooldown",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(|e| e.to_domain()).collect()
    }

    async fn list_blacklist(&self) -> Result<Vec<BlacklistedContract>> {
        let rows = sqlx::query_as::<_, BlacklistedContractEntity>(
            "SELECT symbol, reason, expires_at, created_at FROM blacklisted_contract",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(|e| e.to_domain()).collect()
    }
}
