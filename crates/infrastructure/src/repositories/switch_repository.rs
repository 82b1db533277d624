//! 开关仓储实现 (sqlx)
//!
//! 表 `mtf_switch`，以作用域键为唯一键。

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, MySql, Pool};

use mtf_engine_domain::traits::SwitchRepository;
use mtf_engine_domain::{MtfSwitch, SwitchScope};

#[derive(Debug, Clone, FromRow)]
pub struct MtfSwitchEntity {
    pub scope_key: String,
    pub is_on: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl MtfSwitchEntity {
    pub fn to_domain(&self) -> Result<MtfSwitch> {
        let scope = SwitchScope::from_key(&self.scope_key)
            .map_err(|e| anyhow::anyhow!("Bad switch scope in db: {}", e))?;
        Ok(MtfSwitch {
            scope,
            is_on: self.is_on,
            expires_at: self.expires_at,
            updated_at: self.updated_at,
        })
    }
}

/// 开关仓储 (基于 sqlx)
pub struct SqlxSwitchRepository {
    pool: Pool<MySql>,
}

impl SqlxSwitchRepository {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SwitchRepository for SqlxSwitchRepository {
    async fn get(&self, scope: &SwitchScope) -> Result<Option<MtfSwitch>> {
        let entity = sqlx::query_as::<_, MtfSwitchEntity>(
            "SELECT scope_key, is_on, expires_at, updated_at
             FROM mtf_switch WHERE scope_key = ? LIMIT 1",
        )
        .bind(scope.key())
        .fetch_optional(&self.pool)
        .await?;

        entity.map(|e| e.to_domain()).transpose()
    }

    async fn set(&self, switch: &MtfSwitch) -> Result<()> {
        sqlx::query(
            "INSERT INTO mtf_switch (scope_key, is_on, expires_at, updated_at)
             VALUES (?, ?, ?, ?)
             ON DUPLICATE KEY UPDATE
                is_on = VALUES(is_on),
                expires_at = VALUES(expires_at),
                updated_at = VALUES(updated_at)",
        )
        .bind(switch.scope.key())
        .bind(switch.is_on)
        .bind(switch.expires_at)
        .bind(switch.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn clear(&self, scope: &SwitchScope) -> Result<()> {
        sqlx::query("DELETE FROM mtf_switch WHERE scope_key = ?")
            .bind(scope.key())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<MtfSwitch>> {
        let rows = sqlx::query_as::<_, MtfSwitchEntity>(
            "SELECT scope_key, is_on, expires_at, updated_at FROM mtf_switch",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(|e| e.to_domain()).collect()
    }
}
