//! 入场区间仓储实现 (sqlx)
//!
//! 表 `entry_zone_live`：只插入新行，同 symbol+side 的旧行改标 SUPERSEDED。

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, MySql, Pool};

use mtf_engine_domain::traits::EntryZoneRepository;
use mtf_engine_domain::{EntryZoneLive, Side, ZoneStatus};

#[derive(Debug, Clone, FromRow)]
pub struct EntryZoneEntity {
    pub symbol: String,
    pub side: String,
    pub min_price: f64,
    pub max_price: f64,
    pub atr_pct: f64,
    pub volume_ratio: f64,
    pub vwap: f64,
    pub config_profile: String,
    pub config_version: u32,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl EntryZoneEntity {
    pub fn to_domain(&self) -> Result<EntryZoneLive> {
        Ok(EntryZoneLive {
            symbol: self.symbol.clone(),
            side: self.side.parse::<Side>().map_err(|e| anyhow::anyhow!(e))?,
            min_price: self.min_price,
            max_price: self.max_price,
            atr_pct: self.atr_pct,
            volume_ratio: self.volume_ratio,
            vwap: self.vwap,
            config_profile: self.config_profile.clone(),
            config_version: self.config_version,
            valid_from: self.valid_from,
            valid_until: self.valid_until,
            status: self
                .status
                .parse::<ZoneStatus>()
                .map_err(|e| anyhow::anyhow!(e))?,
            created_at: self.created_at,
        })
    }
}

/// 入场区间仓储 (基于 sqlx)
pub struct SqlxEntryZoneRepository {
    pool: Pool<MySql>,
}

impl SqlxEntryZoneRepository {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntryZoneRepository for SqlxEntryZoneRepository {
    async fn insert_superseding(&self, zone: &EntryZoneLive) -> Result<()> {
        // 先取代旧行再插入新行；两步都幂等，乱序重放最坏是多一次空更新
        sqlx::query(
            "UPDATE entry_zone_live SET status = ?
             WHERE symbol = ? AND side = ? AND status != ?",
        )
        .bind(ZoneStatus::Superseded.as_str())
        .bind(&zone.symbol)
        .bind(zone.side.as_str())
        .bind(ZoneStatus::Superseded.as_str())
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "INSERT INTO entry_zone_live
                (symbol, side, min_price, max_price, atr_pct, volume_ratio, vwap,
                 config_profile, config_version, valid_from, valid_until, status, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&zone.symbol)
        .bind(zone.side.as_str())
        .bind(zone.min_price)
        .bind(zone.max_price)
        .bind(zone.atr_pct)
        .bind(zone.volume_ratio)
        .bind(zone.vwap)
        .bind(&zone.config_profile)
        .bind(zone.config_version)
        .bind(zone.valid_from)
        .bind(zone.valid_until)
        .bind(zone.status.as_str())
        .bind(zone.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn latest(&self, symbol: &str, side: Side) -> Result<Option<EntryZoneLive>> {
        let entity = sqlx::query_as::<_, EntryZoneEntity>(
            "SELECT symbol, side, min_price, max_price, atr_pct, volume_ratio, vwap,
                    config_profile, config_version, valid_from, valid_until, status, created_at
             FROM entry_zone_live
             WHERE symbol = ? AND side = ? AND status != ?
             ORDER BY created_at DESC LIMIT 1",
        )
        .bind(symbol)
        .bind(side.as_str())
        .bind(ZoneStatus::Superseded.as_str())
        .fetch_optional(&self.pool)
        .await?;

        entity.map(|e| e.to_domain()).transpose()
    }
}
