//! 多周期状态仓储实现 (sqlx)
//!
//! 表 `mtf_state`：每个交易对一行，五个周期的时间戳/方向列。

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, MySql, Pool};

use mtf_engine_domain::traits::StateRepository;
use mtf_engine_domain::{MtfState, Side, Timeframe, TimeframeSlot};

/// 数据库实体
#[derive(Debug, Clone, FromRow)]
pub struct MtfStateEntity {
    pub symbol: String,
    pub ts_4h: Option<i64>,
    pub side_4h: Option<String>,
    pub ts_1h: Option<i64>,
    pub side_1h: Option<String>,
    pub ts_15m: Option<i64>,
    pub side_15m: Option<String>,
    pub ts_5m: Option<i64>,
    pub side_5m: Option<String>,
    pub ts_1m: Option<i64>,
    pub side_1m: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl MtfStateEntity {
    fn slot(ts: Option<i64>, side: &Option<String>) -> TimeframeSlot {
        TimeframeSlot {
            last_candle_ts: ts,
            side: side.as_deref().and_then(|s| s.parse::<Side>().ok()),
        }
    }

    /// 转换为领域实体
    pub fn to_domain(&self) -> MtfState {
        MtfState {
            symbol: self.symbol.clone(),
            slots: [
                Self::slot(self.ts_4h, &self.side_4h),
                Self::slot(self.ts_1h, &self.side_1h),
                Self::slot(self.ts_15m, &self.side_15m),
                Self::slot(self.ts_5m, &self.side_5m),
                Self::slot(self.ts_1m, &self.side_1m),
            ],
            updated_at: self.updated_at,
        }
    }
}

fn side_str(state: &MtfState, tf: Timeframe) -> Option<&'static str> {
    state.slot(tf).side.map(|s| s.as_str())
}

/// 多周期状态仓储 (基于 sqlx)
pub struct SqlxStateRepository {
    pool: Pool<MySql>,
}

impl SqlxStateRepository {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StateRepository for SqlxStateRepository {
    async fn get(&self, symbol: &str) -> Result<Option<MtfState>> {
        let entity = sqlx::query_as::<_, MtfStateEntity>(
            "SELECT symbol, ts_4h, side_4h, ts_1h, side_1h, ts_15m, side_15m,
                    ts_5m, side_5m, ts_1m, side_1m, updated_at
             FROM mtf_state WHERE symbol = ? LIMIT 1",
        )
        .bind(symbol)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(|e| e.to_domain()))
    }

    async fn upsert(&self, state: &MtfState) -> Result<()> {
        sqlx::query(
            "INSERT INTO mtf_state
                (symbol, ts_4h, side_4h, ts_1h, side_1h, ts_15m, side_15m,
                 ts_5m, side_5m, ts_1m, side_1m, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON DUPLICATE KEY UPDATE
                ts_4h = VALUES(ts_4h), side_4h = VALUES(side_4h),
                ts_1h = VALUES(ts_1h), side_1h = VALUES(side_1h),
                ts_15m = VALUES(ts_15m), side_15m = VALUES(side_15m),
                ts_5m = VALUES(ts_5m), side_5m = VALUES(side_5m),
                ts_1m = VALUES(ts_1m), side_1m = VALUES(side_1m),
                updated_at = VALUES(updated_at)",
        )
        .bind(&state.symbol)
        .bind(state.slot(Timeframe::H4).last_candle_ts)
        .bind(side_str(state, Timeframe::H4))
        .bind(state.slot(Timeframe::H1).last_candle_ts)
        .bind(side_str(state, Timeframe::H1))
        .bind(state.slot(Timeframe::M15).last_candle_ts)
        .bind(side_str(state, Timeframe::M15))
        .bind(state.slot(Timeframe::M5).last_candle_ts)
        .bind(side_str(state, Timeframe::M5))
        .bind(state.slot(Timeframe::M1).last_candle_ts)
        .bind(side_str(state, Timeframe::M1))
        .bind(state.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
