//! 协作方数据的数据库实现
//!
//! 指标流水线把每个交易对/周期的最新快照写入 `tf_signal`，
//! 合约元数据同步写入 `contract_spec`；引擎侧只读。

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{FromRow, MySql, Pool};

use mtf_engine_domain::traits::{ContractSpecProvider, MarketDataProvider};
use mtf_engine_domain::{ContractSpec, Side, Timeframe, TimeframeSignal};

#[derive(Debug, Clone, FromRow)]
pub struct TfSignalEntity {
    pub candle_ts: i64,
    pub side: Option<String>,
    pub price: f64,
    pub atr: f64,
    pub atr_pct: f64,
    pub volume_ratio: f64,
    pub vwap: f64,
}

impl TfSignalEntity {
    pub fn to_domain(&self) -> TimeframeSignal {
        TimeframeSignal {
            candle_ts: self.candle_ts,
            side: self.side.as_deref().and_then(|s| s.parse::<Side>().ok()),
            price: self.price,
            atr: self.atr,
            atr_pct: self.atr_pct,
            volume_ratio: self.volume_ratio,
            vwap: self.vwap,
        }
    }
}

/// 指标快照提供方 (基于 sqlx，只读)
pub struct SqlxMarketDataProvider {
    pool: Pool<MySql>,
}

impl SqlxMarketDataProvider {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MarketDataProvider for SqlxMarketDataProvider {
    async fn signal(&self, symbol: &str, tf: Timeframe) -> Result<Option<TimeframeSignal>> {
        let entity = sqlx::query_as::<_, TfSignalEntity>(
            "SELECT candle_ts, side, price, atr, atr_pct, volume_ratio, vwap
             FROM tf_signal WHERE symbol = ? AND timeframe = ?
             ORDER BY candle_ts DESC LIMIT 1",
        )
        .bind(symbol)
        .bind(tf.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(|e| e.to_domain()))
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ContractSpecEntity {
    pub symbol: String,
    pub tick_size: f64,
    pub step_size: f64,
    pub min_notional: f64,
    pub max_leverage: u32,
}

/// 合约元数据提供方 (基于 sqlx，只读)
pub struct SqlxContractSpecProvider {
    pool: Pool<MySql>,
}

impl SqlxContractSpecProvider {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContractSpecProvider for SqlxContractSpecProvider {
    async fn spec(&self, symbol: &str) -> Result<Option<ContractSpec>> {
        let entity = sqlx::query_as::<_, ContractSpecEntity>(
            "SELECT symbol, tick_size, step_size, min_notional, max_leverage
             FROM contract_spec WHERE symbol = ? LIMIT 1",
        )
        .bind(symbol)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(|e| ContractSpec {
            symbol: e.symbol,
            tick_size: e.tick_size,
            step_size: e.step_size,
            min_notional: e.min_notional,
            max_leverage: e.max_leverage,
        }))
    }
}
