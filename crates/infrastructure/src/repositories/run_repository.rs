//! 运行仓储实现 (sqlx)
//!
//! 表 `mtf_run` / `mtf_run_symbol` / `mtf_run_metric`；
//! 指标走 QueryBuilder 批量插入。

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, MySql, Pool, QueryBuilder};

use mtf_engine_domain::traits::RunRepository;
use mtf_engine_domain::{
    MtfRun, MtfRunMetric, MtfRunSymbol, RunStatus, Side, SkipReason, SymbolOutcome, Timeframe,
};

#[derive(Debug, Clone, FromRow)]
pub struct MtfRunEntity {
    pub run_id: String,
    pub status: String,
    pub symbols_requested: u32,
    pub symbols_processed: u32,
    pub symbols_successful: u32,
    pub symbols_failed: u32,
    pub symbols_skipped: u32,
    pub success_rate: f64,
    pub dry_run: bool,
    pub force_run: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub execution_time_seconds: Option<f64>,
}

impl MtfRunEntity {
    pub fn to_domain(&self) -> Result<MtfRun> {
        Ok(MtfRun {
            run_id: self.run_id.clone(),
            status: self
                .status
                .parse::<RunStatus>()
                .map_err(|e| anyhow::anyhow!(e))?,
            symbols_requested: self.symbols_requested,
            symbols_processed: self.symbols_processed,
            symbols_successful: self.symbols_successful,
            symbols_failed: self.symbols_failed,
            symbols_skipped: self.symbols_skipped,
            success_rate: self.success_rate,
            dry_run: self.dry_run,
            force_run: self.force_run,
            started_at: self.started_at,
            finished_at: self.finished_at,
            execution_time_seconds: self.execution_time_seconds,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct MtfRunSymbolEntity {
    pub run_id: String,
    pub symbol: String,
    pub outcome: String,
    pub blocking_tf: Option<String>,
    pub execution_tf: Option<String>,
    pub side: Option<String>,
    pub skip_reason: Option<String>,
    pub price: Option<f64>,
    pub atr: Option<f64>,
    pub decision: Option<String>,
    pub error: Option<String>,
    pub context: Option<String>,
    pub duration_ms: i64,
    pub created_at: DateTime<Utc>,
}

impl MtfRunSymbolEntity {
    pub fn to_domain(&self) -> Result<MtfRunSymbol> {
        Ok(MtfRunSymbol {
            run_id: self.run_id.clone(),
            symbol: self.symbol.clone(),
            outcome: self
                .outcome
                .parse::<SymbolOutcome>()
                .map_err(|e| anyhow::anyhow!(e))?,
            blocking_tf: parse_opt::<Timeframe>(&self.blocking_tf),
            execution_tf: parse_opt::<Timeframe>(&self.execution_tf),
            side: parse_opt::<Side>(&self.side),
            skip_reason: parse_opt::<SkipReason>(&self.skip_reason),
            price: self.price,
            atr: self.atr,
            decision: self.decision.clone(),
            error: self.error.clone(),
            context: self
                .context
                .as_deref()
                .map(serde_json::from_str)
                .transpose()?
                .unwrap_or(serde_json::Value::Null),
            duration_ms: self.duration_ms,
            created_at: self.created_at,
        })
    }
}

fn parse_opt<T: std::str::FromStr>(value: &Option<String>) -> Option<T> {
    value.as_deref().and_then(|s| s.parse::<T>().ok())
}

/// 运行仓储 (基于 sqlx)
pub struct SqlxRunRepository {
    pool: Pool<MySql>,
}

impl SqlxRunRepository {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RunRepository for SqlxRunRepository {
    async fn insert_run(&self, run: &MtfRun) -> Result<()> {
        sqlx::query(
            "INSERT INTO mtf_run
                (run_id, status, symbols_requested, symbols_processed, symbols_successful,
                 symbols_failed, symbols_skipped, success_rate, dry_run, force_run,
                 started_at, finished_at, execution_time_seconds)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&run.run_id)
        .bind(run.status.as_str())
        .bind(run.symbols_requested)
        .bind(run.symbols_processed)
        .bind(run.symbols_successful)
        .bind(run.symbols_failed)
        .bind(run.symbols_skipped)
        .bind(run.success_rate)
        .bind(run.dry_run)
        .bind(run.force_run)
        .bind(run.started_at)
        .bind(run.finished_at)
        .bind(run.execution_time_seconds)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_run(&self, run: &MtfRun) -> Result<()> {
        sqlx::query(
            "UPDATE mtf_run SET
                status = ?, symbols_processed = ?, symbols_successful = ?,
                symbols_failed = ?, symbols_skipped = ?, success_rate = ?,
                finished_at = ?, execution_time_seconds = ?
             WHERE run_id = ?",
        )
        .bind(run.status.as_str())
        .bind(run.symbols_processed)
        .bind(run.symbols_successful)
        .bind(run.symbols_failed)
        .bind(run.symbols_skipped)
        .bind(run.success_rate)
        .bind(run.finished_at)
        .bind(run.execution_time_seconds)
        .bind(&run.run_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_run(&self, run_id: &str) -> Result<Option<MtfRun>> {
        let entity = sqlx::query_as::<_, MtfRunEntity>(
            "SELECT run_id, status, symbols_requested, symbols_processed, symbols_successful,
                    symbols_failed, symbols_skipped, success_rate, dry_run, force_run,
                    started_at, finished_at, execution_time_seconds
             FROM mtf_run WHERE run_id = ? LIMIT 1",
        )
        .bind(run_id)
        .fetch_optional(&self.pool)
        .await?;

        entity.map(|e| e.to_domain()).transpose()
    }

    async fn insert_run_symbol(&self, row: &MtfRunSymbol) -> Result<()> {
        sqlx::query(
            "INSERT INTO mtf_run_symbol
                (run_id, symbol, outcome, blocking_tf, execution_tf, side, skip_reason,
                 price, atr, decision, error, context, duration_ms, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&row.run_id)
        .bind(&row.symbol)
        .bind(row.outcome.as_str())
        .bind(row.blocking_tf.map(|tf| tf.as_str()))
        .bind(row.execution_tf.map(|tf| tf.as_str()))
        .bind(row.side.map(|s| s.as_str()))
        .bind(row.skip_reason.map(|r| r.as_str()))
        .bind(row.price)
        .bind(row.atr)
        .bind(&row.decision)
        .bind(&row.error)
        .bind(serde_json::to_string(&row.context)?)
        .bind(row.duration_ms)
        .bind(row.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_run_symbols(&self, run_id: &str) -> Result<Vec<MtfRunSymbol>> {
        let rows = sqlx::query_as::<_, MtfRunSymbolEntity>(
            "SELECT run_id, symbol, outcome, blocking_tf, execution_tf, side, skip_reason,
                    price, atr, decision, error, context, duration_ms, created_at
             FROM mtf_run_symbol WHERE run_id = ? ORDER BY created_at",
        )
        .bind(run_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(|e| e.to_domain()).collect()
    }

    async fn insert_metrics(&self, metrics: &[MtfRunMetric]) -> Result<u64> {
        if metrics.is_empty() {
            return Ok(0);
        }

        let mut builder: QueryBuilder<MySql> = QueryBuilder::new(
            "INSERT INTO mtf_run_metric (run_id, category, operation, symbol, timeframe, count, duration_ms) ",
        );
        builder.push_values(metrics.iter(), |mut b, m| {
            b.push_bind(&m.run_id)
                .push_bind(&m.category)
                .push_bind(&m.operation)
                .push_bind(&m.symbol)
                .push_bind(m.timeframe.map(|tf| tf.as_str()))
                .push_bind(m.count)
                .push_bind(m.duration_ms);
        });

        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
