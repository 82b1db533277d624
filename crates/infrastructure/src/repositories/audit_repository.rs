//! 审计仓储实现 (sqlx)
//!
//! 三张只追加表：`mtf_audit` / `trade_zone_event` / `trade_lifecycle_event`，
//! 全部走 QueryBuilder 批量插入。

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{MySql, Pool, QueryBuilder};

use mtf_engine_domain::traits::AuditRepository;
use mtf_engine_domain::{MtfAudit, TradeLifecycleEvent, TradeZoneEvent};

/// 审计仓储 (基于 sqlx)
pub struct SqlxAuditRepository {
    pool: Pool<MySql>,
}

impl SqlxAuditRepository {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditRepository for SqlxAuditRepository {
    async fn insert_audits(&self, rows: &[MtfAudit]) -> Result<u64> {
        if rows.is_empty() {
            return Ok(0);
        }

        let mut builder: QueryBuilder<MySql> = QueryBuilder::new(
            "INSERT INTO mtf_audit (symbol, run_id, timeframe, category, severity, event, details, created_at) ",
        );
        let mut payloads = Vec::with_capacity(rows.len());
        for row in rows {
            payloads.push(serde_json::to_string(&row.details)?);
        }
        builder.push_values(rows.iter().zip(payloads.iter()), |mut b, (row, details)| {
            b.push_bind(&row.symbol)
                .push_bind(&row.run_id)
                .push_bind(row.timeframe.map(|tf| tf.as_str()))
                .push_bind(row.category.as_str())
                .push_bind(row.severity.as_str())
                .push_bind(&row.event)
                .push_bind(details)
                .push_bind(row.created_at);
        });

        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn insert_zone_events(&self, rows: &[TradeZoneEvent]) -> Result<u64> {
        if rows.is_empty() {
            return Ok(0);
        }

        let mut builder: QueryBuilder<MySql> = QueryBuilder::new(
            "INSERT INTO trade_zone_event (symbol, run_id, price, zone_min, zone_max, deviation_pct, mtf_context, created_at) ",
        );
        let mut contexts = Vec::with_capacity(rows.len());
        for row in rows {
            contexts.push(serde_json::to_string(&row.mtf_context)?);
        }
        builder.push_values(rows.iter().zip(contexts.iter()), |mut b, (row, ctx)| {
            b.push_bind(&row.symbol)
                .push_bind(&row.run_id)
                .push_bind(row.price)
                .push_bind(row.zone_min)
                .push_bind(row.zone_max)
                .push_bind(row.deviation_pct)
                .push_bind(ctx)
                .push_bind(row.created_at);
        });

        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn insert_lifecycle_events(&self, rows: &[TradeLifecycleEvent]) -> Result<u64> {
        if rows.is_empty() {
            return Ok(0);
        }

        let mut builder: QueryBuilder<MySql> = QueryBuilder::new(
            "INSERT INTO trade_lifecycle_event (symbol, run_id, client_order_id, from_status, to_status, reason, created_at) ",
        );
        builder.push_values(rows.iter(), |mut b, row| {
            b.push_bind(&row.symbol)
                .push_bind(&row.run_id)
                .push_bind(&row.client_order_id)
                .push_bind(&row.from_status)
                .push_bind(&row.to_status)
                .push_bind(&row.reason)
                .push_bind(row.created_at);
        });

        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
