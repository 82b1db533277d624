//! 订单仓储实现 (sqlx)
//!
//! `order_intent` + `order_protection`（子表，按 client_order_id 级联），
//! `order_plan` 三段 JSON 载荷列。

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, MySql, Pool, QueryBuilder};

use mtf_engine_domain::traits::{OrderIntentRepository, OrderPlanRepository};
use mtf_engine_domain::{
    IntentStatus, OrderIntent, OrderPlan, OrderProtection, OrderType, PlanStatus, ProtectionKind,
    Side,
};

#[derive(Debug, Clone, FromRow)]
pub struct OrderIntentEntity {
    pub client_order_id: String,
    pub symbol: String,
    pub side: String,
    pub order_type: String,
    pub leverage: u32,
    pub price: f64,
    pub size: f64,
    pub quantization: Option<String>,
    pub status: String,
    pub exchange_order_id: Option<String>,
    pub failure_reason: Option<String>,
    pub validation_errors: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl OrderIntentEntity {
    pub fn to_domain(&self, protections: Vec<OrderProtection>) -> Result<OrderIntent> {
        Ok(OrderIntent {
            symbol: self.symbol.clone(),
            side: self.side.parse::<Side>().map_err(|e| anyhow::anyhow!(e))?,
            order_type: self
                .order_type
                .parse::<OrderType>()
                .map_err(|e| anyhow::anyhow!(e))?,
            leverage: self.leverage,
            price: self.price,
            size: self.size,
            quantization: self
                .quantization
                .as_deref()
                .map(serde_json::from_str)
                .transpose()?,
            client_order_id: self.client_order_id.clone(),
            status: self
                .status
                .parse::<IntentStatus>()
                .map_err(|e| anyhow::anyhow!(e))?,
            exchange_order_id: self.exchange_order_id.clone(),
            failure_reason: self.failure_reason.clone(),
            validation_errors: self
                .validation_errors
                .as_deref()
                .map(serde_json::from_str)
                .transpose()?
                .unwrap_or_default(),
            protections,
            sent_at: self.sent_at,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct OrderProtectionEntity {
    pub client_order_id: String,
    pub kind: String,
    pub trigger_price: f64,
    pub size: Option<f64>,
    pub exchange_order_id: Option<String>,
}

impl OrderProtectionEntity {
    pub fn to_domain(&self) -> Result<OrderProtection> {
        Ok(OrderProtection {
            kind: self
                .kind
                .parse::<ProtectionKind>()
                .map_err(|e| anyhow::anyhow!(e))?,
            trigger_price: self.trigger_price,
            size: self.size,
            exchange_order_id: self.exchange_order_id.clone(),
        })
    }
}

/// 订单意图仓储 (基于 sqlx)
pub struct SqlxOrderIntentRepository {
    pool: Pool<MySql>,
}

impl SqlxOrderIntentRepository {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    async fn replace_protections(&self, intent: &OrderIntent) -> Result<()> {
        sqlx::query("DELETE FROM order_protection WHERE client_order_id = ?")
            .bind(&intent.client_order_id)
            .execute(&self.pool)
            .await?;

        if intent.protections.is_empty() {
            return Ok(());
        }

        let mut builder: QueryBuilder<MySql> = QueryBuilder::new(
            "INSERT INTO order_protection (client_order_id, kind, trigger_price, size, exchange_order_id) ",
        );
        builder.push_values(intent.protections.iter(), |mut b, p| {
            b.push_bind(&intent.client_order_id)
                .push_bind(p.kind.as_str())
                .push_bind(p.trigger_price)
                .push_bind(p.size)
                .push_bind(&p.exchange_order_id);
        });
        builder.build().execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl OrderIntentRepository for SqlxOrderIntentRepository {
    async fn insert(&self, intent: &OrderIntent) -> Result<()> {
        sqlx::query(
            "INSERT INTO order_intent
                (client_order_id, symbol, side, order_type, leverage, price, size,
                 quantization, status, exchange_order_id, failure_reason,
                 validation_errors, sent_at, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&intent.client_order_id)
        .bind(&intent.symbol)
        .bind(intent.side.as_str())
        .bind(intent.order_type.as_str())
        .bind(intent.leverage)
        .bind(intent.price)
        .bind(intent.size)
        .bind(
            intent
                .quantization
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?,
        )
        .bind(intent.status.as_str())
        .bind(&intent.exchange_order_id)
        .bind(&intent.failure_reason)
        .bind(serde_json::to_string(&intent.validation_errors)?)
        .bind(intent.sent_at)
        .bind(intent.created_at)
        .execute(&self.pool)
        .await?;

        self.replace_protections(intent).await
    }

    async fn update(&self, intent: &OrderIntent) -> Result<()> {
        sqlx::query(
            "UPDATE order_intent SET
                price = ?, size = ?, quantization = ?, status = ?,
                exchange_order_id = ?, failure_reason = ?, validation_errors = ?, sent_at = ?
             WHERE client_order_id = ?",
        )
        .bind(intent.price)
        .bind(intent.size)
        .bind(
            intent
                .quantization
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?,
        )
        .bind(intent.status.as_str())
        .bind(&intent.exchange_order_id)
        .bind(&intent.failure_reason)
        .bind(serde_json::to_string(&intent.validation_errors)?)
        .bind(intent.sent_at)
        .bind(&intent.client_order_id)
        .execute(&self.pool)
        .await?;

        self.replace_protections(intent).await
    }

    async fn find_by_client_order_id(&self, client_order_id: &str) -> Result<Option<OrderIntent>> {
        let entity = sqlx::query_as::<_, OrderIntentEntity>(
            "SELECT client_order_id, symbol, side, order_type, leverage, price, size,
                    quantization, status, exchange_order_id, failure_reason,
                    validation_errors, sent_at, created_at
             FROM order_intent WHERE client_order_id = ? LIMIT 1",
        )
        .bind(client_order_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(entity) = entity else {
            return Ok(None);
        };

        let rows = sqlx::query_as::<_, OrderProtectionEntity>(
            "SELECT client_order_id, kind, trigger_price, size, exchange_order_id
             FROM order_protection WHERE client_order_id = ?",
        )
        .bind(client_order_id)
        .fetch_all(&self.pool)
        .await?;

        let protections = rows
            .iter()
            .map(|e| e.to_domain())
            .collect::<Result<Vec<_>>>()?;
        Ok(Some(entity.to_domain(protections)?))
    }

    async fn delete(&self, client_order_id: &str) -> Result<()> {
        // 先删子表再删主表
        sqlx::query("DELETE FROM order_protection WHERE client_order_id = ?")
            .bind(client_order_id)
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM order_intent WHERE client_order_id = ?")
            .bind(client_order_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// 订单计划仓储 (基于 sqlx)
pub struct SqlxOrderPlanRepository {
    pool: Pool<MySql>,
}

impl SqlxOrderPlanRepository {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderPlanRepository for SqlxOrderPlanRepository {
    async fn insert(&self, plan: &OrderPlan) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO order_plan
                (symbol, side, status, risk, context, outcome, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&plan.symbol)
        .bind(plan.side.as_str())
        .bind(plan.status.as_str())
        .bind(serde_json::to_string(&plan.risk)?)
        .bind(serde_json::to_string(&plan.context)?)
        .bind(serde_json::to_string(&plan.outcome)?)
        .bind(plan.created_at)
        .bind(plan.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_id() as i64)
    }

    async fn update(&self, id: i64, plan: &OrderPlan) -> Result<()> {
        sqlx::query(
            "UPDATE order_plan SET status = ?, outcome = ?, updated_at = ? WHERE id = ?",
        )
        .bind(plan.status.as_str())
        .bind(serde_json::to_string(&plan.outcome)?)
        .bind(plan.updated_at)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
