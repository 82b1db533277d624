//! 订单计划实体 (OrderPlan)
//!
//! 把方向决策、风险参数、决策上下文和执行结果挂在一条记录上。
//! 三段载荷按用途建模为具名结构，开放式元数据走 `extra` 逃生口。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{PlanStatus, Side, Timeframe};

/// 风险参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskParams {
    /// 单笔风险占账户比例
    pub risk_per_trade_pct: f64,
    /// 止损距离（以ATR倍数表达）
    pub stop_atr_multiple: f64,
    /// 止盈距离（以ATR倍数表达）
    pub take_profit_atr_multiple: f64,
    pub leverage: u32,
    #[serde(default)]
    pub extra: serde_json::Value,
}

/// 决策上下文快照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionContext {
    /// 做出决策的周期
    pub execution_tf: Timeframe,
    /// 各周期校验通过情况
    pub validated_tfs: Vec<Timeframe>,
    pub price: f64,
    pub atr: f64,
    pub atr_pct: f64,
    pub volume_ratio: f64,
    #[serde(default)]
    pub extra: serde_json::Value,
}

/// 执行结果
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExecutionOutcome {
    pub client_order_id: Option<String>,
    pub exchange_order_id: Option<String>,
    pub failure_reason: Option<String>,
    #[serde(default)]
    pub extra: serde_json::Value,
}

/// 订单计划
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPlan {
    pub symbol: String,
    pub side: Side,
    pub status: PlanStatus,
    pub risk: RiskParams,
    pub context: DecisionContext,
    pub outcome: ExecutionOutcome,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderPlan {
    pub fn new(symbol: &str, side: Side, risk: RiskParams, context: DecisionContext) -> Self {
        let now = Utc::now();
        Self {
            symbol: symbol.to_string(),
            side,
            status: PlanStatus::Planned,
            risk,
            context,
            outcome: ExecutionOutcome::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn mark_executed(&mut self, client_order_id: &str, exchange_order_id: Option<String>) {
        self.status = PlanStatus::Executed;
        self.outcome.client_order_id = Some(client_order_id.to_string());
        self.outcome.exchange_order_id = exchange_order_id;
        self.updated_at = Utc::now();
    }

    pub fn mark_failed(&mut self, reason: &str) {
        self.status = PlanStatus::Failed;
        self.outcome.failure_reason = Some(reason.to_string());
        self.updated_at = Utc::now();
    }

    pub fn mark_cancelled(&mut self) {
        self.status = PlanStatus::Cancelled;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> OrderPlan {
        OrderPlan::new(
            "BTC-USDT",
            Side::Long,
            RiskParams {
                risk_per_trade_pct: 1.0,
                stop_atr_multiple: 1.5,
                take_profit_atr_multiple: 3.0,
                leverage: 5,
                extra: serde_json::Value::Null,
            },
            DecisionContext {
                execution_tf: Timeframe::M5,
                validated_tfs: vec![Timeframe::H4, Timeframe::H1, Timeframe::M15, Timeframe::M5],
                price: 50000.0,
                atr: 300.0,
                atr_pct: 0.6,
                volume_ratio: 1.3,
                extra: serde_json::Value::Null,
            },
        )
    }

    #[test]
    fn test_plan_outcome_tracking() {
        let mut p = plan();
        assert_eq!(p.status, PlanStatus::Planned);

        p.mark_executed("cid-1", Some("okx-1".into()));
        assert_eq!(p.status, PlanStatus::Executed);
        assert_eq!(p.outcome.exchange_order_id.as_deref(), Some("okx-1"));

        let mut q = plan();
        q.mark_failed("quantization");
        assert_eq!(q.status, PlanStatus::Failed);
        assert_eq!(q.outcome.failure_reason.as_deref(), Some("quantization"));
    }
}
