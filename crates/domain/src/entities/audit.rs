//! 审计实体（只追加，从不修改）
//!
//! MtfAudit 记录每个校验/门控/锁事件；TradeZoneEvent 记录入场区间偏离；
//! TradeLifecycleEvent 记录交易生命周期流转。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{AuditCategory, AuditSeverity, Timeframe};

/// 通用审计行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MtfAudit {
    pub symbol: String,
    pub run_id: Option<String>,
    pub timeframe: Option<Timeframe>,
    pub category: AuditCategory,
    pub severity: AuditSeverity,
    /// 事件名，如 "tf_accepted" / "tf_blocked" / "lock_stolen"
    pub event: String,
    /// 结构化细节
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl MtfAudit {
    pub fn new(
        symbol: &str,
        category: AuditCategory,
        severity: AuditSeverity,
        event: &str,
    ) -> Self {
        Self {
            symbol: symbol.to_string(),
            run_id: None,
            timeframe: None,
            category,
            severity,
            event: event.to_string(),
            details: serde_json::Value::Null,
            created_at: Utc::now(),
        }
    }

    pub fn with_run(mut self, run_id: &str) -> Self {
        self.run_id = Some(run_id.to_string());
        self
    }

    pub fn with_timeframe(mut self, tf: Timeframe) -> Self {
        self.timeframe = Some(tf);
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }
}

/// 入场区间偏离事件（诊断用途，不拦截）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeZoneEvent {
    pub symbol: String,
    pub run_id: Option<String>,
    /// 候选价格
    pub price: f64,
    /// 区间下沿
    pub zone_min: f64,
    /// 区间上沿
    pub zone_max: f64,
    /// 偏离百分比（相对最近的区间边界）
    pub deviation_pct: f64,
    /// 偏离时刻的多周期上下文快照
    pub mtf_context: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// 交易生命周期事件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeLifecycleEvent {
    pub symbol: String,
    pub run_id: Option<String>,
    /// 关联的客户端订单ID
    pub client_order_id: String,
    pub from_status: String,
    pub to_status: String,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TradeLifecycleEvent {
    pub fn new(
        symbol: &str,
        client_order_id: &str,
        from_status: &str,
        to_status: &str,
        reason: Option<String>,
    ) -> Self {
        Self {
            symbol: symbol.to_string(),
            run_id: None,
            client_order_id: client_order_id.to_string(),
            from_status: from_status.to_string(),
            to_status: to_status.to_string(),
            reason,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_builder() {
        let audit = MtfAudit::new(
            "BTC-USDT",
            AuditCategory::Validation,
            AuditSeverity::Info,
            "tf_accepted",
        )
        .with_run("run-1")
        .with_timeframe(Timeframe::H4)
        .with_details(serde_json::json!({"candle_ts": 1000}));

        assert_eq!(audit.run_id.as_deref(), Some("run-1"));
        assert_eq!(audit.timeframe, Some(Timeframe::H4));
        assert_eq!(audit.details["candle_ts"], 1000);
    }
}
