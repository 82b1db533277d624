//! 订单意图实体 (OrderIntent / OrderProtection)
//!
//! 显式生命周期：DRAFT → VALIDATED → READY_TO_SEND → SENT；
//! 任意非终态可流转到 FAILED / CANCELLED。量化校验失败会写入
//! `validation_errors` 并停留在 DRAFT，绝不静默放行。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::enums::{IntentStatus, OrderType, ProtectionKind, Side};
use crate::value_objects::ContractSpec;

/// 非法状态流转
#[derive(Debug, Error, PartialEq)]
#[error("illegal intent transition: {from:?} -> {to:?}")]
pub struct IllegalTransition {
    pub from: IntentStatus,
    pub to: IntentStatus,
}

/// 止盈/止损保护单
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderProtection {
    pub kind: ProtectionKind,
    /// 触发价格
    pub trigger_price: f64,
    /// 数量；None 时取父意图的数量
    pub size: Option<f64>,
    /// 交易所侧订单ID（发送后回填）
    pub exchange_order_id: Option<String>,
}

impl OrderProtection {
    pub fn new(kind: ProtectionKind, trigger_price: f64) -> Self {
        Self {
            kind,
            trigger_price,
            size: None,
            exchange_order_id: None,
        }
    }

    /// 生效数量：缺省继承父意图
    pub fn effective_size(&self, parent_size: f64) -> f64 {
        self.size.unwrap_or(parent_size)
    }
}

/// 订单意图
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderIntent {
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub leverage: u32,
    /// 量化后的委托价格
    pub price: f64,
    /// 量化后的委托数量
    pub size: f64,
    /// 校验时使用的量化约束快照
    pub quantization: Option<ContractSpec>,
    /// 全局唯一的客户端订单ID
    pub client_order_id: String,
    pub status: IntentStatus,
    pub exchange_order_id: Option<String>,
    pub failure_reason: Option<String>,
    /// 量化校验错误列表（校验失败时填充）
    pub validation_errors: Vec<String>,
    pub protections: Vec<OrderProtection>,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl OrderIntent {
    pub fn draft(symbol: &str, side: Side, order_type: OrderType, leverage: u32) -> Self {
        Self {
            symbol: symbol.to_string(),
            side,
            order_type,
            leverage,
            price: 0.0,
            size: 0.0,
            quantization: None,
            client_order_id: Uuid::new_v4().to_string(),
            status: IntentStatus::Draft,
            exchange_order_id: None,
            failure_reason: None,
            validation_errors: Vec::new(),
            protections: Vec::new(),
            sent_at: None,
            created_at: Utc::now(),
        }
    }

    fn transition(&mut self, to: IntentStatus) -> Result<(), IllegalTransition> {
        if !self.status.can_transition_to(to) {
            return Err(IllegalTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    /// 量化校验：对齐价格/数量后按约束检查
    ///
    /// 通过则进入 VALIDATED；失败则留在 DRAFT 并填充 `validation_errors`。
    /// 返回是否通过。
    pub fn validate(&mut self, spec: &ContractSpec, raw_price: f64, raw_size: f64) -> Result<bool, IllegalTransition> {
        if self.status != IntentStatus::Draft {
            return Err(IllegalTransition {
                from: self.status,
                to: IntentStatus::Validated,
            });
        }

        let price = spec.quantize_price(raw_price);
        let size = spec.quantize_size(raw_size);
        let issues = spec.check(price, size, self.leverage);

        self.price = price;
        self.size = size;
        self.quantization = Some(spec.clone());
        self.validation_errors = issues.iter().map(|i| i.to_string()).collect();

        if self.validation_errors.is_empty() {
            self.transition(IntentStatus::Validated)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// VALIDATED → READY_TO_SEND
    pub fn prepare(&mut self) -> Result<(), IllegalTransition> {
        self.transition(IntentStatus::ReadyToSend)
    }

    /// 唯一写入 `sent_at` 与交易所订单ID的路径；READY_TO_SEND → SENT
    pub fn mark_as_sent(&mut self, exchange_order_id: &str) -> Result<(), IllegalTransition> {
        self.transition(IntentStatus::Sent)?;
        self.exchange_order_id = Some(exchange_order_id.to_string());
        self.sent_at = Some(Utc::now());
        Ok(())
    }

    /// 任意非终态 → FAILED
    pub fn fail(&mut self, reason: &str) -> Result<(), IllegalTransition> {
        self.transition(IntentStatus::Failed)?;
        self.failure_reason = Some(reason.to_string());
        Ok(())
    }

    /// 任意非终态 → CANCELLED
    pub fn cancel(&mut self) -> Result<(), IllegalTransition> {
        self.transition(IntentStatus::Cancelled)
    }

    pub fn add_protection(&mut self, protection: OrderProtection) {
        self.protections.push(protection);
    }
}
