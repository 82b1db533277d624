//! 前置门控
//!
//! 开关 → 黑名单 → 冷却，固定顺序短路；任何一道拒绝都以
//! `SkipReason` 返回，不是错误。

pub mod exclusion_gates;
pub mod switch_gate;

use anyhow::Result;
use async_trait::async_trait;

use mtf_engine_domain::{SkipReason, Timeframe};

pub use exclusion_gates::{BlacklistGate, CooldownGate};
pub use switch_gate::SwitchGate;

/// 门控判定结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Skip(SkipReason),
}

impl GateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GateDecision::Allow)
    }
}

/// 单道门控
#[async_trait]
pub trait Gate: Send + Sync {
    fn name(&self) -> &'static str;

    async fn check(&self, symbol: &str, tf: Option<Timeframe>) -> Result<GateDecision>;
}

/// 门控链：按固定顺序逐道检查，第一道拒绝即返回
pub struct GateChain {
    gates: Vec<Box<dyn Gate>>,
}

impl GateChain {
    pub fn new(gates: Vec<Box<dyn Gate>>) -> Self {
        Self { gates }
    }

    pub async fn check(&self, symbol: &str, tf: Option<Timeframe>) -> Result<GateDecision> {
        for gate in &self.gates {
            let decision = gate.check(symbol, tf).await?;
            if let GateDecision::Skip(reason) = decision {
                tracing::debug!(
                    "Gate rejected: gate={}, symbol={}, reason={}",
                    gate.name(),
                    symbol,
                    reason.as_str()
                );
                return Ok(GateDecision::Skip(reason));
            }
        }
        Ok(GateDecision::Allow)
    }
}
