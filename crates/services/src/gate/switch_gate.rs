//! 开关门控
//!
//! 作用域从宽到窄依次检查：全局 → 交易对 → 交易对+周期。
//! 任何一级显式为关即拒绝；缺失或过期的级别回退到缺省语义
//! （fail-open 放行 / fail-closed 拒绝）。

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;

use mtf_engine_domain::traits::SwitchRepository;
use mtf_engine_domain::{SkipReason, SwitchScope, Timeframe};

use super::{Gate, GateDecision};

pub struct SwitchGate {
    switches: Arc<dyn SwitchRepository>,
    /// 缺省语义：true 时缺失/过期的开关视为关
    fail_closed: bool,
}

impl SwitchGate {
    pub fn new(switches: Arc<dyn SwitchRepository>, fail_closed: bool) -> Self {
        Self {
            switches,
            fail_closed,
        }
    }

    async fn scope_is_on(&self, scope: &SwitchScope) -> Result<bool> {
        let now = Utc::now();
        let effective = match self.switches.get(scope).await? {
            Some(switch) => switch.effective(now),
            None => None,
        };
        Ok(effective.unwrap_or(!self.fail_closed))
    }
}

#[async_trait]
impl Gate for SwitchGate {
    fn name(&self) -> &'static str {
        "switch"
    }

    async fn check(&self, symbol: &str, tf: Option<Timeframe>) -> Result<GateDecision> {
        let mut scopes = vec![
            SwitchScope::Global,
            SwitchScope::Symbol(symbol.to_string()),
        ];
        if let Some(tf) = tf {
            scopes.push(SwitchScope::SymbolTf(symbol.to_string(), tf));
        }

        for scope in &scopes {
            if !self.scope_is_on(scope).await? {
                return Ok(GateDecision::Skip(SkipReason::SwitchOff));
            }
        }
        Ok(GateDecision::Allow)
    }
}
