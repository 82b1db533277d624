//! 黑名单 / 冷却门控
//!
//! 两者共用 CooldownRepository；过期条目惰性放行，不在门控里清除。

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;

use mtf_engine_domain::traits::CooldownRepository;
use mtf_engine_domain::{SkipReason, Timeframe};

use super::{Gate, GateDecision};

pub struct BlacklistGate {
    cooldowns: Arc<dyn CooldownRepository>,
}

impl BlacklistGate {
    pub fn new(cooldowns: Arc<dyn CooldownRepository>) -> Self {
        Self { cooldowns }
    }
}

#[async_trait]
impl Gate for BlacklistGate {
    fn name(&self) -> &'static str {
        "blacklist"
    }

    async fn check(&self, symbol: &str, _tf: Option<Timeframe>) -> Result<GateDecision> {
        match self.cooldowns.find_blacklist(symbol).await? {
            Some(entry) if entry.is_active(Utc::now()) => {
                Ok(GateDecision::Skip(SkipReason::Blacklist))
            }
            _ => Ok(GateDecision::Allow),
        }
    }
}

pub struct CooldownGate {
    cooldowns: Arc<dyn CooldownRepository>,
}

impl CooldownGate {
    pub fn new(cooldowns: Arc<dyn CooldownRepository>) -> Self {
        Self { cooldowns }
    }
}

#[async_trait]
impl Gate for CooldownGate {
    fn name(&self) -> &'static str {
        "cooldown"
    }

    async fn check(&self, symbol: &str, _tf: Option<Timeframe>) -> Result<GateDecision> {
        match self.cooldowns.find_cooldown(symbol).await? {
            Some(cd) if cd.is_active(Utc::now()) => Ok(GateDecision::Skip(SkipReason::Cooldown)),
            _ => Ok(GateDecision::Allow),
        }
    }
}
