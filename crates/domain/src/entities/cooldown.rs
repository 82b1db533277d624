//! 冷却与黑名单实体
//!
//! 冷却用于临时排除（可原地续期）；黑名单用于永久或人工排除（可带过期）。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{BlacklistReason, CooldownReason};

/// 合约冷却记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractCooldown {
    pub symbol: String,
    pub reason: CooldownReason,
    /// 冷却截止时间；None 表示永久（直到人工清除）
    pub active_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContractCooldown {
    pub fn new(symbol: &str, reason: CooldownReason, active_until: Option<DateTime<Utc>>) -> Self {
        let now = Utc::now();
        Self {
            symbol: symbol.to_string(),
            reason,
            active_until,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        match self.active_until {
            Some(t) => t > now,
            None => true,
        }
    }

    /// 原地续期：窗口只向前延长，幂等
    pub fn extend(&mut self, until: DateTime<Utc>, reason: CooldownReason) {
        match self.active_until {
            Some(cur) if cur >= until => {}
            _ if self.active_until.is_none() => {}
            _ => self.active_until = Some(until),
        }
        self.reason = reason;
        self.updated_at = Utc::now();
    }
}

/// 黑名单记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlacklistedContract {
    pub symbol: String,
    pub reason: BlacklistReason,
    /// 过期时间；None 表示永久
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl BlacklistedContract {
    pub fn new(symbol: &str, reason: BlacklistReason, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            symbol: symbol.to_string(),
            reason,
            expires_at,
            created_at: Utc::now(),
        }
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(t) => t > now,
            None => true,
        }
    }
}

/// 排除原因（黑名单比冷却更严重，返回时优先）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExclusionReason {
    Cooldown(CooldownReason),
    Blacklist(BlacklistReason),
}
