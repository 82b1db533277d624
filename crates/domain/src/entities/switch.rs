//! 开关实体 (MtfSwitch)
//!
//! 三级作用域的布尔开关：全局 > 交易对 > 交易对+周期。
//! 过期的开关行视为不存在。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::Timeframe;

/// 开关作用域
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwitchScope {
    /// 全局总开关
    Global,
    /// 单个交易对
    Symbol(String),
    /// 交易对 + 周期
    SymbolTf(String, Timeframe),
}

impl SwitchScope {
    /// 存储键，如 `GLOBAL` / `SYMBOL:BTC-USDT` / `SYMBOL_TF:BTC-USDT:5m`
    pub fn key(&self) -> String {
        match self {
            SwitchScope::Global => "GLOBAL".to_string(),
            SwitchScope::Symbol(s) => format!("SYMBOL:{}", s),
            SwitchScope::SymbolTf(s, tf) => format!("SYMBOL_TF:{}:{}", s, tf.as_str()),
        }
    }

    /// 从存储键还原作用域
    pub fn from_key(key: &str) -> Result<Self, String> {
        if key == "GLOBAL" {
            return Ok(SwitchScope::Global);
        }
        if let Some(symbol) = key.strip_prefix("SYMBOL:") {
            return Ok(SwitchScope::Symbol(symbol.to_string()));
        }
        if let Some(rest) = key.strip_prefix("SYMBOL_TF:") {
            // 交易对本身可能含冒号，周期取最后一段
            if let Some((symbol, tf)) = rest.rsplit_once(':') {
                let tf = tf.parse::<Timeframe>()?;
                return Ok(SwitchScope::SymbolTf(symbol.to_string(), tf));
            }
        }
        Err(format!("Unknown switch scope key: {}", key))
    }
}

/// 开关行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MtfSwitch {
    pub scope: SwitchScope,
    pub is_on: bool,
    /// 过期时间；过期后该行视为不存在
    pub expires_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl MtfSwitch {
    pub fn new(scope: SwitchScope, is_on: bool, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            scope,
            is_on,
            expires_at,
            updated_at: Utc::now(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(t) => t <= now,
            None => false,
        }
    }

    /// 当前生效的开关值；过期返回 None（由调用方回退到缺省值）
    pub fn effective(&self, now: DateTime<Utc>) -> Option<bool> {
        if self.is_expired(now) {
            None
        } else {
            Some(self.is_on)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_scope_keys() {
        assert_eq!(SwitchScope::Global.key(), "GLOBAL");
        assert_eq!(
            SwitchScope::Symbol("BTC-USDT".into()).key(),
            "SYMBOL:BTC-USDT"
        );
        assert_eq!(
            SwitchScope::SymbolTf("BTC-USDT".into(), Timeframe::M5).key(),
            "SYMBOL_TF:BTC-USDT:5m"
        );
    }

    #[test]
    fn test_scope_key_round_trip() {
        for scope in [
            SwitchScope::Global,
            SwitchScope::Symbol("BTC-USDT".into()),
            SwitchScope::SymbolTf("BTC-USDT".into(), Timeframe::M15),
        ] {
            assert_eq!(SwitchScope::from_key(&scope.key()), Ok(scope));
        }
    }

    #[test]
    fn test_expired_switch_is_absent() {
        let now = Utc::now();
        let sw = MtfSwitch::new(SwitchScope::Global, false, Some(now - Duration::seconds(1)));
        assert_eq!(sw.effective(now), None);

        let sw = MtfSwitch::new(SwitchScope::Global, false, Some(now + Duration::seconds(60)));
        assert_eq!(sw.effective(now), Some(false));

        let sw = MtfSwitch::new(SwitchScope::Global, true, None);
        assert_eq!(sw.effective(now), Some(true));
    }
}
