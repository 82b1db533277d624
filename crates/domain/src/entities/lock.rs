//! 租约锁实体 (MtfLock)
//!
//! 以作用域字符串为键的互斥租约；过期租约视为可被新持有者抢占。

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// 租约锁
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MtfLock {
    /// 锁作用域，如 `RUN:GLOBAL`、`SYMBOL:BTC-USDT`
    pub scope: String,
    /// 持有者标识（进程/任务级别的不透明ID）
    pub owner_id: String,
    pub acquired_at: DateTime<Utc>,
    /// 租约到期时间；None 表示不过期（仅限人工锁）
    pub expires_at: Option<DateTime<Utc>>,
}

impl MtfLock {
    pub fn new(scope: &str, owner_id: &str, lease: Duration) -> Self {
        let now = Utc::now();
        Self {
            scope: scope.to_string(),
            owner_id: owner_id.to_string(),
            acquired_at: now,
            expires_at: Some(now + lease),
        }
    }

    /// 租约是否已过期（过期即可被抢占）
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(t) => t <= now,
            None => false,
        }
    }

    /// 运行级锁作用域
    pub fn run_scope() -> String {
        "RUN:GLOBAL".to_string()
    }

    /// 交易对级锁作用域
    pub fn symbol_scope(symbol: &str) -> String {
        format!("SYMBOL:{}", symbol)
    }
}

/// 尝试获取锁的结果：拿到租约，或者别人还持有（正常信号，非错误）
#[derive(Debug, Clone)]
pub enum AcquireOutcome {
    Acquired(MtfLock),
    Busy { holder: String },
}

impl AcquireOutcome {
    pub fn is_acquired(&self) -> bool {
        matches!(self, AcquireOutcome::Acquired(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lease_expiry() {
        let mut lock = MtfLock::new("RUN:GLOBAL", "worker-1", Duration::seconds(60));
        let now = Utc::now();
        assert!(!lock.is_expired(now));
        assert!(lock.is_expired(now + Duration::seconds(61)));

        lock.expires_at = None;
        assert!(!lock.is_expired(now + Duration::days(365)));
    }

    #[test]
    fn test_scope_keys() {
        assert_eq!(MtfLock::run_scope(), "RUN:GLOBAL");
        assert_eq!(MtfLock::symbol_scope("BTC-USDT"), "SYMBOL:BTC-USDT");
    }
}
