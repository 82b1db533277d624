//! 入场区间实体 (EntryZoneLive)
//!
//! 每次重算插入新行并取代旧行，旧行从不原地修改。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{Side, ZoneStatus};

/// 当前有效的入场价格区间
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryZoneLive {
    pub symbol: String,
    pub side: Side,
    pub min_price: f64,
    pub max_price: f64,
    /// ATR 百分比（波动度输入）
    pub atr_pct: f64,
    /// 成交量比（流动性输入）
    pub volume_ratio: f64,
    pub vwap: f64,
    /// 区间参数档位，如 "default" / "conservative"
    pub config_profile: String,
    pub config_version: u32,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub status: ZoneStatus,
    pub created_at: DateTime<Utc>,
}

impl EntryZoneLive {
    /// 价格是否落在区间内
    pub fn contains(&self, price: f64) -> bool {
        price >= self.min_price && price <= self.max_price
    }

    /// 在给定时刻是否仍在有效期内
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.valid_from && now < self.valid_until
    }

    /// 相对区间最近边界的偏离百分比；区间内为 0
    pub fn deviation_pct(&self, price: f64) -> f64 {
        if self.contains(price) {
            0.0
        } else if price < self.min_price {
            (self.min_price - price) / self.min_price * 100.0
        } else {
            (price - self.max_price) / self.max_price * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn zone() -> EntryZoneLive {
        let now = Utc::now();
        EntryZoneLive {
            symbol: "BTC-USDT".into(),
            side: Side::Long,
            min_price: 99.0,
            max_price: 101.0,
            atr_pct: 1.0,
            volume_ratio: 1.2,
            vwap: 100.0,
            config_profile: "default".into(),
            config_version: 1,
            valid_from: now,
            valid_until: now + Duration::minutes(15),
            status: ZoneStatus::Waiting,
            created_at: now,
        }
    }

    #[test]
    fn test_contains_and_deviation() {
        let z = zone();
        assert!(z.contains(100.0));
        assert!(z.contains(99.0));
        assert_eq!(z.deviation_pct(100.0), 0.0);
        assert!((z.deviation_pct(97.02) - 2.0).abs() < 1e-9);
        assert!((z.deviation_pct(103.02) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_validity_window() {
        let z = zone();
        assert!(z.is_valid_at(z.valid_from + Duration::minutes(5)));
        assert!(!z.is_valid_at(z.valid_until));
        assert!(!z.is_valid_at(z.valid_from - Duration::seconds(1)));
    }
}
