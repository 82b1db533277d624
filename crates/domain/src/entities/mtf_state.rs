//! 多周期校验状态实体 (MtfState)
//!
//! 每个交易对一行，记录五个周期各自最近一次通过校验的K线时间与方向。
//! 只通过 `apply` 更新，从不删除。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{Side, Timeframe};

/// 单个周期的校验槽位
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TimeframeSlot {
    /// 最近一次通过校验的K线收盘时间（毫秒时间戳）；None 表示从未通过
    pub last_candle_ts: Option<i64>,
    /// 该周期当前判定的方向
    pub side: Option<Side>,
}

/// 多周期校验状态
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MtfState {
    pub symbol: String,
    /// 按 `Timeframe::CASCADE` 顺序索引的槽位
    pub slots: [TimeframeSlot; 5],
    pub updated_at: DateTime<Utc>,
}

impl MtfState {
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            slots: [TimeframeSlot::default(); 5],
            updated_at: Utc::now(),
        }
    }

    pub fn slot(&self, tf: Timeframe) -> &TimeframeSlot {
        &self.slots[tf.cascade_index()]
    }

    /// 周期是否已通过校验（时间戳非空）
    pub fn is_validated(&self, tf: Timeframe) -> bool {
        self.slot(tf).last_candle_ts.is_some()
    }

    /// 父级周期是否全部通过校验（CASCADE 前缀扫描）
    pub fn are_parent_timeframes_validated(&self, tf: Timeframe) -> bool {
        tf.parents().iter().all(|p| self.is_validated(*p))
    }

    /// 所有非空方向是否一致；一致则返回该方向，否则（含全空）返回 None
    pub fn consistent_side(&self) -> Option<Side> {
        let mut resolved = self.slots.iter().filter_map(|s| s.side);
        let first = resolved.next()?;
        if resolved.all(|s| s == first) {
            Some(first)
        } else {
            None
        }
    }

    /// 是否存在一致方向
    pub fn has_consistent_sides(&self) -> bool {
        self.consistent_side().is_some()
    }

    /// 唯一的写入口：记录某周期的校验结果并刷新 `updated_at`
    ///
    /// K线时间必须单调前进，重复或回退的时间戳返回 false 且不改动槽位。
    pub fn apply(&mut self, tf: Timeframe, candle_ts: i64, side: Side) -> bool {
        let slot = &mut self.slots[tf.cascade_index()];
        if let Some(prev) = slot.last_candle_ts {
            if candle_ts <= prev {
                return false;
            }
        }
        slot.last_candle_ts = Some(candle_ts);
        slot.side = Some(side);
        self.updated_at = Utc::now();
        true
    }
}
