//! 指标侧输入快照 (TimeframeSignal)
//!
//! K线/指标协作方提供的单周期快照，是级联校验与区间计算的全部输入。

use serde::{Deserialize, Serialize};

use crate::enums::Side;

/// 单周期指标快照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeframeSignal {
    /// 最近一根已收盘K线的收盘时间（毫秒时间戳）
    pub candle_ts: i64,
    /// 指标判定的方向；None 表示无方向
    pub side: Option<Side>,
    /// 当前价格
    pub price: f64,
    pub atr: f64,
    /// ATR 占价格的百分比
    pub atr_pct: f64,
    /// 当前成交量与均量之比
    pub volume_ratio: f64,
    pub vwap: f64,
}

impl TimeframeSignal {
    /// 方向是否已判定
    pub fn has_side(&self) -> bool {
        self.side.is_some()
    }
}
