//! 时间周期与方向枚举
//!
//! 级联校验按 CASCADE 顺序（长周期 → 短周期）逐级推进

use serde::{Deserialize, Serialize};

/// 时间周期（长 → 短）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    /// 4小时
    H4,
    /// 1小时
    H1,
    /// 15分钟
    M15,
    /// 5分钟
    M5,
    /// 1分钟
    M1,
}

impl Timeframe {
    /// 级联校验顺序：4h → 1h → 15m → 5m → 1m
    pub const CASCADE: [Timeframe; 5] = [
        Timeframe::H4,
        Timeframe::H1,
        Timeframe::M15,
        Timeframe::M5,
        Timeframe::M1,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::H4 => "4h",
            Timeframe::H1 => "1h",
            Timeframe::M15 => "15m",
            Timeframe::M5 => "5m",
            Timeframe::M1 => "1m",
        }
    }

    /// 在级联顺序中的下标
    pub fn cascade_index(&self) -> usize {
        match self {
            Timeframe::H4 => 0,
            Timeframe::H1 => 1,
            Timeframe::M15 => 2,
            Timeframe::M5 => 3,
            Timeframe::M1 => 4,
        }
    }

    /// 父级周期（CASCADE 中位于自己之前的全部周期）
    pub fn parents(&self) -> &'static [Timeframe] {
        &Self::CASCADE[..self.cascade_index()]
    }

    /// 周期对应的分钟数
    pub fn to_minutes(&self) -> i64 {
        match self {
            Timeframe::H4 => 240,
            Timeframe::H1 => 60,
            Timeframe::M15 => 15,
            Timeframe::M5 => 5,
            Timeframe::M1 => 1,
        }
    }
}

impl std::str::FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "4h" | "4H" => Ok(Timeframe::H4),
            "1h" | "1H" => Ok(Timeframe::H1),
            "15m" => Ok(Timeframe::M15),
            "5m" => Ok(Timeframe::M5),
            "1m" => Ok(Timeframe::M1),
            _ => Err(format!("Unknown timeframe: {}", s)),
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 方向（多 / 空）；"无方向" 用 `Option<Side>::None` 表达
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// 多头
    Long,
    /// 空头
    Short,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Long => "long",
            Side::Short => "short",
        }
    }

    /// 反向
    pub fn opposite(&self) -> Self {
        match self {
            Side::Long => Side::Short,
            Side::Short => Side::Long,
        }
    }
}

impl std::str::FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "long" => Ok(Side::Long),
            "short" => Ok(Side::Short),
            _ => Err(format!("Unknown side: {}", s)),
        }
    }
}
