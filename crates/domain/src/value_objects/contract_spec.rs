//! 合约量化约束 (ContractSpec)
//!
//! 来自合约元数据服务的下单约束：价格步进、数量步进、最小名义价值。

use serde::{Deserialize, Serialize};

/// 合约量化约束快照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractSpec {
    pub symbol: String,
    /// 最小价格步进
    pub tick_size: f64,
    /// 最小数量步进
    pub step_size: f64,
    /// 最小名义价值（价格 × 数量）
    pub min_notional: f64,
    pub max_leverage: u32,
}

/// 量化校验问题
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QuantizationIssue {
    /// 价格不是 tick_size 的整数倍
    PriceTick { price: f64, tick_size: f64 },
    /// 数量不是 step_size 的整数倍
    SizeStep { size: f64, step_size: f64 },
    /// 名义价值低于下限
    MinNotional { notional: f64, min_notional: f64 },
    /// 杠杆超出上限
    Leverage { leverage: u32, max_leverage: u32 },
}

impl std::fmt::Display for QuantizationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuantizationIssue::PriceTick { price, tick_size } => {
                write!(f, "price {} not aligned to tick size {}", price, tick_size)
            }
            QuantizationIssue::SizeStep { size, step_size } => {
                write!(f, "size {} not aligned to step size {}", size, step_size)
            }
            QuantizationIssue::MinNotional {
                notional,
                min_notional,
            } => write!(f, "notional {} below minimum {}", notional, min_notional),
            QuantizationIssue::Leverage {
                leverage,
                max_leverage,
            } => write!(f, "leverage {} above maximum {}", leverage, max_leverage),
        }
    }
}

impl ContractSpec {
    /// 价格对齐到 tick_size（向下取整）
    pub fn quantize_price(&self, price: f64) -> f64 {
        if self.tick_size <= 0.0 {
            return price;
        }
        (price / self.tick_size).floor() * self.tick_size
    }

    /// 数量对齐到 step_size（向下取整）
    pub fn quantize_size(&self, size: f64) -> f64 {
        if self.step_size <= 0.0 {
            return size;
        }
        (size / self.step_size).floor() * self.step_size
    }

    /// 校验已量化的价格/数量/杠杆，返回全部违规项
    pub fn check(&self, price: f64, size: f64, leverage: u32) -> Vec<QuantizationIssue> {
        let mut issues = Vec::new();

        if self.tick_size > 0.0 && !aligned(price, self.tick_size) {
            issues.push(QuantizationIssue::PriceTick {
                price,
                tick_size: self.tick_size,
            });
        }
        if self.step_size > 0.0 && !aligned(size, self.step_size) {
            issues.push(QuantizationIssue::SizeStep {
                size,
                step_size: self.step_size,
            });
        }
        let notional = price * size;
        if notional < self.min_notional {
            issues.push(QuantizationIssue::MinNotional {
                notional,
                min_notional: self.min_notional,
            });
        }
        if leverage > self.max_leverage {
            issues.push(QuantizationIssue::Leverage {
                leverage,
                max_leverage: self.max_leverage,
            });
        }
        issues
    }
}

// 浮点对齐判断，容忍二进制表示误差
fn aligned(value: f64, step: f64) -> bool {
    let ratio = value / step;
    (ratio - ratio.round()).abs() < 1e-8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> ContractSpec {
        ContractSpec {
            symbol: "BTC-USDT".into(),
            tick_size: 0.1,
            step_size: 0.001,
            min_notional: 10.0,
            max_leverage: 20,
        }
    }

    #[test]
    fn test_quantize() {
        let s = spec();
        assert!((s.quantize_price(50000.17) - 50000.1).abs() < 1e-9);
        assert!((s.quantize_size(0.1234) - 0.123).abs() < 1e-9);
    }

    #[test]
    fn test_check_passes_quantized() {
        let s = spec();
        let price = s.quantize_price(50000.17);
        let size = s.quantize_size(0.1234);
        assert!(s.check(price, size, 10).is_empty());
    }

    #[test]
    fn test_check_collects_all_issues() {
        let s = spec();
        let issues = s.check(50000.17, 0.0001234, 50);
        assert_eq!(issues.len(), 4);
    }

    #[test]
    fn test_min_notional() {
        let s = spec();
        let issues = s.check(100.0, 0.001, 1);
        assert!(matches!(
            issues.as_slice(),
            [QuantizationIssue::MinNotional { .. }]
        ));
    }
}
