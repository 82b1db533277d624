//! 订单意图相关枚举

use serde::{Deserialize, Serialize};

/// 订单意图状态机
///
/// 合法路径：Draft → Validated → ReadyToSend → Sent；
/// 任意非终态都可以流转到 Failed / Cancelled；Sent 为终态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntentStatus {
    /// 草稿
    Draft,
    /// 量化校验通过
    Validated,
    /// 待发送
    ReadyToSend,
    /// 已发送（终态）
    Sent,
    /// 失败（终态）
    Failed,
    /// 已取消（终态）
    Cancelled,
}

impl IntentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentStatus::Draft => "DRAFT",
            IntentStatus::Validated => "VALIDATED",
            IntentStatus::ReadyToSend => "READY_TO_SEND",
            IntentStatus::Sent => "SENT",
            IntentStatus::Failed => "FAILED",
            IntentStatus::Cancelled => "CANCELLED",
        }
    }

    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            IntentStatus::Sent | IntentStatus::Failed | IntentStatus::Cancelled
        )
    }

    /// 状态机流转是否合法
    pub fn can_transition_to(&self, next: IntentStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match next {
            IntentStatus::Validated => *self == IntentStatus::Draft,
            IntentStatus::ReadyToSend => *self == IntentStatus::Validated,
            IntentStatus::Sent => *self == IntentStatus::ReadyToSend,
            IntentStatus::Failed | IntentStatus::Cancelled => true,
            IntentStatus::Draft => false,
        }
    }
}

impl std::str::FromStr for IntentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(IntentStatus::Draft),
            "VALIDATED" => Ok(IntentStatus::Validated),
            "READY_TO_SEND" => Ok(IntentStatus::ReadyToSend),
            "SENT" => Ok(IntentStatus::Sent),
            "FAILED" => Ok(IntentStatus::Failed),
            "CANCELLED" => Ok(IntentStatus::Cancelled),
            _ => Err(format!("Unknown intent status: {}", s)),
        }
    }
}

/// 订单类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    /// 限价单
    Limit,
    /// 市价单
    Market,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Limit => "limit",
            OrderType::Market => "market",
        }
    }
}

impl std::str::FromStr for OrderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "limit" => Ok(OrderType::Limit),
            "market" => Ok(OrderType::Market),
            _ => Err(format!("Unknown order type: {}", s)),
        }
    }
}

/// 保护单类型（止盈 / 止损）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProtectionKind {
    /// 止盈
    TakeProfit,
    /// 止损
    StopLoss,
}

impl ProtectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProtectionKind::TakeProfit => "take_profit",
            ProtectionKind::StopLoss => "stop_loss",
        }
    }
}

impl std::str::FromStr for ProtectionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "take_profit" => Ok(ProtectionKind::TakeProfit),
            "stop_loss" => Ok(ProtectionKind::StopLoss),
            _ => Err(format!("Unknown protection kind: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        assert!(IntentStatus::Draft.can_transition_to(IntentStatus::Validated));
        assert!(IntentStatus::Validated.can_transition_to(IntentStatus::ReadyToSend));
        assert!(IntentStatus::ReadyToSend.can_transition_to(IntentStatus::Sent));
    }

    #[test]
    fn test_no_skipping_states() {
        assert!(!IntentStatus::Draft.can_transition_to(IntentStatus::Sent));
        assert!(!IntentStatus::Draft.can_transition_to(IntentStatus::ReadyToSend));
        assert!(!IntentStatus::Validated.can_transition_to(IntentStatus::Sent));
    }

    #[test]
    fn test_fail_cancel_from_any_non_terminal() {
        for st in [
            IntentStatus::Draft,
            IntentStatus::Validated,
            IntentStatus::ReadyToSend,
        ] {
            assert!(st.can_transition_to(IntentStatus::Failed));
            assert!(st.can_transition_to(IntentStatus::Cancelled));
        }
    }

    #[test]
    fn test_terminal_states_frozen() {
        for st in [
            IntentStatus::Sent,
            IntentStatus::Failed,
            IntentStatus::Cancelled,
        ] {
            assert!(st.is_terminal());
            assert!(!st.can_transition_to(IntentStatus::Failed));
            assert!(!st.can_transition_to(IntentStatus::Cancelled));
        }
    }
}
