//! 运行 / 风控相关枚举

use serde::{Deserialize, Serialize};

/// 运行状态（只允许向前流转：Running → Completed/Failed）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// 运行中
    Running,
    /// 已完成
    Completed,
    /// 失败
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
        }
    }

    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunStatus::Running)
    }
}

impl std::str::FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(RunStatus::Running),
            "completed" => Ok(RunStatus::Completed),
            "failed" => Ok(RunStatus::Failed),
            _ => Err(format!("Unknown run status: {}", s)),
        }
    }
}

/// 单个交易对在一次运行中的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolOutcome {
    /// 校验通过并产出订单计划
    Success,
    /// 级联校验在某个周期被挡住（非错误）
    Blocked,
    /// 被开关 / 冷却 / 黑名单 / 锁竞争跳过（非错误）
    Skipped,
    /// 输入缺失或处理异常
    Failed,
}

impl SymbolOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolOutcome::Success => "success",
            SymbolOutcome::Blocked => "blocked",
            SymbolOutcome::Skipped => "skipped",
            SymbolOutcome::Failed => "failed",
        }
    }
}

impl std::str::FromStr for SymbolOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(SymbolOutcome::Success),
            "blocked" => Ok(SymbolOutcome::Blocked),
            "skipped" => Ok(SymbolOutcome::Skipped),
            "failed" => Ok(SymbolOutcome::Failed),
            _ => Err(format!("Unknown symbol outcome: {}", s)),
        }
    }
}

/// 跳过原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// 开关关闭
    SwitchOff,
    /// 冷却期内
    Cooldown,
    /// 黑名单
    Blacklist,
    /// 锁被其他持有者占用
    LockBusy,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::SwitchOff => "switch_off",
            SkipReason::Cooldown => "cooldown",
            SkipReason::Blacklist => "blacklist",
            SkipReason::LockBusy => "lock_busy",
        }
    }
}

impl std::str::FromStr for SkipReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "switch_off" => Ok(SkipReason::SwitchOff),
            "cooldown" => Ok(SkipReason::Cooldown),
            "blacklist" => Ok(SkipReason::Blacklist),
            "lock_busy" => Ok(SkipReason::LockBusy),
            _ => Err(format!("Unknown skip reason: {}", s)),
        }
    }
}

/// 冷却原因（临时排除）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CooldownReason {
    /// 连续错误过多
    TooManyErrors,
    /// 流动性不足
    Illiquid,
    /// 刚平仓
    PositionJustClosed,
    /// 人工设置
    Manual,
}

impl CooldownReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            CooldownReason::TooManyErrors => "too_many_errors",
            CooldownReason::Illiquid => "illiquid",
            CooldownReason::PositionJustClosed => "position_just_closed",
            CooldownReason::Manual => "manual",
        }
    }
}

impl std::str::FromStr for CooldownReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "too_many_errors" => Ok(CooldownReason::TooManyErrors),
            "illiquid" => Ok(CooldownReason::Illiquid),
            "position_just_closed" => Ok(CooldownReason::PositionJustClosed),
            "manual" => Ok(CooldownReason::Manual),
            _ => Err(format!("Unknown cooldown reason: {}", s)),
        }
    }
}

/// 黑名单原因（永久或带过期的人工排除）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlacklistReason {
    /// 已下架
    Delisted,
    /// 人工禁用
    ManualBan,
    /// 风控禁用
    RiskControl,
}

impl BlacklistReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlacklistReason::Delisted => "delisted",
            BlacklistReason::ManualBan => "manual_ban",
            BlacklistReason::RiskControl => "risk_control",
        }
    }
}

impl std::str::FromStr for BlacklistReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "delisted" => Ok(BlacklistReason::Delisted),
            "manual_ban" => Ok(BlacklistReason::ManualBan),
            "risk_control" => Ok(BlacklistReason::RiskControl),
            _ => Err(format!("Unknown blacklist reason: {}", s)),
        }
    }
}

/// 订单计划状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanStatus {
    /// 已生成计划
    Planned,
    /// 已执行
    Executed,
    /// 已取消
    Cancelled,
    /// 失败
    Failed,
}

impl PlanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Planned => "planned",
            PlanStatus::Executed => "executed",
            PlanStatus::Cancelled => "cancelled",
            PlanStatus::Failed => "failed",
        }
    }
}

impl std::str::FromStr for PlanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planned" => Ok(PlanStatus::Planned),
            "executed" => Ok(PlanStatus::Executed),
            "cancelled" => Ok(PlanStatus::Cancelled),
            "failed" => Ok(PlanStatus::Failed),
            _ => Err(format!("Unknown plan status: {}", s)),
        }
    }
}

/// 入场区间状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoneStatus {
    /// 等待价格进入区间
    Waiting,
    /// 已触发
    Triggered,
    /// 已过有效期
    Expired,
    /// 被新区间取代
    Superseded,
}

impl ZoneStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneStatus::Waiting => "waiting",
            ZoneStatus::Triggered => "triggered",
            ZoneStatus::Expired => "expired",
            ZoneStatus::Superseded => "superseded",
        }
    }
}

impl std::str::FromStr for ZoneStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waiting" => Ok(ZoneStatus::Waiting),
            "triggered" => Ok(ZoneStatus::Triggered),
            "expired" => Ok(ZoneStatus::Expired),
            "superseded" => Ok(ZoneStatus::Superseded),
            _ => Err(format!("Unknown zone status: {}", s)),
        }
    }
}

/// 审计级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditSeverity {
    Info,
    Warn,
    Error,
}

impl AuditSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditSeverity::Info => "info",
            AuditSeverity::Warn => "warn",
            AuditSeverity::Error => "error",
        }
    }
}

/// 审计分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditCategory {
    /// 级联校验步骤
    Validation,
    /// 开关 / 冷却 / 黑名单检查
    Gate,
    /// 锁获取 / 释放
    Lock,
    /// 入场区间
    Zone,
    /// 订单意图生命周期
    Intent,
    /// 运行级事件
    Run,
}

impl AuditCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditCategory::Validation => "validation",
            AuditCategory::Gate => "gate",
            AuditCategory::Lock => "lock",
            AuditCategory::Zone => "zone",
            AuditCategory::Intent => "intent",
            AuditCategory::Run => "run",
        }
    }
}
