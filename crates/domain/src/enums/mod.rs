//! 业务枚举

pub mod order_enums;
pub mod run_enums;
pub mod timeframe;

pub use order_enums::{IntentStatus, OrderType, ProtectionKind};
pub use run_enums::{
    AuditCategory, AuditSeverity, BlacklistReason, CooldownReason, PlanStatus, RunStatus,
    SkipReason, SymbolOutcome, ZoneStatus,
};
pub use timeframe::{Side, Timeframe};
