//! # MTF Engine Domain
//!
//! 领域模型层 - 纯粹的业务逻辑，不依赖任何基础设施
//!
//! ## 模块组织
//!
//! - `entities`: 业务实体，如 MtfState, MtfLock, MtfRun, OrderIntent
//! - `value_objects`: 值对象，如 ContractSpec, TimeframeSignal
//! - `enums`: 业务枚举，如 Timeframe, Side, IntentStatus
//! - `traits`: 领域接口（仓储 + 外部协作方）
//!
//! ## 架构原则
//!
//! 1. 不依赖 sqlx / redis 等外部框架
//! 2. 状态机与不变式都在实体方法里收口
//! 3. 可以独立测试，不需要数据库或外部服务

pub mod entities;
pub mod enums;
pub mod traits;
pub mod value_objects;

pub use entities::{
    AcquireOutcome, BlacklistedContract, ContractCooldown, DecisionContext, EntryZoneLive,
    ExclusionReason, ExecutionOutcome, IllegalTransition, MtfAudit, MtfLock, MtfRun, MtfRunMetric,
    MtfRunSymbol, MtfState, MtfSwitch, OrderIntent, OrderPlan, OrderProtection, RiskParams,
    SwitchScope, TimeframeSlot, TradeLifecycleEvent, TradeZoneEvent,
};
pub use enums::{
    AuditCategory, AuditSeverity, BlacklistReason, CooldownReason, IntentStatus, OrderType,
    PlanStatus, ProtectionKind, RunStatus, Side, SkipReason, SymbolOutcome, Timeframe, ZoneStatus,
};
pub use traits::{
    AuditRepository, ContractSpecProvider, CooldownRepository, EntryZoneRepository,
    ExecutionClient, LockRepository, MarketDataProvider, OrderIntentRepository,
    OrderPlanRepository, RunRepository, StateRepository, SwitchRepository, ValidationCacheStore,
};
pub use value_objects::{ContractSpec, QuantizationIssue, TimeframeSignal};
