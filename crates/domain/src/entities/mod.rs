//! 业务实体

pub mod audit;
pub mod cooldown;
pub mod entry_zone;
pub mod lock;
pub mod mtf_state;
pub mod order_intent;
pub mod order_plan;
pub mod run;
pub mod switch;

pub use audit::{MtfAudit, TradeLifecycleEvent, TradeZoneEvent};
pub use cooldown::{BlacklistedContract, ContractCooldown, ExclusionReason};
pub use entry_zone::EntryZoneLive;
pub use lock::{AcquireOutcome, MtfLock};
pub use mtf_state::{MtfState, TimeframeSlot};
pub use order_intent::{IllegalTransition, OrderIntent, OrderProtection};
pub use order_plan::{DecisionContext, ExecutionOutcome, OrderPlan, RiskParams};
pub use run::{MtfRun, MtfRunMetric, MtfRunSymbol};
pub use switch::{MtfSwitch, SwitchScope};
