//! 服务层
//!
//! 引擎的业务动作：门控、锁、级联校验、入场区间、订单意图与计划。
//! 全部面向 domain 的仓储/协作方接口编程，不感知存储后端。

pub mod gate;
pub mod lock;
pub mod order;
pub mod validation;
pub mod zone;

pub use gate::{BlacklistGate, CooldownGate, Gate, GateChain, GateDecision, SwitchGate};
pub use lock::LockManager;
pub use order::{OrderIntentService, OrderPlanner, PlannerConfig};
pub use validation::{CascadeOutcome, CascadeStatus, CascadeValidator, EXECUTION_TF};
pub use zone::{EntryZoneService, ZoneProfile};
