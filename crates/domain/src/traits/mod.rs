//! 领域接口

pub mod collaborator_trait;
pub mod repository_trait;

pub use collaborator_trait::{ContractSpecProvider, ExecutionClient, MarketDataProvider};
pub use repository_trait::{
    AuditRepository, CooldownRepository, EntryZoneRepository, LockRepository,
    OrderIntentRepository, OrderPlanRepository, RunRepository, StateRepository, SwitchRepository,
    ValidationCacheStore,
};
