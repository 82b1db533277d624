//! 内存仓储实现
//!
//! 供测试与 dry-run 使用；锁仓储的原子语义与 SQL 实现一致。

pub mod gate_repositories;
pub mod lock_repository;
pub mod order_repositories;
pub mod run_repository;
pub mod state_repository;

pub use gate_repositories::{InMemoryCooldownRepository, InMemorySwitchRepository};
pub use lock_repository::InMemoryLockRepository;
pub use order_repositories::{
    InMemoryEntryZoneRepository, InMemoryOrderIntentRepository, InMemoryOrderPlanRepository,
};
pub use run_repository::{InMemoryAuditRepository, InMemoryRunRepository};
pub use state_repository::InMemoryStateRepository;
