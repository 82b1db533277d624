//! 基础设施层
//!
//! 领域仓储接口的三类实现：
//! - `repositories`：sqlx + MySQL 持久化实现
//! - `memory`：dashmap 内存实现（测试与 dry-run）
//! - `cache`：校验结果 TTL 缓存（内存 / Redis）

pub mod cache;
pub mod memory;
pub mod repositories;

pub use cache::{InMemoryValidationCache, RedisValidationCache};
pub use memory::{
    InMemoryAuditRepository, InMemoryCooldownRepository, InMemoryEntryZoneRepository,
    InMemoryLockRepository, InMemoryOrderIntentRepository, InMemoryOrderPlanRepository,
    InMemoryRunRepository, InMemoryStateRepository, InMemorySwitchRepository,
};
pub use repositories::{
    SqlxAuditRepository, SqlxContractSpecProvider, SqlxCooldownRepository,
    SqlxEntryZoneRepository, SqlxLockRepository, SqlxMarketDataProvider,
    SqlxOrderIntentRepository, SqlxOrderPlanRepository, SqlxRunRepository, SqlxStateRepository,
    SqlxSwitchRepository,
};
