//! 数据库仓储实现 (sqlx + MySQL)

pub mod audit_repository;
pub mod cooldown_repository;
pub mod entry_zone_repository;
pub mod lock_repository;
pub mod market_provider;
pub mod order_repository;
pub mod run_repository;
pub mod state_repository;
pub mod switch_repository;

pub use audit_repository::SqlxAuditRepository;
pub use cooldown_repository::SqlxCooldownRepository;
pub use entry_zone_repository::SqlxEntryZoneRepository;
pub use lock_repository::SqlxLockRepository;
pub use market_provider::{SqlxContractSpecProvider, SqlxMarketDataProvider};
pub use order_repository::{SqlxOrderIntentRepository, SqlxOrderPlanRepository};
pub use run_repository::SqlxRunRepository;
pub use state_repository::SqlxStateRepository;
pub use switch_repository::SqlxSwitchRepository;
