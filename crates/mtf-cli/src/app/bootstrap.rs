//! 应用启动引导
//!
//! 启动顺序：dotenv → 日志 → 数据库连接池 → (可选) Redis 连接池。
//! 引擎装配全部走 sqlx 仓储；校验缓存后端由
//! `VALIDATION_CACHE_BACKEND` 选择（memory / redis，默认 memory）。

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use mtf_engine_core::cache::init_redis_pool;
use mtf_engine_core::config::environment::{env_or_default, switch_fail_closed};
use mtf_engine_core::database::{get_db_pool, health_check, init_db_pool};
use mtf_engine_core::logger::{init_logger, WorkerGuard};
use mtf_engine_domain::traits::{ExecutionClient, ValidationCacheStore};
use mtf_engine_domain::OrderIntent;
use mtf_engine_infrastructure::{
    InMemoryValidationCache, RedisValidationCache, SqlxAuditRepository, SqlxContractSpecProvider,
    SqlxCooldownRepository, SqlxEntryZoneRepository, SqlxLockRepository, SqlxMarketDataProvider,
    SqlxOrderIntentRepository, SqlxOrderPlanRepository, SqlxRunRepository, SqlxStateRepository,
    SqlxSwitchRepository,
};
use mtf_engine_orchestration::RunOrchestrator;
use mtf_engine_services::{
    BlacklistGate, CascadeValidator, CooldownGate, EntryZoneService, GateChain, LockManager,
    OrderIntentService, OrderPlanner, PlannerConfig, SwitchGate, ZoneProfile,
};

/// 初始化运行环境；返回的日志 guard 需持有到进程结束
pub async fn app_init() -> Result<Option<WorkerGuard>> {
    dotenv::dotenv().ok();
    let guard = init_logger()?;

    init_db_pool().await?;
    health_check().await?;

    if cache_backend() == "redis" {
        init_redis_pool().await?;
    }

    info!("mtf-cli initialized");
    Ok(guard)
}

fn cache_backend() -> String {
    env_or_default("VALIDATION_CACHE_BACKEND", "memory").to_lowercase()
}

fn validation_cache() -> Arc<dyn ValidationCacheStore> {
    if cache_backend() == "redis" {
        Arc::new(RedisValidationCache::new("mtf"))
    } else {
        Arc::new(InMemoryValidationCache::new())
    }
}

/// 未接入真实交易所时的执行客户端占位：到达提交一律报错。
/// 只有 dry-run 不经过它。
struct UnconfiguredExecutionClient;

#[async_trait]
impl ExecutionClient for UnconfiguredExecutionClient {
    async fn submit(&self, intent: &OrderIntent) -> Result<String> {
        anyhow::bail!(
            "execution client not configured, refusing to send {} (use --dry-run)",
            intent.client_order_id
        )
    }
}

/// 用 sqlx 仓储装配完整的运行编排器
pub fn build_orchestrator(dry_run: bool, workers: usize) -> Result<RunOrchestrator> {
    let pool = get_db_pool()?.clone();

    let switches = Arc::new(SqlxSwitchRepository::new(pool.clone()));
    let cooldowns = Arc::new(SqlxCooldownRepository::new(pool.clone()));
    let audits = Arc::new(SqlxAuditRepository::new(pool.clone()));
    let runs = Arc::new(SqlxRunRepository::new(pool.clone()));

    let fail_closed = switch_fail_closed();
    let gates = Arc::new(GateChain::new(vec![
        Box::new(SwitchGate::new(switches.clone(), fail_closed)),
        Box::new(BlacklistGate::new(cooldowns.clone())),
        Box::new(CooldownGate::new(cooldowns)),
    ]));

    let owner_id = format!("mtf-cli-{}", Uuid::new_v4());
    let locks = Arc::new(LockManager::new(
        Arc::new(SqlxLockRepository::new(pool.clone())),
        &owner_id,
    ));

    let validator = Arc::new(CascadeValidator::new(
        Arc::new(SqlxMarketDataProvider::new(pool.clone())),
        Arc::new(SqlxStateRepository::new(pool.clone())),
        validation_cache(),
        audits.clone(),
        Arc::new(SwitchGate::new(switches, fail_closed)),
    ));

    let zones = Arc::new(EntryZoneService::new(
        Arc::new(SqlxEntryZoneRepository::new(pool.clone())),
        audits.clone(),
        ZoneProfile::default(),
    ));

    let intent_service = Arc::new(OrderIntentService::new(
        Arc::new(SqlxOrderIntentRepository::new(pool.clone())),
        audits.clone(),
        Arc::new(SqlxContractSpecProvider::new(pool.clone())),
        Arc::new(UnconfiguredExecutionClient),
        dry_run,
    ));
    let planner = Arc::new(OrderPlanner::new(
        Arc::new(SqlxOrderPlanRepository::new(pool)),
        intent_service,
        PlannerConfig::default(),
    ));

    Ok(RunOrchestrator::new(
        runs, audits, gates, locks, validator, zones, planner, workers,
    ))
}
