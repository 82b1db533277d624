//! 仓储接口 - 数据访问抽象
//!
//! infrastructure 层提供 sqlx 与内存两套实现；
//! 锁仓储要求底层存储对键提供原子比较交换语义。

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::entities::{
    AcquireOutcome, BlacklistedContract, ContractCooldown, EntryZoneLive, MtfLock, MtfRun,
    MtfRunMetric, MtfRunSymbol, MtfState, MtfSwitch, OrderIntent, OrderPlan, SwitchScope,
};
use crate::enums::Side;

/// 多周期状态仓储
#[async_trait]
pub trait StateRepository: Send + Sync {
    async fn get(&self, symbol: &str) -> Result<Option<MtfState>>;

    /// 覆盖写入整行（状态只由校验步骤更新，从不删除）
    async fn upsert(&self, state: &MtfState) -> Result<()>;
}

/// 租约锁仓储
///
/// `try_acquire` 必须是原子的：同一作用域上并发调用，至多一个成功。
#[async_trait]
pub trait LockRepository: Send + Sync {
    /// 无行或行已过期则拿锁（可抢占过期租约），否则返回 Busy
    async fn try_acquire(
        &self,
        scope: &str,
        owner_id: &str,
        lease: Duration,
    ) -> Result<AcquireOutcome>;

    /// 仅当仍是记录中的持有者时删除；非持有者调用是无操作，返回 false
    async fn release(&self, scope: &str, owner_id: &str) -> Result<bool>;

    /// 续租；持有权已丢失返回 false
    async fn renew(&self, scope: &str, owner_id: &str, new_expiry: DateTime<Utc>) -> Result<bool>;

    async fn get(&self, scope: &str) -> Result<Option<MtfLock>>;

    async fn list_active(&self) -> Result<Vec<MtfLock>>;
}

/// 开关仓储
#[async_trait]
pub trait SwitchRepository: Send + Sync {
    async fn get(&self, scope: &SwitchScope) -> Result<Option<MtfSwitch>>;

    async fn set(&self, switch: &MtfSwitch) -> Result<()>;

    async fn clear(&self, scope: &SwitchScope) -> Result<()>;

    async fn list(&self) -> Result<Vec<MtfSwitch>>;
}

/// 冷却 / 黑名单仓储
#[async_trait]
pub trait CooldownRepository: Send + Sync {
    async fn find_cooldown(&self, symbol: &str) -> Result<Option<ContractCooldown>>;

    /// 存在则原地续期，否则创建（幂等）
    async fn upsert_cooldown(&self, cooldown: &ContractCooldown) -> Result<()>;

    async fn clear_cooldown(&self, symbol: &str) -> Result<()>;

    async fn find_blacklist(&self, symbol: &str) -> Result<Option<BlacklistedContract>>;

    async fn add_blacklist(&self, entry: &BlacklistedContract) -> Result<()>;

    async fn list_cooldowns(&self) -> Result<Vec<ContractCooldown>>;

    async fn list_blacklist(&self) -> Result<Vec<BlacklistedContract>>;
}

/// 运行仓储（运行行 + 每交易对结果 + 性能指标）
#[async_trait]
pub trait RunRepository: Send + Sync {
    async fn insert_run(&self, run: &MtfRun) -> Result<()>;

    async fn update_run(&self, run: &MtfRun) -> Result<()>;

    async fn get_run(&self, run_id: &str) -> Result<Option<MtfRun>>;

    /// 每 (run, symbol) 只写一次
    async fn insert_run_symbol(&self, row: &MtfRunSymbol) -> Result<()>;

    async fn list_run_symbols(&self, run_id: &str) -> Result<Vec<MtfRunSymbol>>;

    /// 批量写入指标
    async fn insert_metrics(&self, metrics: &[MtfRunMetric]) -> Result<u64>;
}

/// 审计仓储（只追加）
#[async_trait]
pub trait AuditRepository: Send + Sync {
    async fn insert_audits(&self, rows: &[crate::entities::MtfAudit]) -> Result<u64>;

    async fn insert_zone_events(&self, rows: &[crate::entities::TradeZoneEvent]) -> Result<u64>;

    async fn insert_lifecycle_events(
        &self,
        rows: &[crate::entities::TradeLifecycleEvent],
    ) -> Result<u64>;
}

/// 入场区间仓储（只插入新行，旧行被标记取代）
#[async_trait]
pub trait EntryZoneRepository: Send + Sync {
    /// 插入新区间并把同 symbol+side 的旧区间标记为 Superseded
    async fn insert_superseding(&self, zone: &EntryZoneLive) -> Result<()>;

    async fn latest(&self, symbol: &str, side: Side) -> Result<Option<EntryZoneLive>>;
}

/// 订单意图仓储
#[async_trait]
pub trait OrderIntentRepository: Send + Sync {
    async fn insert(&self, intent: &OrderIntent) -> Result<()>;

    async fn update(&self, intent: &OrderIntent) -> Result<()>;

    async fn find_by_client_order_id(&self, client_order_id: &str) -> Result<Option<OrderIntent>>;

    /// 删除意图并级联删除其保护单
    async fn delete(&self, client_order_id: &str) -> Result<()>;
}

/// 订单计划仓储
#[async_trait]
pub trait OrderPlanRepository: Send + Sync {
    async fn insert(&self, plan: &OrderPlan) -> Result<i64>;

    async fn update(&self, id: i64, plan: &OrderPlan) -> Result<()>;
}

/// 校验结果缓存（TTL 键值，惰性过期）
#[async_trait]
pub trait ValidationCacheStore: Send + Sync {
    /// 过期条目视为未命中
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>>;

    /// 无条件覆盖写入
    async fn put(&self, key: &str, payload: &serde_json::Value, ttl_secs: u64) -> Result<()>;
}
