//! 运行编排端到端测试（全内存依赖）

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;

use mtf_engine_core::error::EngineError;
use mtf_engine_domain::traits::{
    ContractSpecProvider, ExecutionClient, LockRepository, MarketDataProvider, RunRepository,
    SwitchRepository,
};
use mtf_engine_domain::{
    ContractSpec, MtfSwitch, OrderIntent, RunStatus, Side, SkipReason, SwitchScope, SymbolOutcome,
    Timeframe, TimeframeSignal,
};
use mtf_engine_infrastructure::{
    InMemoryAuditRepository, InMemoryCooldownRepository, InMemoryEntryZoneRepository,
    InMemoryLockRepository, InMemoryOrderIntentRepository, InMemoryOrderPlanRepository,
    InMemoryRunRepository, InMemoryStateRepository, InMemorySwitchRepository,
    InMemoryValidationCache,
};
use mtf_engine_orchestration::RunOrchestrator;
use mtf_engine_services::{
    BlacklistGate, CascadeValidator, CooldownGate, EntryZoneService, GateChain, LockManager,
    OrderIntentService, OrderPlanner, PlannerConfig, SwitchGate, ZoneProfile,
};

struct StubMarket {
    signals: DashMap<(String, Timeframe), TimeframeSignal>,
}

impl StubMarket {
    fn new() -> Self {
        Self {
            signals: DashMap::new(),
        }
    }

    fn set(&self, symbol: &str, tf: Timeframe, candle_ts: i64, side: Option<Side>) {
        self.signals.insert(
            (symbol.to_string(), tf),
            TimeframeSignal {
                candle_ts,
                side,
                price: 50_000.0,
                atr: 300.0,
                atr_pct: 0.6,
                volume_ratio: 1.2,
                vwap: 50_010.0,
            },
        );
    }

    fn set_all(&self, symbol: &str, candle_ts: i64, side: Side) {
        for tf in Timeframe::CASCADE {
            self.set(symbol, tf, candle_ts, Some(side));
        }
    }
}

#[async_trait]
impl MarketDataProvider for StubMarket {
    async fn signal(&self, symbol: &str, tf: Timeframe) -> Result<Option<TimeframeSignal>> {
        Ok(self
            .signals
            .get(&(symbol.to_string(), tf))
            .map(|s| s.clone()))
    }
}

struct StubSpecs;

#[async_trait]
impl ContractSpecProvider for StubSpecs {
    async fn spec(&self, symbol: &str) -> Result<Option<ContractSpec>> {
        Ok(Some(ContractSpec {
            symbol: symbol.to_string(),
            tick_size: 0.1,
            step_size: 0.0001,
            min_notional: 10.0,
            max_leverage: 20,
        }))
    }
}

struct StubExecution;

#[async_trait]
impl ExecutionClient for StubExecution {
    async fn submit(&self, intent: &OrderIntent) -> Result<String> {
        Ok(format!("okx-{}", &intent.client_order_id[..8]))
    }
}

struct Fixture {
    market: Arc<StubMarket>,
    switches: Arc<InMemorySwitchRepository>,
    locks: Arc<InMemoryLockRepository>,
    runs: Arc<InMemoryRunRepository>,
    audits: Arc<InMemoryAuditRepository>,
    orchestrator: RunOrchestrator,
}

fn fixture(dry_run: bool) -> Fixture {
    let market = Arc::new(StubMarket::new());
    let switches = Arc::new(InMemorySwitchRepository::new());
    let cooldowns = Arc::new(InMemoryCooldownRepository::new());
    let locks = Arc::new(InMemoryLockRepository::new());
    let runs = Arc::new(InMemoryRunRepository::new());
    let audits = Arc::new(InMemoryAuditRepository::new());
    let states = Arc::new(InMemoryStateRepository::new());
    let zones = Arc::new(InMemoryEntryZoneRepository::new());

    let gates = Arc::new(GateChain::new(vec![
        Box::new(SwitchGate::new(switches.clone(), false)),
        Box::new(BlacklistGate::new(cooldowns.clone())),
        Box::new(CooldownGate::new(cooldowns)),
    ]));
    let lock_manager = Arc::new(LockManager::new(locks.clone(), "test-runner"));
    let validator = Arc::new(CascadeValidator::new(
        market.clone(),
        states,
        Arc::new(InMemoryValidationCache::new()),
        audits.clone(),
        Arc::new(SwitchGate::new(switches.clone(), false)),
    ));
    let zone_service = Arc::new(EntryZoneService::new(
        zones,
        audits.clone(),
        ZoneProfile::default(),
    ));
    let intent_service = Arc::new(OrderIntentService::new(
        Arc::new(InMemoryOrderIntentRepository::new()),
        audits.clone(),
        Arc::new(StubSpecs),
        Arc::new(StubExecution),
        dry_run,
    ));
    let planner = Arc::new(OrderPlanner::new(
        Arc::new(InMemoryOrderPlanRepository::new()),
        intent_service,
        PlannerConfig::default(),
    ));

    let orchestrator = RunOrchestrator::new(
        runs.clone(),
        audits.clone(),
        gates,
        lock_manager,
        validator,
        zone_service,
        planner,
        4,
    );

    Fixture {
        market,
        switches,
        locks,
        runs,
        audits,
        orchestrator,
    }
}

fn symbols(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_successful_run_produces_orders_and_rate() {
    let f = fixture(false);
    f.market.set_all("BTC-USDT", 1_000, Side::Long);
    f.market.set_all("ETH-USDT", 1_000, Side::Short);

    let run = f
        .orchestrator
        .start_run(&symbols(&["BTC-USDT", "ETH-USDT"]), false, false)
        .await
        .unwrap();

    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.symbols_processed, 2);
    assert_eq!(run.symbols_successful, 2);
    assert!((run.success_rate - 1.0).abs() < f64::EPSILON);

    let rows = f.runs.list_run_symbols(&run.run_id).await.unwrap();
    assert_eq!(rows.len(), 2);
    for row in &rows {
        assert_eq!(row.outcome, SymbolOutcome::Success);
        assert_eq!(row.execution_tf, Some(Timeframe::M5));
        assert!(row.context["client_order_id"].is_string());
    }

    // 运行首尾各一条审计
    let audits = f.audits.audits_snapshot();
    assert!(audits.iter().any(|a| a.event == "run_started"));
    assert!(audits.iter().any(|a| a.event == "run_finished"));

    // 指标已落库
    assert!(!f.runs.metrics_snapshot().is_empty());

    // 运行锁已释放
    assert!(f.locks.list_active().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_global_switch_off_skips_everything() {
    let f = fixture(false);
    f.market.set_all("BTC-USDT", 1_000, Side::Long);
    f.switches
        .set(&MtfSwitch::new(SwitchScope::Global, false, None))
        .await
        .unwrap();

    let run = f
        .orchestrator
        .start_run(&symbols(&["BTC-USDT", "ETH-USDT"]), false, false)
        .await
        .unwrap();

    assert_eq!(run.symbols_skipped, 2);
    assert_eq!(run.symbols_successful, 0);

    let rows = f.runs.list_run_symbols(&run.run_id).await.unwrap();
    assert!(rows
        .iter()
        .all(|r| r.skip_reason == Some(SkipReason::SwitchOff)));
}

#[tokio::test]
async fn test_timeframe_switch_blocks_run_without_orders() {
    let f = fixture(false);
    f.market.set_all("BTC-USDT", 1_000, Side::Long);
    f.switches
        .set(&MtfSwitch::new(
            SwitchScope::SymbolTf("BTC-USDT".to_string(), Timeframe::M5),
            false,
            None,
        ))
        .await
        .unwrap();

    let run = f
        .orchestrator
        .start_run(&symbols(&["BTC-USDT"]), false, false)
        .await
        .unwrap();

    assert_eq!(run.symbols_successful, 0);
    let rows = f.runs.list_run_symbols(&run.run_id).await.unwrap();
    assert_eq!(rows[0].outcome, SymbolOutcome::Blocked);
    assert_eq!(rows[0].blocking_tf, Some(Timeframe::M5));

    // 关停的周期不产生任何订单事件
    assert!(f.audits.lifecycle_events_snapshot().is_empty());
}

#[tokio::test]
async fn test_blocked_symbol_records_blocking_tf() {
    let f = fixture(false);
    f.market.set_all("BTC-USDT", 1_000, Side::Long);
    // 5m 没有方向
    f.market.set("BTC-USDT", Timeframe::M5, 1_000, None);

    let run = f
        .orchestrator
        .start_run(&symbols(&["BTC-USDT"]), false, false)
        .await
        .unwrap();

    assert_eq!(run.symbols_successful, 0);
    let rows = f.runs.list_run_symbols(&run.run_id).await.unwrap();
    assert_eq!(rows[0].outcome, SymbolOutcome::Blocked);
    assert_eq!(rows[0].blocking_tf, Some(Timeframe::M5));

    // Blocked 不计入成功率分子
    assert_eq!(run.symbols_processed, 1);
    assert!((run.success_rate - 0.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_missing_data_counts_as_failure() {
    let f = fixture(false);
    // BTC 完整，ETH 没有任何快照
    f.market.set_all("BTC-USDT", 1_000, Side::Long);

    let run = f
        .orchestrator
        .start_run(&symbols(&["BTC-USDT", "ETH-USDT"]), false, false)
        .await
        .unwrap();

    assert_eq!(run.symbols_successful, 1);
    assert_eq!(run.symbols_failed, 1);
    assert!((run.success_rate - 0.5).abs() < f64::EPSILON);

    let rows = f.runs.list_run_symbols(&run.run_id).await.unwrap();
    let failed = rows.iter().find(|r| r.symbol == "ETH-USDT").unwrap();
    assert_eq!(failed.outcome, SymbolOutcome::Failed);
    assert!(failed.error.as_deref().unwrap().contains("missing market data"));
}

#[tokio::test]
async fn test_run_lock_busy_aborts_before_start() {
    let f = fixture(false);
    f.market.set_all("BTC-USDT", 1_000, Side::Long);

    // 另一个进程持有运行锁
    let other = LockManager::new(f.locks.clone(), "other-runner");
    assert!(other.acquire_run_lock(false).await.unwrap().is_acquired());

    let err = f
        .orchestrator
        .start_run(&symbols(&["BTC-USDT"]), false, false)
        .await
        .unwrap_err();
    match err.downcast_ref::<EngineError>() {
        Some(EngineError::RunLockBusy { holder }) => assert_eq!(holder, "other-runner"),
        other => panic!("expected RunLockBusy, got {:?}", other),
    }

    // force 模式抢占后正常运行
    let run = f
        .orchestrator
        .start_run(&symbols(&["BTC-USDT"]), false, true)
        .await
        .unwrap();
    assert_eq!(run.symbols_successful, 1);
    assert!(run.force_run);
}

/// 第一次行情拉取时抢占运行锁，模拟运行中途失去持有权
struct LockStealingMarket {
    inner: Arc<StubMarket>,
    locks: Arc<InMemoryLockRepository>,
    stolen: std::sync::atomic::AtomicBool,
}

#[async_trait]
impl MarketDataProvider for LockStealingMarket {
    async fn signal(&self, symbol: &str, tf: Timeframe) -> Result<Option<TimeframeSignal>> {
        if !self.stolen.swap(true, std::sync::atomic::Ordering::SeqCst) {
            let thief = LockManager::new(self.locks.clone(), "thief");
            assert!(thief.acquire_run_lock(true).await?.is_acquired());
        }
        self.inner.signal(symbol, tf).await
    }
}

#[tokio::test]
async fn test_lost_run_lock_stops_scheduling_but_finishes_in_flight() {
    let stub = Arc::new(StubMarket::new());
    stub.set_all("BTC-USDT", 1_000, Side::Long);
    stub.set_all("ETH-USDT", 1_000, Side::Long);

    let cooldowns = Arc::new(InMemoryCooldownRepository::new());
    let locks = Arc::new(InMemoryLockRepository::new());
    let runs = Arc::new(InMemoryRunRepository::new());
    let audits = Arc::new(InMemoryAuditRepository::new());
    let market = Arc::new(LockStealingMarket {
        inner: stub,
        locks: locks.clone(),
        stolen: std::sync::atomic::AtomicBool::new(false),
    });

    let switches = Arc::new(InMemorySwitchRepository::new());
    let gates = Arc::new(GateChain::new(vec![
        Box::new(SwitchGate::new(switches.clone(), false)),
        Box::new(BlacklistGate::new(cooldowns.clone())),
        Box::new(CooldownGate::new(cooldowns)),
    ]));
    let validator = Arc::new(CascadeValidator::new(
        market,
        Arc::new(InMemoryStateRepository::new()),
        Arc::new(InMemoryValidationCache::new()),
        audits.clone(),
        Arc::new(SwitchGate::new(switches, false)),
    ));
    let zone_service = Arc::new(EntryZoneService::new(
        Arc::new(InMemoryEntryZoneRepository::new()),
        audits.clone(),
        ZoneProfile::default(),
    ));
    let intent_service = Arc::new(OrderIntentService::new(
        Arc::new(InMemoryOrderIntentRepository::new()),
        audits.clone(),
        Arc::new(StubSpecs),
        Arc::new(StubExecution),
        false,
    ));
    let planner = Arc::new(OrderPlanner::new(
        Arc::new(InMemoryOrderPlanRepository::new()),
        intent_service,
        PlannerConfig::default(),
    ));

    // 单并发保证第二个交易对在抢占之后才开始
    let orchestrator = RunOrchestrator::new(
        runs.clone(),
        audits,
        gates,
        Arc::new(LockManager::new(locks.clone(), "test-runner")),
        validator,
        zone_service,
        planner,
        1,
    );

    let run = orchestrator
        .start_run(&symbols(&["BTC-USDT", "ETH-USDT"]), false, false)
        .await
        .unwrap();

    // 先开始的交易对跑完，后面的不再处理
    assert_eq!(run.symbols_processed, 2);
    assert_eq!(run.symbols_successful, 1);
    assert_eq!(run.symbols_skipped, 1);

    let rows = runs.list_run_symbols(&run.run_id).await.unwrap();
    let skipped = rows
        .iter()
        .find(|r| r.outcome == SymbolOutcome::Skipped)
        .unwrap();
    assert_eq!(skipped.skip_reason, Some(SkipReason::LockBusy));
    assert_eq!(skipped.context["run_lock"], "lost");

    // 锁仍在抢占者手里，收尾释放对它是无操作
    let active = locks.list_active().await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].owner_id, "thief");
}

#[tokio::test]
async fn test_dry_run_produces_no_sent_orders() {
    let f = fixture(true);
    f.market.set_all("BTC-USDT", 1_000, Side::Long);

    let run = f
        .orchestrator
        .start_run(&symbols(&["BTC-USDT"]), true, false)
        .await
        .unwrap();

    assert!(run.dry_run);
    assert_eq!(run.symbols_successful, 1);

    let rows = f.runs.list_run_symbols(&run.run_id).await.unwrap();
    assert_eq!(rows[0].context["intent_status"], "READY_TO_SEND");

    // 没有任何 SENT 生命周期事件
    assert!(!f
        .audits
        .lifecycle_events_snapshot()
        .iter()
        .any(|e| e.to_status == "SENT"));
}
