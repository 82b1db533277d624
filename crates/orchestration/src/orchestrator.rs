//! 运行编排器 (RunOrchestrator)
//!
//! 一次运行 = 运行级锁内对一批交易对的有界并发处理：
//! 门控 → 交易对锁 → 级联校验 → 入场区间 → 订单计划。
//! 每个交易对独立收尾，单个失败不影响其他交易对；
//! 运行行、逐交易对结果与指标在收尾时聚合落库。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use mtf_engine_core::error::EngineError;
use mtf_engine_domain::traits::{AuditRepository, RunRepository};
use mtf_engine_domain::{
    AcquireOutcome, AuditCategory, AuditSeverity, MtfAudit, MtfRun, MtfRunSymbol, RunStatus,
    SkipReason, SymbolOutcome,
};
use mtf_engine_services::{
    CascadeStatus, CascadeValidator, EntryZoneService, GateChain, GateDecision, LockManager,
    OrderPlanner, EXECUTION_TF,
};

use crate::metrics::MetricsRecorder;

pub struct RunOrchestrator {
    runs: Arc<dyn RunRepository>,
    audits: Arc<dyn AuditRepository>,
    gates: Arc<GateChain>,
    locks: Arc<LockManager>,
    validator: Arc<CascadeValidator>,
    zones: Arc<EntryZoneService>,
    planner: Arc<OrderPlanner>,
    /// 同时处理的交易对上限
    max_parallel: usize,
}

impl RunOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        runs: Arc<dyn RunRepository>,
        audits: Arc<dyn AuditRepository>,
        gates: Arc<GateChain>,
        locks: Arc<LockManager>,
        validator: Arc<CascadeValidator>,
        zones: Arc<EntryZoneService>,
        planner: Arc<OrderPlanner>,
        max_parallel: usize,
    ) -> Self {
        Self {
            runs,
            audits,
            gates,
            locks,
            validator,
            zones,
            planner,
            max_parallel: max_parallel.max(1),
        }
    }

    /// 执行一次完整运行；运行级锁被占用时在开始前中止
    pub async fn start_run(
        &self,
        symbols: &[String],
        dry_run: bool,
        force: bool,
    ) -> Result<MtfRun> {
        match self.locks.acquire_run_lock(force).await? {
            AcquireOutcome::Acquired(_) => {}
            AcquireOutcome::Busy { holder } => {
                warn!("Run aborted, lock held by {}", holder);
                return Err(EngineError::RunLockBusy { holder }.into());
            }
        }

        let result = self.drive(symbols, dry_run, force).await;
        if let Err(e) = self.locks.release_run_lock().await {
            error!("Failed to release run lock: {}", e);
        }
        result
    }

    async fn drive(&self, symbols: &[String], dry_run: bool, force: bool) -> Result<MtfRun> {
        let mut run = MtfRun::new(symbols.len() as u32, dry_run, force);
        self.runs.insert_run(&run).await?;
        info!(
            "Run started: run_id={}, symbols={}, dry_run={}, max_parallel={}",
            run.run_id,
            symbols.len(),
            dry_run,
            self.max_parallel
        );
        self.audits
            .insert_audits(&[MtfAudit::new(
                "*",
                AuditCategory::Run,
                AuditSeverity::Info,
                "run_started",
            )
            .with_run(&run.run_id)
            .with_details(serde_json::json!({
                "symbols_requested": symbols.len(),
                "dry_run": dry_run,
                "force": force,
            }))])
            .await?;

        let metrics = Arc::new(MetricsRecorder::new(&run.run_id));
        let worker = Arc::new(SymbolWorker {
            run_id: run.run_id.clone(),
            runs: self.runs.clone(),
            gates: self.gates.clone(),
            locks: self.locks.clone(),
            validator: self.validator.clone(),
            zones: self.zones.clone(),
            planner: self.planner.clone(),
            metrics: metrics.clone(),
            aborted: Arc::new(AtomicBool::new(false)),
        });

        let semaphore = Arc::new(Semaphore::new(self.max_parallel));
        let mut tasks: JoinSet<SymbolOutcome> = JoinSet::new();
        for symbol in symbols {
            let worker = worker.clone();
            let semaphore = semaphore.clone();
            let symbol = symbol.clone();
            tasks.spawn(async move {
                // 信号量获取失败只在运行被整体关停时发生
                let _permit = match semaphore.acquire_owned().await {
                    Ok(p) => p,
                    Err(_) => return SymbolOutcome::Failed,
                };
                worker.process(&symbol).await
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => run.record_outcome(outcome),
                Err(e) => {
                    error!("Symbol worker panicked: {}", e);
                    run.record_outcome(SymbolOutcome::Failed);
                }
            }
        }

        run.finish(RunStatus::Completed);
        self.runs.update_run(&run).await?;
        metrics.flush(self.runs.as_ref()).await?;
        self.audits
            .insert_audits(&[MtfAudit::new(
                "*",
                AuditCategory::Run,
                AuditSeverity::Info,
                "run_finished",
            )
            .with_run(&run.run_id)
            .with_details(serde_json::json!({
                "processed": run.symbols_processed,
                "successful": run.symbols_successful,
                "failed": run.symbols_failed,
                "skipped": run.symbols_skipped,
                "success_rate": run.success_rate,
            }))])
            .await?;
        info!(
            "Run finished: run_id={}, success_rate={:.2}",
            run.run_id, run.success_rate
        );

        Ok(run)
    }
}

/// 单交易对处理单元；错误不外抛，全部折叠进结果行
struct SymbolWorker {
    run_id: String,
    runs: Arc<dyn RunRepository>,
    gates: Arc<GateChain>,
    locks: Arc<LockManager>,
    validator: Arc<CascadeValidator>,
    zones: Arc<EntryZoneService>,
    planner: Arc<OrderPlanner>,
    metrics: Arc<MetricsRecorder>,
    /// 运行级锁丢失后置位；已开始的交易对跑完，未开始的不再处理
    aborted: Arc<AtomicBool>,
}

impl SymbolWorker {
    async fn process(&self, symbol: &str) -> SymbolOutcome {
        let started = Instant::now();
        let mut row = if self.run_lock_lost(symbol).await {
            let mut row = MtfRunSymbol::new(&self.run_id, symbol, SymbolOutcome::Skipped);
            row.skip_reason = Some(SkipReason::LockBusy);
            row.context = serde_json::json!({ "run_lock": "lost" });
            row
        } else {
            match self.process_inner(symbol).await {
                Ok(row) => row,
                Err(e) => {
                    error!("Symbol processing error: symbol={}, error={}", symbol, e);
                    let mut row = MtfRunSymbol::new(&self.run_id, symbol, SymbolOutcome::Failed);
                    row.error = Some(e.to_string());
                    row
                }
            }
        };
        row.duration_ms = started.elapsed().as_millis() as i64;
        self.metrics
            .record("symbol", "process", Some(symbol), None, row.duration_ms);

        let outcome = row.outcome;
        if let Err(e) = self.runs.insert_run_symbol(&row).await {
            error!("Failed to persist run symbol row: symbol={}, error={}", symbol, e);
        }
        outcome
    }

    /// 开始处理前续租运行级锁；续租失败说明锁已被抢占或过期
    async fn run_lock_lost(&self, symbol: &str) -> bool {
        if self.aborted.load(Ordering::Relaxed) {
            return true;
        }
        match self.locks.renew_run_lock().await {
            Ok(true) => false,
            Ok(false) => {
                warn!("Run lock lost, not scheduling further symbols: symbol={}", symbol);
                self.aborted.store(true, Ordering::Relaxed);
                true
            }
            Err(e) => {
                // 存储层瞬时错误不等于失去持有权
                warn!("Run lock renew failed: symbol={}, error={}", symbol, e);
                false
            }
        }
    }

    async fn process_inner(&self, symbol: &str) -> Result<MtfRunSymbol> {
        if let GateDecision::Skip(reason) = self.gates.check(symbol, None).await? {
            let mut row = MtfRunSymbol::new(&self.run_id, symbol, SymbolOutcome::Skipped);
            row.skip_reason = Some(reason);
            return Ok(row);
        }

        if let AcquireOutcome::Busy { holder } = self.locks.acquire_symbol_lock(symbol).await? {
            let mut row = MtfRunSymbol::new(&self.run_id, symbol, SymbolOutcome::Skipped);
            row.skip_reason = Some(SkipReason::LockBusy);
            row.context = serde_json::json!({ "holder": holder });
            return Ok(row);
        }

        let result = self.process_locked(symbol).await;
        if let Err(e) = self.locks.release_symbol_lock(symbol).await {
            error!("Failed to release symbol lock: symbol={}, error={}", symbol, e);
        }
        result
    }

    async fn process_locked(&self, symbol: &str) -> Result<MtfRunSymbol> {
        let cascade_started = Instant::now();
        let outcome = self.validator.validate_symbol(&self.run_id, symbol).await?;
        self.metrics.record(
            "validation",
            "cascade",
            Some(symbol),
            None,
            cascade_started.elapsed().as_millis() as i64,
        );

        match outcome.status {
            CascadeStatus::Validated { side, execution } => {
                let zone = self.zones.recalculate(symbol, side, &execution).await?;
                // 偏离只记诊断事件，不拦截
                self.zones
                    .check_price(
                        &self.run_id,
                        &zone,
                        execution.price,
                        serde_json::to_value(&outcome.state)?,
                    )
                    .await?;

                let (plan, intent) = self
                    .planner
                    .plan_and_execute(
                        &self.run_id,
                        symbol,
                        side,
                        &execution,
                        &outcome.validated_tfs,
                    )
                    .await?;

                let mut row = if let Some(error) = &plan.outcome.failure_reason {
                    let mut row = MtfRunSymbol::new(&self.run_id, symbol, SymbolOutcome::Failed);
                    row.error = Some(error.clone());
                    row
                } else {
                    let mut row = MtfRunSymbol::new(&self.run_id, symbol, SymbolOutcome::Success);
                    row.decision = Some(format!("plan_{}", plan.status.as_str()));
                    row
                };
                row.execution_tf = Some(EXECUTION_TF);
                row.side = Some(side);
                row.price = Some(execution.price);
                row.atr = Some(execution.atr);
                row.context = serde_json::json!({
                    "client_order_id": intent.client_order_id,
                    "intent_status": intent.status.as_str(),
                    "zone": { "min": zone.min_price, "max": zone.max_price },
                });
                Ok(row)
            }
            CascadeStatus::Blocked {
                blocking_tf,
                reason,
            } => {
                let mut row = MtfRunSymbol::new(&self.run_id, symbol, SymbolOutcome::Blocked);
                row.blocking_tf = Some(blocking_tf);
                row.decision = Some(reason);
                Ok(row)
            }
            CascadeStatus::Failed { error } => {
                let mut row = MtfRunSymbol::new(&self.run_id, symbol, SymbolOutcome::Failed);
                row.error = Some(error);
                Ok(row)
            }
        }
    }
}
