//! 内存运行 / 审计仓储

use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;

use mtf_engine_domain::traits::{AuditRepository, RunRepository};
use mtf_engine_domain::{
    MtfAudit, MtfRun, MtfRunMetric, MtfRunSymbol, TradeLifecycleEvent, TradeZoneEvent,
};

/// 内存运行仓储
#[derive(Default)]
pub struct InMemoryRunRepository {
    runs: DashMap<String, MtfRun>,
    run_symbols: Mutex<Vec<MtfRunSymbol>>,
    metrics: Mutex<Vec<MtfRunMetric>>,
}

impl InMemoryRunRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metrics_snapshot(&self) -> Vec<MtfRunMetric> {
        self.metrics.lock().unwrap().clone()
    }
}

#[async_trait]
impl RunRepository for InMemoryRunRepository {
    async fn insert_run(&self, run: &MtfRun) -> Result<()> {
        self.runs.insert(run.run_id.clone(), run.clone());
        Ok(())
    }

    async fn update_run(&self, run: &MtfRun) -> Result<()> {
        self.runs.insert(run.run_id.clone(), run.clone());
        Ok(())
    }

    async fn get_run(&self, run_id: &str) -> Result<Option<MtfRun>> {
        Ok(self.runs.get(run_id).map(|r| r.clone()))
    }

    async fn insert_run_symbol(&self, row: &MtfRunSymbol) -> Result<()> {
        self.run_symbols.lock().unwrap().push(row.clone());
        Ok(())
    }

    async fn list_run_symbols(&self, run_id: &str) -> Result<Vec<MtfRunSymbol>> {
        Ok(self
            .run_symbols
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.run_id == run_id)
            .cloned()
            .collect())
    }

    async fn insert_metrics(&self, metrics: &[MtfRunMetric]) -> Result<u64> {
        let mut guard = self.metrics.lock().unwrap();
        guard.extend_from_slice(metrics);
        Ok(metrics.len() as u64)
    }
}

/// 内存审计仓储
#[derive(Default)]
pub struct InMemoryAuditRepository {
    audits: Mutex<Vec<MtfAudit>>,
    zone_events: Mutex<Vec<TradeZoneEvent>>,
    lifecycle_events: Mutex<Vec<TradeLifecycleEvent>>,
}

impl InMemoryAuditRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn audits_snapshot(&self) -> Vec<MtfAudit> {
        self.audits.lock().unwrap().clone()
    }

    pub fn zone_events_snapshot(&self) -> Vec<TradeZoneEvent> {
        self.zone_events.lock().unwrap().clone()
    }

    pub fn lifecycle_events_snapshot(&self) -> Vec<TradeLifecycleEvent> {
        self.lifecycle_events.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditRepository for InMemoryAuditRepository {
    async fn insert_audits(&self, rows: &[MtfAudit]) -> Result<u64> {
        let mut guard = self.audits.lock().unwrap();
        guard.extend_from_slice(rows);
        Ok(rows.len() as u64)
    }

    async fn insert_zone_events(&self, rows: &[TradeZoneEvent]) -> Result<u64> {
        let mut guard = self.zone_events.lock().unwrap();
        guard.extend_from_slice(rows);
        Ok(rows.len() as u64)
    }

    async fn insert_lifecycle_events(&self, rows: &[TradeLifecycleEvent]) -> Result<u64> {
        let mut guard = self.lifecycle_events.lock().unwrap();
        guard.extend_from_slice(rows);
        Ok(rows.len() as u64)
    }
}
