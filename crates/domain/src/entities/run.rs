//! 运行记录实体 (MtfRun / MtfRunSymbol / MtfRunMetric)
//!
//! 一次编排调用对应一条 MtfRun；每个交易对的结果写一条 MtfRunSymbol；
//! 耗时统计按 (分类, 操作[, 交易对, 周期]) 聚合为 MtfRunMetric。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::{RunStatus, Side, SkipReason, SymbolOutcome, Timeframe};

/// 一次编排运行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MtfRun {
    /// 全局唯一运行ID
    pub run_id: String,
    pub status: RunStatus,
    pub symbols_requested: u32,
    pub symbols_processed: u32,
    pub symbols_successful: u32,
    pub symbols_failed: u32,
    pub symbols_skipped: u32,
    /// successful / processed，processed 为 0 时取 0
    pub success_rate: f64,
    pub dry_run: bool,
    pub force_run: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub execution_time_seconds: Option<f64>,
}

impl MtfRun {
    pub fn new(symbols_requested: u32, dry_run: bool, force_run: bool) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            status: RunStatus::Running,
            symbols_requested,
            symbols_processed: 0,
            symbols_successful: 0,
            symbols_failed: 0,
            symbols_skipped: 0,
            success_rate: 0.0,
            dry_run,
            force_run,
            started_at: Utc::now(),
            finished_at: None,
            execution_time_seconds: None,
        }
    }

    /// 记入一个交易对的结果
    pub fn record_outcome(&mut self, outcome: SymbolOutcome) {
        self.symbols_processed += 1;
        match outcome {
            SymbolOutcome::Success => self.symbols_successful += 1,
            SymbolOutcome::Failed => self.symbols_failed += 1,
            SymbolOutcome::Skipped => self.symbols_skipped += 1,
            SymbolOutcome::Blocked => {}
        }
    }

    /// 收尾：状态只能从 Running 向前流转
    pub fn finish(&mut self, status: RunStatus) {
        if self.status.is_terminal() {
            return;
        }
        let finished = Utc::now();
        self.status = status;
        self.finished_at = Some(finished);
        self.execution_time_seconds =
            Some((finished - self.started_at).num_milliseconds() as f64 / 1000.0);
        self.success_rate = if self.symbols_processed == 0 {
            0.0
        } else {
            f64::from(self.symbols_successful) / f64::from(self.symbols_processed)
        };
    }
}

/// 单个交易对在一次运行中的记录（写入后不再修改）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MtfRunSymbol {
    pub run_id: String,
    pub symbol: String,
    pub outcome: SymbolOutcome,
    /// 级联校验首个未通过的周期
    pub blocking_tf: Option<Timeframe>,
    /// 最终做出决策的周期
    pub execution_tf: Option<Timeframe>,
    pub side: Option<Side>,
    pub skip_reason: Option<SkipReason>,
    /// 决策时刻的价格快照
    pub price: Option<f64>,
    /// 决策时刻的ATR快照
    pub atr: Option<f64>,
    /// 决策说明
    pub decision: Option<String>,
    /// 结构化错误信息（outcome == Failed 时填写）
    pub error: Option<String>,
    /// 自由上下文（开放式元数据的逃生口）
    pub context: serde_json::Value,
    pub duration_ms: i64,
    pub created_at: DateTime<Utc>,
}

impl MtfRunSymbol {
    pub fn new(run_id: &str, symbol: &str, outcome: SymbolOutcome) -> Self {
        Self {
            run_id: run_id.to_string(),
            symbol: symbol.to_string(),
            outcome,
            blocking_tf: None,
            execution_tf: None,
            side: None,
            skip_reason: None,
            price: None,
            atr: None,
            decision: None,
            error: None,
            context: serde_json::Value::Null,
            duration_ms: 0,
            created_at: Utc::now(),
        }
    }
}

/// 运行级性能指标
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MtfRunMetric {
    pub run_id: String,
    /// 分类，如 "gate" / "validation" / "order"
    pub category: String,
    /// 操作，如 "cascade" / "try_acquire"
    pub operation: String,
    pub symbol: Option<String>,
    pub timeframe: Option<Timeframe>,
    pub count: u32,
    pub duration_ms: i64,
}
