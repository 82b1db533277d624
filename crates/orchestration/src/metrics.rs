//! 运行指标缓冲 (MetricsRecorder)
//!
//! worker 并发记录，运行收尾时一次性批量落库。

use std::sync::Mutex;

use anyhow::Result;

use mtf_engine_domain::traits::RunRepository;
use mtf_engine_domain::{MtfRunMetric, Timeframe};

pub struct MetricsRecorder {
    run_id: String,
    buffer: Mutex<Vec<MtfRunMetric>>,
}

impl MetricsRecorder {
    pub fn new(run_id: &str) -> Self {
        Self {
            run_id: run_id.to_string(),
            buffer: Mutex::new(Vec::new()),
        }
    }

    /// 同 (category, operation, symbol, timeframe) 的记录在缓冲内聚合：
    /// count 累加，duration_ms 累计总耗时
    pub fn record(
        &self,
        category: &str,
        operation: &str,
        symbol: Option<&str>,
        timeframe: Option<Timeframe>,
        duration_ms: i64,
    ) {
        if let Ok(mut buffer) = self.buffer.lock() {
            if let Some(existing) = buffer.iter_mut().find(|m| {
                m.category == category
                    && m.operation == operation
                    && m.symbol.as_deref() == symbol
                    && m.timeframe == timeframe
            }) {
                existing.count += 1;
                existing.duration_ms += duration_ms;
                return;
            }
            buffer.push(MtfRunMetric {
                run_id: self.run_id.clone(),
                category: category.to_string(),
                operation: operation.to_string(),
                symbol: symbol.map(|s| s.to_string()),
                timeframe,
                count: 1,
                duration_ms,
            });
        }
    }

    /// 批量落库并清空缓冲；返回写入条数
    pub async fn flush(&self, runs: &dyn RunRepository) -> Result<u64> {
        let drained: Vec<MtfRunMetric> = match self.buffer.lock() {
            Ok(mut buffer) => buffer.drain(..).collect(),
            Err(_) => return Ok(0),
        };
        if drained.is_empty() {
            return Ok(0);
        }
        runs.insert_metrics(&drained).await
    }
}
