//! 编排层
//!
//! 运行级的生命周期管理：运行锁、有界并发、结果与指标聚合。

pub mod metrics;
pub mod orchestrator;

pub use metrics::MetricsRecorder;
pub use orchestrator::RunOrchestrator;
