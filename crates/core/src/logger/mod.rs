//! 日志模块

pub mod setup;

pub use setup::init_logger;
pub use tracing_appender::non_blocking::WorkerGuard;
