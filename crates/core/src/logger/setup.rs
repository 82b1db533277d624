//! 日志初始化
//!
//! tracing + EnvFilter，控制台输出；设置 LOG_DIR 时追加按天滚动的文件输出。

use std::env;

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// 初始化全局日志订阅器
///
/// 返回的 guard 需要由调用方持有到进程结束，否则文件日志会丢尾。
pub fn init_logger() -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let console_layer = fmt::layer().with_target(true);

    match env::var("LOG_DIR") {
        Ok(dir) => {
            let appender = RollingFileAppender::new(Rotation::DAILY, dir, "mtf-engine.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let file_layer = fmt::layer().with_ansi(false).with_writer(non_blocking);

            tracing_subscriber::registry()
                .with(filter)
                .with(console_layer)
                .with(file_layer)
                .init();
            Ok(Some(guard))
        }
        Err(_) => {
            tracing_subscriber::registry()
                .with(filter)
                .with(console_layer)
                .init();
            Ok(None)
        }
    }
}
