//! MTF 引擎操作员命令行

pub mod app;
pub mod commands;

use anyhow::Result;

pub use app::app_init;
pub use commands::Cli;

pub async fn run(cli: Cli) -> Result<()> {
    commands::dispatch(cli).await
}
