//! 操作员命令

pub mod exclusion;
pub mod lock;
pub mod run;
pub mod state;
pub mod switch;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// MTF 校验与订单意图编排引擎的操作员入口
#[derive(Parser)]
#[command(name = "mtf-cli", version, about = "MTF validation & order-intent engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 对一批交易对执行一次完整运行
    Run(run::RunArgs),
    /// 开关管理
    #[command(subcommand)]
    Switch(switch::SwitchCmd),
    /// 冷却管理
    #[command(subcommand)]
    Cooldown(exclusion::CooldownCmd),
    /// 黑名单管理
    #[command(subcommand)]
    Blacklist(exclusion::BlacklistCmd),
    /// 锁管理
    #[command(subcommand)]
    Lock(lock::LockCmd),
    /// 状态查看
    #[command(subcommand)]
    State(state::StateCmd),
}

pub async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run(args) => run::handle(args).await,
        Commands::Switch(cmd) => switch::handle(cmd).await,
        Commands::Cooldown(cmd) => exclusion::handle_cooldown(cmd).await,
        Commands::Blacklist(cmd) => exclusion::handle_blacklist(cmd).await,
        Commands::Lock(cmd) => lock::handle(cmd).await,
        Commands::State(cmd) => state::handle(cmd).await,
    }
}
