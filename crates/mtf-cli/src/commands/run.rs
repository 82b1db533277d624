//! run 命令：执行一次完整运行并打印结果

use anyhow::Result;
use clap::Args;

use mtf_engine_core::database::get_db_pool;
use mtf_engine_domain::traits::RunRepository;
use mtf_engine_infrastructure::SqlxRunRepository;

use crate::app::build_orchestrator;

#[derive(Args)]
pub struct RunArgs {
    /// 逗号分隔的交易对列表，如 BTC-USDT,ETH-USDT
    #[arg(long, value_delimiter = ',')]
    pub symbols: Vec<String>,

    /// 并发处理的交易对上限
    #[arg(long, default_value_t = 4)]
    pub workers: usize,

    /// 只走到 READY_TO_SEND，不向交易所提交
    #[arg(long)]
    pub dry_run: bool,

    /// 抢占已被占用的运行级锁（仅限人工恢复）
    #[arg(long)]
    pub force: bool,
}

pub async fn handle(args: RunArgs) -> Result<()> {
    if args.symbols.is_empty() {
        anyhow::bail!("--symbols must name at least one symbol");
    }

    let orchestrator = build_orchestrator(args.dry_run, args.workers)?;
    let run = orchestrator
        .start_run(&args.symbols, args.dry_run, args.force)
        .await?;

    println!(
        "run {} {}: requested={} processed={} successful={} failed={} skipped={} success_rate={:.2}",
        run.run_id,
        run.status.as_str(),
        run.symbols_requested,
        run.symbols_processed,
        run.symbols_successful,
        run.symbols_failed,
        run.symbols_skipped,
        run.success_rate,
    );

    let runs = SqlxRunRepository::new(get_db_pool()?.clone());
    for row in runs.list_run_symbols(&run.run_id).await? {
        let detail = row
            .skip_reason
            .map(|r| r.as_str().to_string())
            .or(row.blocking_tf.map(|tf| format!("blocked@{}", tf.as_str())))
            .or(row.error.clone())
            .or(row.decision.clone())
            .unwrap_or_default();
        println!(
            "  {:<14} {:<8} {:>6}ms  {}",
            row.symbol,
            row.outcome.as_str(),
            row.duration_ms,
            detail
        );
    }

    Ok(())
}
