//! state 命令：查看交易对的多周期校验状态

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Subcommand;

use mtf_engine_core::database::get_db_pool;
use mtf_engine_domain::traits::StateRepository;
use mtf_engine_domain::Timeframe;
use mtf_engine_infrastructure::SqlxStateRepository;

#[derive(Subcommand)]
pub enum StateCmd {
    /// 按周期打印各槽位的最近通过时间与方向
    Show {
        #[arg(long)]
        symbol: String,
    },
}

fn format_candle_ts(ts: Option<i64>) -> String {
    match ts.and_then(DateTime::<Utc>::from_timestamp_millis) {
        Some(t) => t.to_rfc3339(),
        None => "-".to_string(),
    }
}

pub async fn handle(cmd: StateCmd) -> Result<()> {
    let repo = SqlxStateRepository::new(get_db_pool()?.clone());
    match cmd {
        StateCmd::Show { symbol } => {
            let Some(state) = repo.get(&symbol).await? else {
                println!("{}: no validation state", symbol);
                return Ok(());
            };
            println!("{} (updated {})", state.symbol, state.updated_at.to_rfc3339());
            for tf in Timeframe::CASCADE {
                let slot = state.slot(tf);
                let side = slot.side.map(|s| s.as_str()).unwrap_or("-");
                println!(
                    "  {:<4} {:<6} {}",
                    tf.as_str(),
                    side,
                    format_candle_ts(slot.last_candle_ts)
                );
            }
            match state.consistent_side() {
                Some(side) => println!("  consistent side: {}", side.as_str()),
                None => println!("  consistent side: none"),
            }
        }
    }
    Ok(())
}
