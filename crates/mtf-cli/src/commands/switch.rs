//! switch 命令：三级作用域开关管理

use anyhow::Result;
use chrono::{Duration, Utc};
use clap::{Args, Subcommand};

use mtf_engine_core::database::get_db_pool;
use mtf_engine_domain::traits::SwitchRepository;
use mtf_engine_domain::{MtfSwitch, SwitchScope, Timeframe};
use mtf_engine_infrastructure::SqlxSwitchRepository;

#[derive(Subcommand)]
pub enum SwitchCmd {
    /// 设置开关
    Set(SetArgs),
    /// 清除开关（回到缺省语义）
    Clear(ScopeArgs),
    /// 列出所有开关
    List,
}

#[derive(Args)]
pub struct ScopeArgs {
    /// 交易对；缺省为全局开关
    #[arg(long)]
    pub symbol: Option<String>,

    /// 周期（需要同时指定 --symbol）
    #[arg(long)]
    pub tf: Option<String>,
}

#[derive(Args)]
pub struct SetArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,

    /// on / off
    #[arg(long)]
    pub state: String,

    /// 自动过期时间（分钟），缺省永久
    #[arg(long)]
    pub ttl_minutes: Option<i64>,
}

fn parse_scope(args: &ScopeArgs) -> Result<SwitchScope> {
    match (&args.symbol, &args.tf) {
        (None, None) => Ok(SwitchScope::Global),
        (Some(symbol), None) => Ok(SwitchScope::Symbol(symbol.clone())),
        (Some(symbol), Some(tf)) => {
            let tf = tf.parse::<Timeframe>().map_err(|e| anyhow::anyhow!(e))?;
            Ok(SwitchScope::SymbolTf(symbol.clone(), tf))
        }
        (None, Some(_)) => anyhow::bail!("--tf requires --symbol"),
    }
}

pub async fn handle(cmd: SwitchCmd) -> Result<()> {
    let repo = SqlxSwitchRepository::new(get_db_pool()?.clone());
    match cmd {
        SwitchCmd::Set(args) => {
            let is_on = match args.state.as_str() {
                "on" => true,
                "off" => false,
                other => anyhow::bail!("--state must be on or off, got {}", other),
            };
            let scope = parse_scope(&args.scope)?;
            let expires_at = args.ttl_minutes.map(|m| Utc::now() + Duration::minutes(m));
            repo.set(&MtfSwitch::new(scope.clone(), is_on, expires_at)).await?;
            println!("switch {} = {}", scope.key(), args.state);
        }
        SwitchCmd::Clear(args) => {
            let scope = parse_scope(&args)?;
            repo.clear(&scope).await?;
            println!("switch {} cleared", scope.key());
        }
        SwitchCmd::List => {
            let now = Utc::now();
            for switch in repo.list().await? {
                let effective = match switch.effective(now) {
                    Some(true) => "on",
                    Some(false) => "off",
                    None => "expired",
                };
                println!("{:<40} {}", switch.scope.key(), effective);
            }
        }
    }
    Ok(())
}
