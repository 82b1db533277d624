//! cooldown / blacklist 命令：临时与人工排除管理

use anyhow::Result;
use chrono::{Duration, Utc};
use clap::{Args, Subcommand};

use mtf_engine_core::database::get_db_pool;
use mtf_engine_domain::traits::CooldownRepository;
use mtf_engine_domain::{BlacklistReason, BlacklistedContract, ContractCooldown, CooldownReason};
use mtf_engine_infrastructure::SqlxCooldownRepository;

#[derive(Subcommand)]
pub enum CooldownCmd {
    /// 设置或续期冷却
    Set(CooldownSetArgs),
    /// 清除冷却
    Clear {
        #[arg(long)]
        symbol: String,
    },
    /// 列出所有冷却
    List,
}

#[derive(Args)]
pub struct CooldownSetArgs {
    #[arg(long)]
    pub symbol: String,

    /// too_many_errors / illiquid / position_just_closed / manual
    #[arg(long, default_value = "manual")]
    pub reason: String,

    /// 冷却时长（分钟）；缺省永久，直到人工清除
    #[arg(long)]
    pub minutes: Option<i64>,
}

#[derive(Subcommand)]
pub enum BlacklistCmd {
    /// 加入黑名单
    Add(BlacklistAddArgs),
    /// 列出黑名单
    List,
}

#[derive(Args)]
pub struct BlacklistAddArgs {
    #[arg(long)]
    pub symbol: String,

    /// delisted / manual_ban / risk_control
    #[arg(long, default_value = "manual_ban")]
    pub reason: String,

    /// 过期时长（小时）；缺省永久
    #[arg(long)]
    pub expires_hours: Option<i64>,
}

fn format_until(until: Option<chrono::DateTime<Utc>>) -> String {
    match until {
        Some(t) => t.to_rfc3339(),
        None => "permanent".to_string(),
    }
}

pub async fn handle_cooldown(cmd: CooldownCmd) -> Result<()> {
    let repo = SqlxCooldownRepository::new(get_db_pool()?.clone());
    match cmd {
        CooldownCmd::Set(args) => {
            let reason = args
                .reason
                .parse::<CooldownReason>()
                .map_err(|e| anyhow::anyhow!(e))?;
            let until = args.minutes.map(|m| Utc::now() + Duration::minutes(m));
            repo.upsert_cooldown(&ContractCooldown::new(&args.symbol, reason, until))
                .await?;
            println!(
                "cooldown {} {} until {}",
                args.symbol,
                reason.as_str(),
                format_until(until)
            );
        }
        CooldownCmd::Clear { symbol } => {
            repo.clear_cooldown(&symbol).await?;
            println!("cooldown {} cleared", symbol);
        }
        CooldownCmd::List => {
            let now = Utc::now();
            for cd in repo.list_cooldowns().await? {
                let status = if cd.is_active(now) { "active" } else { "expired" };
                println!(
                    "{:<14} {:<22} {:<8} until {}",
                    cd.symbol,
                    cd.reason.as_str(),
                    status,
                    format_until(cd.active_until)
                );
            }
        }
    }
    Ok(())
}

pub async fn handle_blacklist(cmd: BlacklistCmd) -> Result<()> {
    let repo = SqlxCooldownRepository::new(get_db_pool()?.clone());
    match cmd {
        BlacklistCmd::Add(args) => {
            let reason = args
                .reason
                .parse::<BlacklistReason>()
                .map_err(|e| anyhow::anyhow!(e))?;
            let expires_at = args.expires_hours.map(|h| Utc::now() + Duration::hours(h));
            repo.add_blacklist(&BlacklistedContract::new(&args.symbol, reason, expires_at))
                .await?;
            println!(
                "blacklisted {} {} until {}",
                args.symbol,
                reason.as_str(),
                format_until(expires_at)
            );
        }
        BlacklistCmd::List => {
            let now = Utc::now();
            for entry in repo.list_blacklist().await? {
                let status = if entry.is_active(now) { "active" } else { "expired" };
                println!(
                    "{:<14} {:<14} {:<8} until {}",
                    entry.symbol,
                    entry.reason.as_str(),
                    status,
                    format_until(entry.expires_at)
                );
            }
        }
    }
    Ok(())
}
