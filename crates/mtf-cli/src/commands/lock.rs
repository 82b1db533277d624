//! lock 命令：查看与人工释放租约锁

use anyhow::Result;
use chrono::Utc;
use clap::Subcommand;

use mtf_engine_core::database::get_db_pool;
use mtf_engine_domain::traits::LockRepository;
use mtf_engine_infrastructure::SqlxLockRepository;

#[derive(Subcommand)]
pub enum LockCmd {
    /// 强制释放指定作用域的锁（仅限人工恢复）
    Release {
        /// 锁作用域，如 RUN:GLOBAL 或 SYMBOL:BTC-USDT
        #[arg(long)]
        scope: String,
    },
    /// 列出当前未过期的锁
    List,
}

pub async fn handle(cmd: LockCmd) -> Result<()> {
    let repo = SqlxLockRepository::new(get_db_pool()?.clone());
    match cmd {
        LockCmd::Release { scope } => {
            // release 要求持有者匹配，人工释放先读出当前持有者
            match repo.get(&scope).await? {
                Some(lock) => {
                    let released = repo.release(&scope, &lock.owner_id).await?;
                    if released {
                        println!("lock {} released (was held by {})", scope, lock.owner_id);
                    } else {
                        println!("lock {} changed hands during release, retry", scope);
                    }
                }
                None => println!("lock {} not held", scope),
            }
        }
        LockCmd::List => {
            let now = Utc::now();
            for lock in repo.list_active().await? {
                let expiry = match lock.expires_at {
                    Some(t) => format!("expires {}", t.to_rfc3339()),
                    None => "no expiry".to_string(),
                };
                let state = if lock.is_expired(now) { "expired" } else { "held" };
                println!("{:<24} {:<36} {:<8} {}", lock.scope, lock.owner_id, state, expiry);
            }
        }
    }
    Ok(())
}
