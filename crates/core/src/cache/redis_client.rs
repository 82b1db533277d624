use std::env;

use anyhow::{anyhow, Result};
use once_cell::sync::OnceCell;
use redis::aio::MultiplexedConnection;
use redis::Client;
use tracing::{debug, error, info};

/// Redis连接池管理器
pub struct RedisConnectionPool {
    client: Client,
}

impl RedisConnectionPool {
    /// 创建新的连接池
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client =
            Client::open(redis_url).map_err(|e| anyhow!("Failed to create Redis client: {}", e))?;

        // 测试连接
        let _test_conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| {
                error!("Redis connection test failed: {}", redis_url);
                anyhow!("Failed to test Redis connection: {}", e)
            })?;

        debug!("Redis连接池初始化成功");

        Ok(Self { client })
    }

    /// 获取连接
    pub async fn get_connection(&self) -> Result<MultiplexedConnection> {
        let conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| anyhow!("Failed to get multiplexed connection: {}", e))?;

        Ok(conn)
    }
}

/// 全局Redis连接池实例
pub static REDIS_POOL: OnceCell<RedisConnectionPool> = OnceCell::new();

/// 初始化Redis连接池
pub async fn init_redis_pool() -> Result<()> {
    let redis_url =
        env::var("REDIS_HOST").unwrap_or_else(|_| "redis://127.0.0.1:6379/".to_string());

    let pool = RedisConnectionPool::new(&redis_url).await?;

    REDIS_POOL
        .set(pool)
        .map_err(|_| anyhow!("Failed to initialize Redis connection pool"))?;

    info!("Redis connection pool initialized successfully");
    Ok(())
}

/// 获取Redis连接池实例
pub fn get_redis_pool() -> Result<&'static RedisConnectionPool> {
    REDIS_POOL
        .get()
        .ok_or_else(|| anyhow!("Redis连接池未初始化，请先调用 init_redis_pool()"))
}

/// 获取Redis连接
pub async fn get_redis_connection() -> Result<MultiplexedConnection> {
    let pool = get_redis_pool()?;
    pool.get_connection().await
}

/// 校验缓存键：symbol / timeframe 的确定性组合
pub fn validation_cache_key(symbol: &str, timeframe: &str) -> String {
    format!("mtf:validation:{}:{}", symbol, timeframe)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_cache_key_deterministic() {
        let a = validation_cache_key("BTC-USDT", "5m");
        let b = validation_cache_key("BTC-USDT", "5m");
        assert_eq!(a, b);
        assert_eq!(a, "mtf:validation:BTC-USDT:5m");
    }
}
