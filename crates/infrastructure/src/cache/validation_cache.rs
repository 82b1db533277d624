//! 校验结果缓存
//!
//! TTL 键值存储，惰性过期：读路径发现过期即当作未命中并顺手删除，
//! 不依赖后台清理任务保证正确性。

use std::time::{Duration, Instant};

use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use redis::AsyncCommands;
use tracing::debug;

use mtf_engine_core::cache::get_redis_connection;
use mtf_engine_domain::traits::ValidationCacheStore;

struct CacheEntry {
    payload: serde_json::Value,
    expire_at: Instant,
}

/// 进程内校验缓存
#[derive(Default)]
pub struct InMemoryValidationCache {
    map: DashMap<String, CacheEntry>,
}

impl InMemoryValidationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 空间回收：清掉已过期条目（正确性不依赖此方法）
    pub fn sweep(&self) {
        let now = Instant::now();
        self.map.retain(|_, entry| entry.expire_at > now);
    }
}

#[async_trait]
impl ValidationCacheStore for InMemoryValidationCache {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        if let Some(entry) = self.map.get(key) {
            if entry.expire_at > Instant::now() {
                return Ok(Some(entry.payload.clone()));
            }
            drop(entry);
            self.map.remove(key);
        }
        Ok(None)
    }

    async fn put(&self, key: &str, payload: &serde_json::Value, ttl_secs: u64) -> Result<()> {
        self.map.insert(
            key.to_string(),
            CacheEntry {
                payload: payload.clone(),
                expire_at: Instant::now() + Duration::from_secs(ttl_secs),
            },
        );
        Ok(())
    }
}

/// Redis 校验缓存（多进程共享；TTL 交给 Redis 管理）
pub struct RedisValidationCache {
    key_prefix: String,
}

impl RedisValidationCache {
    pub fn new(key_prefix: &str) -> Self {
        Self {
            key_prefix: key_prefix.to_string(),
        }
    }

    fn make_key(&self, key: &str) -> String {
        format!("{}:{}", self.key_prefix, key)
    }
}

#[async_trait]
impl ValidationCacheStore for RedisValidationCache {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let mut conn = get_redis_connection().await?;
        let redis_key = self.make_key(key);

        let result: Option<String> = conn.get(&redis_key).await?;
        match result {
            Some(s) => {
                debug!("Validation cache hit: {}", redis_key);
                Ok(Some(serde_json::from_str(&s)?))
            }
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, payload: &serde_json::Value, ttl_secs: u64) -> Result<()> {
        let mut conn = get_redis_connection().await?;
        let redis_key = self.make_key(key);
        let body = serde_json::to_string(payload)?;
        let _: () = conn.set_ex(redis_key, body, ttl_secs).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_put_get_overwrite() {
        let cache = InMemoryValidationCache::new();
        cache.put("k", &json!({"v": 1}), 60).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some(json!({"v": 1})));

        // 无条件覆盖
        cache.put("k", &json!({"v": 2}), 60).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some(json!({"v": 2})));
    }

    #[tokio::test]
    async fn test_expired_entry_is_miss() {
        let cache = InMemoryValidationCache::new();
        cache.put("k", &json!(true), 0).await.unwrap();
        // TTL 0 秒，立即过期
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sweep_reclaims_space() {
        let cache = InMemoryValidationCache::new();
        cache.put("a", &json!(1), 0).await.unwrap();
        cache.put("b", &json!(2), 60).await.unwrap();
        cache.sweep();
        assert!(cache.map.get("a").is_none());
        assert!(cache.map.get("b").is_some());
    }
}
