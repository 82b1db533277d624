//! 缓存模块

pub mod redis_client;

pub use redis_client::{
    get_redis_connection, get_redis_pool, init_redis_pool, validation_cache_key,
    RedisConnectionPool,
};
