//! 缓存实现

pub mod validation_cache;

pub use validation_cache::{InMemoryValidationCache, RedisValidationCache};
