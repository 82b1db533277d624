//! 数据库模块

pub mod sqlx_pool;

pub use sqlx_pool::{close_db_pool, get_db_pool, health_check, init_db_pool};
