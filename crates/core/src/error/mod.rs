// 错误处理模块

pub use anyhow::{anyhow, Error as AnyhowError, Result};
pub use thiserror::Error;

/// 引擎错误类型
///
/// 注意：锁竞争（Busy）和门控跳过不是错误，
/// 它们在领域层建模为显式的枚举结果。
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// 运行级锁被占用，本次运行在开始前中止
    #[error("Run lock busy, held by {holder}")]
    RunLockBusy { holder: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
