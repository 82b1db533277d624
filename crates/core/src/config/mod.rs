//! 配置模块

pub mod environment;

pub use environment::*;
