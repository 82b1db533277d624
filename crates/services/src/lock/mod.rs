//! 锁服务

pub mod lock_manager;

pub use lock_manager::LockManager;
