//! 应用装配

pub mod bootstrap;

pub use bootstrap::{app_init, build_orchestrator};
