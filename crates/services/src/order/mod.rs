//! 订单意图与计划

pub mod intent_service;
pub mod planner;

pub use intent_service::OrderIntentService;
pub use planner::{OrderPlanner, PlannerConfig};
