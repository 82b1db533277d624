//! 值对象

pub mod contract_spec;
pub mod signal;

pub use contract_spec::{ContractSpec, QuantizationIssue};
pub use signal::TimeframeSignal;
