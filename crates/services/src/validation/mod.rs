//! 级联校验

pub mod cascade_validator;

pub use cascade_validator::{CascadeOutcome, CascadeStatus, CascadeValidator, EXECUTION_TF};
