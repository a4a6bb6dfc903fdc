//! Data models for nomad-conf.

pub mod spec;
pub mod variable;

pub use spec::{KEY_SEPARATOR, VariableSpec};
pub use variable::{Items, Variable, VariableMetadata};
