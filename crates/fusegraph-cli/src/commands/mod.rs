//! CLI command implementations.

pub mod backends;
pub mod common;
pub mod compile;
pub mod run;
pub mod version;
