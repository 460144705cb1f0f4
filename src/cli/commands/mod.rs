//! CLI command implementations

pub mod alias;
pub mod completions;
pub mod replicate;
