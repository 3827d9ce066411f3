//! Command implementations

pub mod completions;
pub mod explain;
pub mod generate;
pub mod list;
pub mod name;
