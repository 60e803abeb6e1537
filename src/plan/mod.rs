//! Flattening of the project tree into an ordered list of packages

pub mod package;
pub mod planner;

pub use package::{LINK_SCRIPT, Package, command_count};
pub use planner::Planner;
