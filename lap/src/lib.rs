//! Dense linear assignment with optional cost extension and cost limit.

mod common;
pub mod cost;
pub mod solver;

pub use cost::*;
pub use solver::*;
