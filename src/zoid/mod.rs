//! Geometry and scheduling of the recursive space-time decomposition.

pub mod base;
pub mod plan;
pub mod scanner;
pub mod task_graph;
#[allow(clippy::module_inception)]
pub mod zoid;

pub use base::*;
pub use plan::*;
pub use zoid::*;
