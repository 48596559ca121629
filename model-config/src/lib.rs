//! Configuration types of the ShuffleNetV2 JDE detector.

mod common;
pub mod anchors;
pub mod model;
pub mod model_size;
pub mod types;

pub use anchors::*;
pub use model::*;
pub use model_size::*;
pub use types::*;
