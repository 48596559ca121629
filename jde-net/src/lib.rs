//! The ShuffleNetV2 backbone detector with joint detection and embedding heads.

mod common;
pub mod loss;
pub mod model;

pub use loss::{JdeCriterion, JdeLossOutput};
pub use model::{JdeModel, JdeModelInit};
