//! The model building blocks.

mod backbone;
mod head;
mod model;
mod stage;

pub use backbone::*;
pub use head::*;
pub use model::*;
pub use stage::*;
