//! Build interface of the `JDEcoder` accelerator operator.
//!
//! The operator is meant to decode raw detection head outputs into final
//! detections on the inference accelerator. The kernel built here only
//! declares the operator signature and lowers to a pass-through graph.

mod common;
pub mod dtype;
pub mod init;
pub mod kernel;

pub use dtype::*;
pub use init::*;
pub use kernel::*;
