pub use anyhow::{bail, ensure, Context as _, Result};
pub use log::debug;
pub use ndarray::{Array2, ArrayView2};
pub use serde::{Deserialize, Serialize};
pub use std::path::Path;
