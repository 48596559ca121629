pub use anyhow::{bail, ensure, format_err, Context as _, Error, Result};
pub use log::{debug, warn};
pub use noisy_float::prelude::*;
pub use serde::{Deserialize, Serialize};
pub use std::{borrow::Borrow, sync::Once};
pub use strum::AsRefStr;
pub use tch::{
    nn::{self, Module as _, ModuleT as _},
    Device, IndexOp, Kind, Tensor,
};
