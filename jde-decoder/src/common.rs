pub use anyhow::{ensure, format_err, Context as _, Error, Result};
pub use itertools::Itertools as _;
pub use log::{debug, info};
pub use noisy_float::prelude::*;
pub use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
pub use std::{
    fmt::{self, Display, Formatter},
    path::Path,
    str::FromStr,
};
pub use strum::{AsRefStr, EnumIter, IntoEnumIterator};
pub use tch::{Kind, Tensor};
