pub use anyhow::{bail, ensure, format_err, Context as _, Error, Result};
pub use itertools::Itertools as _;
pub use noisy_float::prelude::*;
pub use serde::{de::Error as DeserializeError, Deserialize, Deserializer, Serialize, Serializer};
pub use std::{
    fmt::{self, Display, Formatter},
    path::Path,
    str::FromStr,
};
pub use strum::{AsRefStr, EnumIter, IntoEnumIterator};
