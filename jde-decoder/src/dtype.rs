use crate::common::*;

/// The element types the operator accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, EnumIter)]
pub enum DType {
    #[strum(serialize = "float16")]
    Float16,
    #[strum(serialize = "float32")]
    Float32,
}

impl DType {
    pub fn kind(&self) -> Kind {
        match self {
            Self::Float16 => Kind::Half,
            Self::Float32 => Kind::Float,
        }
    }
}

impl FromStr for DType {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let lower = text.to_lowercase();
        Self::iter()
            .find(|dtype| dtype.as_ref() == lower)
            .ok_or_else(|| {
                format_err!(
                    "JDEcoder only support {} while dtype is {}",
                    Self::iter().map(|dtype| dtype.as_ref().to_owned()).join(","),
                    text
                )
            })
    }
}

impl Display for DType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl Serialize for DType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.as_ref().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(|err| D::Error::custom(format!("{:#}", err)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dtype_parse() -> Result<()> {
        assert_eq!("float16".parse::<DType>()?, DType::Float16);
        assert_eq!("FLOAT32".parse::<DType>()?, DType::Float32);
        assert_eq!("Float16".parse::<DType>()?.kind(), Kind::Half);

        for text in ["float64", "int8", "half", ""] {
            assert!(text.parse::<DType>().is_err(), "'{}' accepted", text);
        }
        Ok(())
    }
}
