use crate::common::*;

/// The number of entries in a stage channel table, including the unused entry 0.
pub const NUM_STAGE_ENTRIES: usize = 9;

pub use model_size_::*;
mod model_size_ {
    use super::*;

    /// The width multiplier variant of the ShuffleNetV2 backbone.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, EnumIter)]
    pub enum ModelSize {
        #[strum(serialize = "0.5x")]
        X0_5,
        #[strum(serialize = "1.0x")]
        X1_0,
        #[strum(serialize = "1.5x")]
        X1_5,
        #[strum(serialize = "2.0x")]
        X2_0,
    }

    impl ModelSize {
        /// Iterates over all supported variants.
        pub fn all() -> impl Iterator<Item = Self> {
            Self::iter()
        }

        /// The stage channel table of this variant.
        pub fn stage_channels(&self) -> StageChannels {
            let table = match self {
                Self::X0_5 => [24, 48, 96, 192, 384, 256, 256, 256],
                Self::X1_0 => [24, 116, 232, 464, 928, 256, 256, 256],
                Self::X1_5 => [24, 176, 352, 704, 1408, 256, 256, 256],
                Self::X2_0 => [24, 244, 488, 976, 1952, 256, 256, 256],
            };
            StageChannels::from_stages(table)
        }
    }

    impl Default for ModelSize {
        fn default() -> Self {
            Self::X2_0
        }
    }

    impl FromStr for ModelSize {
        type Err = Error;

        fn from_str(text: &str) -> Result<Self, Self::Err> {
            Self::iter()
                .find(|size| size.as_ref() == text)
                .ok_or_else(|| {
                    format_err!(
                        "model size '{}' is not implemented, expect one of {}",
                        text,
                        Self::iter().map(|size| size.as_ref().to_owned()).join(", ")
                    )
                })
        }
    }

    impl Display for ModelSize {
        fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
            f.write_str(self.as_ref())
        }
    }

    impl Serialize for ModelSize {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            self.as_ref().serialize(serializer)
        }
    }

    impl<'de> Deserialize<'de> for ModelSize {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            let text = String::deserialize(deserializer)?;
            text.parse().map_err(|err| D::Error::custom(format!("{:#}", err)))
        }
    }
}

pub use stage_channels::*;
mod stage_channels {
    use super::*;

    /// Output channels per network stage, indexed by stage number.
    ///
    /// Stage 1 is the stem convolution, stages 2 to 5 are the backbone
    /// stages and stages 6 to 8 are the projections of the three heads.
    /// Entry 0 has no stage and is always empty.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StageChannels([Option<usize>; NUM_STAGE_ENTRIES]);

    impl StageChannels {
        pub(super) fn from_stages(stages: [usize; NUM_STAGE_ENTRIES - 1]) -> Self {
            let mut table = [None; NUM_STAGE_ENTRIES];
            table[1..]
                .iter_mut()
                .zip(stages)
                .for_each(|(entry, channels)| *entry = Some(channels));
            Self(table)
        }

        /// The output channels of the stage.
        pub fn stage(&self, index: usize) -> Result<usize> {
            ensure!(
                (1..NUM_STAGE_ENTRIES).contains(&index),
                "stage index must be in range 1..{}, but get {}",
                NUM_STAGE_ENTRIES,
                index
            );
            self.0[index].ok_or_else(|| format_err!("stage {} has no channel count", index))
        }

        pub fn as_slice(&self) -> &[Option<usize>] {
            &self.0
        }
    }
}
