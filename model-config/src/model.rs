use crate::{anchors::Anchors, common::*, model_size::ModelSize};

/// The number of anchors each detection head predicts per grid cell.
pub const NUM_ANCHORS_PER_SCALE: usize = 4;

/// The width of the appearance embedding of each head.
pub const EMBEDDING_CHANNELS: usize = 512;

/// The number of detection heads.
pub const NUM_HEADS: usize = 3;

/// The model configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelConfig {
    /// The backbone width variant.
    #[serde(default)]
    pub model_size: ModelSize,
    /// The number of object classes.
    pub num_classes: usize,
    /// The number of identities. Zero disables the identity classifier.
    #[serde(default)]
    pub num_ids: usize,
    /// The anchors, passed to the loss function unmodified.
    pub anchors: Anchors,
}

impl ModelConfig {
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("unable to read file '{}'", path.display()))?;
        let config: Self = json5::from_str(&text)
            .with_context(|| format!("unable to parse config file '{}'", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.num_classes >= 1,
            "num_classes must be at least 1, but get {}",
            self.num_classes
        );
        Ok(())
    }

    /// The number of detection channels of each head output.
    pub fn detection_channels(&self) -> usize {
        detection_channels(self.num_classes)
    }

    /// The total number of channels of each head output.
    pub fn output_channels(&self) -> usize {
        self.detection_channels() + EMBEDDING_CHANNELS
    }
}

/// Box offsets, objectness and class scores, replicated per anchor.
pub fn detection_channels(num_classes: usize) -> usize {
    (5 + num_classes) * NUM_ANCHORS_PER_SCALE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_channels() {
        assert_eq!(detection_channels(1), 24);
        assert_eq!(detection_channels(80), 340);

        let config = ModelConfig {
            model_size: ModelSize::X0_5,
            num_classes: 1,
            num_ids: 0,
            anchors: Anchors::new(vec![]),
        };
        assert_eq!(config.output_channels(), 536);
    }

    #[test]
    fn reject_zero_classes() {
        let config = ModelConfig {
            model_size: ModelSize::X1_0,
            num_classes: 0,
            num_ids: 0,
            anchors: Anchors::new(vec![]),
        };
        assert!(config.validate().is_err());
    }
}
