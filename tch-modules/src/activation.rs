use crate::common::*;

/// The activations used by ShuffleNetV2 units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Linear,
    Relu,
}

impl nn::Module for Activation {
    fn forward(&self, xs: &Tensor) -> Tensor {
        match self {
            Self::Linear => xs.shallow_clone(),
            Self::Relu => xs.relu(),
        }
    }
}
