//! Explicit weight initialization over the parameterized layers of a module tree.

use crate::{batch_norm::BatchNorm, common::*, conv_2d::Conv2D};

/// A borrowed layer that owns trainable parameters.
#[derive(Debug, Clone, Copy, AsRefStr)]
pub enum ParamLayer<'a> {
    Conv2D(&'a Conv2D),
    BatchNorm(&'a BatchNorm),
}

impl ParamLayer<'_> {
    pub fn reset_parameters(&self) {
        match self {
            Self::Conv2D(conv) => conv.reset_parameters(),
            Self::BatchNorm(bn) => bn.reset_parameters(),
        }
    }

    pub fn has_nan(&self) -> bool {
        match self {
            Self::Conv2D(conv) => conv.has_nan(),
            Self::BatchNorm(bn) => bn.has_nan(),
        }
    }
}

/// Modules that expose their parameterized layers in construction order.
pub trait ParamLayers {
    fn param_layers(&self) -> Vec<ParamLayer<'_>>;
}

/// Resets every layer in the list and returns the number of layers visited.
///
/// Convolution weights are drawn from N(0, 1) and scaled by `2 / numel`,
/// convolution biases are zeroed. Batch norms get unit weights, zero biases
/// and zero running statistics.
pub fn init_weights<'a>(layers: impl IntoIterator<Item = ParamLayer<'a>>) -> usize {
    layers
        .into_iter()
        .inspect(|layer| layer.reset_parameters())
        .count()
}
