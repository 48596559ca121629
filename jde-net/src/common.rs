pub use anyhow::{bail, ensure, format_err, Context as _, Error, Result};
pub use itertools::{izip, Itertools as _};
pub use log::{debug, info};
pub use model_config::{
    detection_channels, Anchors, FrameSize, ModelConfig, ModelSize, StageChannels,
    EMBEDDING_CHANNELS, NUM_ANCHORS_PER_SCALE, NUM_HEADS,
};
pub use std::borrow::Borrow;
pub use tch::{nn, Device, Kind, Tensor};
pub use tch_modules::{
    init_weights, Conv2D, Conv2DInit, ConvBn2D, ConvBn2DInit, IdClassifier, IdClassifierInit,
    MaxPool2D, ParamLayer, ParamLayers, ShuffleBlock, ShuffleBlockInit, UpSample2D,
};
pub use tch_tensor_like::TensorLike;
