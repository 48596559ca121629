//! Building blocks of ShuffleNetV2 style networks on libtorch.

mod common;

pub mod activation;
pub mod batch_norm;
pub mod channel_shuffle;
pub mod conv_2d;
pub mod conv_bn_2d;
pub mod id_classifier;
pub mod init;
pub mod max_pool_2d;
pub mod shuffle_block;
pub mod up_sample_2d;

pub use activation::*;
pub use batch_norm::*;
pub use channel_shuffle::*;
pub use conv_2d::*;
pub use conv_bn_2d::*;
pub use id_classifier::*;
pub use init::*;
pub use max_pool_2d::*;
pub use shuffle_block::*;
pub use up_sample_2d::*;
