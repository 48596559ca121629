use crate::common::*;

pub use conv_2d_::*;
pub use conv_2d_init::*;

mod conv_2d_init {
    use super::*;

    #[derive(Debug, Clone)]
    pub struct Conv2DInit {
        pub ksize: usize,
        pub stride: usize,
        pub padding: usize,
        pub groups: usize,
        pub bias: bool,
        pub ws_init: nn::Init,
        pub bs_init: nn::Init,
    }

    impl Conv2DInit {
        pub fn new(ksize: usize) -> Self {
            Self {
                ksize,
                stride: 1,
                padding: ksize / 2,
                groups: 1,
                bias: true,
                ws_init: nn::Init::KaimingUniform,
                bs_init: nn::Init::Const(0.0),
            }
        }

        /// A depthwise convolution, one group per channel.
        pub fn depthwise(ksize: usize, stride: usize, channels: usize) -> Self {
            Self {
                stride,
                groups: channels,
                bias: false,
                ..Self::new(ksize)
            }
        }

        pub fn build<'a>(
            self,
            path: impl Borrow<nn::Path<'a>>,
            in_dim: usize,
            out_dim: usize,
        ) -> Result<Conv2D> {
            let Self {
                ksize,
                stride,
                padding,
                groups,
                bias,
                ws_init,
                bs_init,
            } = self;

            ensure!(ksize > 0, "ksize must be positive");
            ensure!(stride > 0, "stride must be positive");
            ensure!(
                groups > 0 && in_dim % groups == 0,
                "in_dim {} must be multiple of groups {}",
                in_dim,
                groups
            );
            ensure!(
                out_dim % groups == 0,
                "out_dim {} must be multiple of groups {}",
                out_dim,
                groups
            );

            let path = path.borrow();
            let in_dim = in_dim as i64;
            let out_dim = out_dim as i64;
            let ksize = ksize as i64;
            let groups = groups as i64;

            let bias = bias.then(|| path.var("bias", &[out_dim], bs_init));
            let weight = path.var(
                "weight",
                &[out_dim, in_dim / groups, ksize, ksize],
                ws_init,
            );

            Ok(Conv2D {
                stride: [stride as i64; 2],
                padding: [padding as i64; 2],
                groups,
                weight,
                bias,
            })
        }
    }
}

mod conv_2d_ {
    use super::*;

    #[derive(Debug)]
    pub struct Conv2D {
        pub(super) stride: [i64; 2],
        pub(super) padding: [i64; 2],
        pub(super) groups: i64,
        pub(super) weight: Tensor,
        pub(super) bias: Option<Tensor>,
    }

    impl Conv2D {
        pub fn forward(&self, input: &Tensor) -> Result<Tensor> {
            let Self {
                ref stride,
                ref padding,
                groups,
                ref weight,
                ref bias,
            } = *self;

            let output = input.f_convolution(
                weight,
                bias.as_ref(),
                stride,
                padding,
                &[1, 1],
                false,
                &[0, 0],
                groups,
            )?;
            Ok(output)
        }

        pub fn weight(&self) -> &Tensor {
            &self.weight
        }

        pub fn bias(&self) -> Option<&Tensor> {
            self.bias.as_ref()
        }

        /// Draws weights from N(0, 1) scaled by 2 / numel and zeros the bias.
        pub fn reset_parameters(&self) {
            tch::no_grad(|| {
                let mut weight = self.weight.shallow_clone();
                let scale = 2.0 / weight.numel() as f64;
                let _ = weight.normal_(0.0, 1.0);
                weight.copy_(&(&weight * scale));

                if let Some(bias) = &self.bias {
                    let _ = bias.shallow_clone().zero_();
                }
            });
        }

        pub fn has_nan(&self) -> bool {
            bool::from(self.weight.isnan().any())
                || self
                    .bias
                    .as_ref()
                    .map_or(false, |bias| bool::from(bias.isnan().any()))
        }
    }
}
