use crate::{
    activation::Activation,
    batch_norm::{BatchNorm, BatchNormInit},
    common::*,
    conv_2d::{Conv2D, Conv2DInit},
    init::{ParamLayer, ParamLayers},
};

/// Convolution without bias, followed by batch norm and activation.
#[derive(Debug, Clone)]
pub struct ConvBn2DInit {
    pub in_c: usize,
    pub out_c: usize,
    pub conv: Conv2DInit,
    pub bn: BatchNormInit,
    pub activation: Activation,
}

impl ConvBn2DInit {
    pub fn new(in_c: usize, out_c: usize, k: usize) -> Self {
        Self {
            in_c,
            out_c,
            conv: Conv2DInit {
                bias: false,
                ..Conv2DInit::new(k)
            },
            bn: Default::default(),
            activation: Activation::Relu,
        }
    }

    /// A 1x1 pointwise projection with ReLU.
    pub fn pointwise(in_c: usize, out_c: usize) -> Self {
        Self::new(in_c, out_c, 1)
    }

    /// A depthwise convolution without activation.
    pub fn depthwise(c: usize, k: usize, s: usize) -> Self {
        Self {
            conv: Conv2DInit::depthwise(k, s, c),
            activation: Activation::Linear,
            ..Self::new(c, c, k)
        }
    }

    pub fn build<'p, P>(self, path: P) -> Result<ConvBn2D>
    where
        P: Borrow<nn::Path<'p>>,
    {
        let path = path.borrow();

        let Self {
            in_c,
            out_c,
            conv,
            bn,
            activation,
        } = self;

        let conv = conv.build(path / "conv", in_c, out_c)?;
        let bn = bn.build(path / "bn", out_c as i64);

        Ok(ConvBn2D {
            conv,
            bn,
            activation,
        })
    }
}

#[derive(Debug)]
pub struct ConvBn2D {
    conv: Conv2D,
    bn: BatchNorm,
    activation: Activation,
}

impl ConvBn2D {
    pub fn forward_t(&self, xs: &Tensor, train: bool) -> Result<Tensor> {
        let Self {
            ref conv,
            ref bn,
            activation,
        } = *self;

        let xs = conv.forward(xs)?;
        let xs = bn.forward_t(&xs, train);
        Ok(activation.forward(&xs))
    }

    pub fn conv(&self) -> &Conv2D {
        &self.conv
    }

    pub fn bn(&self) -> &BatchNorm {
        &self.bn
    }
}

impl ParamLayers for ConvBn2D {
    fn param_layers(&self) -> Vec<ParamLayer<'_>> {
        vec![ParamLayer::Conv2D(&self.conv), ParamLayer::BatchNorm(&self.bn)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::kind::FLOAT_CPU;

    #[test]
    fn conv_bn_2d_relu_output() -> Result<()> {
        let vs = nn::VarStore::new(Device::Cpu);
        let root = vs.root();

        let block = ConvBn2DInit::new(3, 24, 3).build(&root / "conv1")?;
        assert!(block.conv().bias().is_none());

        let input = Tensor::randn(&[2, 3, 32, 32], FLOAT_CPU);
        let output = block.forward_t(&input, true)?;
        assert_eq!(output.size4()?, (2, 24, 32, 32));
        assert!(f64::from(output.min()) >= 0.0);
        Ok(())
    }

    #[test]
    fn conv_bn_2d_depthwise_stride() -> Result<()> {
        let vs = nn::VarStore::new(Device::Cpu);
        let root = vs.root();

        let block = ConvBn2DInit::depthwise(16, 3, 2).build(&root / "dw")?;
        let input = Tensor::randn(&[2, 16, 10, 10], FLOAT_CPU);
        let output = block.forward_t(&input, true)?;
        assert_eq!(output.size4()?, (2, 16, 5, 5));
        assert!(f64::from(output.min()) < 0.0);
        Ok(())
    }
}
