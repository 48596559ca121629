use crate::{
    channel_shuffle::channel_shuffle,
    common::*,
    conv_bn_2d::{ConvBn2D, ConvBn2DInit},
    init::{ParamLayer, ParamLayers},
};

/// The descriptor of a ShuffleNetV2 unit.
///
/// With stride 1, the unit consumes `2 * in_c` channels. Half of them pass
/// through unchanged and the other half, `in_c` channels, are transformed by
/// the major branch into `out_c - in_c` channels.
///
/// With stride 2, both branches consume the full `in_c` input channels. The
/// minor branch keeps `in_c` channels and the major branch produces
/// `out_c - in_c` channels, both at half resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShuffleBlockInit {
    pub in_c: usize,
    pub out_c: usize,
    pub mid_c: usize,
    pub k: usize,
    pub s: usize,
}

impl ShuffleBlockInit {
    pub fn build<'p, P>(self, path: P) -> Result<ShuffleBlock>
    where
        P: Borrow<nn::Path<'p>>,
    {
        let path = path.borrow();
        let Self {
            in_c,
            out_c,
            mid_c,
            k,
            s,
        } = self;

        ensure!(
            s == 1 || s == 2,
            "stride must be either 1 or 2, but get {}",
            s
        );
        ensure!(k % 2 == 1, "kernel size must be odd, but get {}", k);
        ensure!(
            out_c > in_c,
            "out_c ({}) must be greater than in_c ({})",
            out_c,
            in_c
        );
        ensure!(mid_c > 0, "mid_c must be positive");
        if s == 1 {
            ensure!(
                (in_c * 2) % 4 == 0,
                "a stride 1 unit consumes {} channels, which is not divisible by 4",
                in_c * 2
            );
        }

        let major_out_c = out_c - in_c;
        let major = Branch(vec![
            ConvBn2DInit::pointwise(in_c, mid_c).build(path / "major" / "0")?,
            ConvBn2DInit::depthwise(mid_c, k, s).build(path / "major" / "1")?,
            ConvBn2DInit::pointwise(mid_c, major_out_c).build(path / "major" / "2")?,
        ]);

        let minor = if s == 2 {
            Some(Branch(vec![
                ConvBn2DInit::depthwise(in_c, k, s).build(path / "minor" / "0")?,
                ConvBn2DInit::pointwise(in_c, in_c).build(path / "minor" / "1")?,
            ]))
        } else {
            None
        };

        Ok(ShuffleBlock {
            in_c,
            out_c,
            major,
            minor,
        })
    }
}

#[derive(Debug)]
struct Branch(Vec<ConvBn2D>);

impl Branch {
    fn forward_t(&self, xs: &Tensor, train: bool) -> Result<Tensor> {
        self.0
            .iter()
            .try_fold(xs.shallow_clone(), |xs, layer| layer.forward_t(&xs, train))
    }

    fn param_layers(&self) -> impl Iterator<Item = ParamLayer<'_>> {
        self.0.iter().flat_map(|layer| layer.param_layers())
    }
}

#[derive(Debug)]
pub struct ShuffleBlock {
    in_c: usize,
    out_c: usize,
    major: Branch,
    /// Present only on the downsampling unit.
    minor: Option<Branch>,
}

impl ShuffleBlock {
    pub fn forward_t(&self, xs: &Tensor, train: bool) -> Result<Tensor> {
        let Self {
            in_c,
            out_c,
            ref major,
            ref minor,
        } = *self;

        let output = match minor {
            None => {
                let (passthrough, transformed) = channel_shuffle(xs)?;
                let (_, c, _, _) = transformed.size4()?;
                ensure!(
                    c == in_c as i64,
                    "expect {} input channels, but get {}",
                    in_c * 2,
                    c * 2
                );
                let transformed = major.forward_t(&transformed, train)?;
                Tensor::f_cat(&[passthrough, transformed], 1)?
            }
            Some(minor) => {
                let (_, c, _, _) = xs.size4()?;
                ensure!(
                    c == in_c as i64,
                    "expect {} input channels, but get {}",
                    in_c,
                    c
                );
                let left = minor.forward_t(xs, train)?;
                let right = major.forward_t(xs, train)?;
                Tensor::f_cat(&[left, right], 1)?
            }
        };

        let (_, c, _, _) = output.size4()?;
        ensure!(
            c == out_c as i64,
            "expect {} output channels, but get {}",
            out_c,
            c
        );
        Ok(output)
    }

    pub fn stride(&self) -> usize {
        if self.minor.is_some() {
            2
        } else {
            1
        }
    }
}

impl ParamLayers for ShuffleBlock {
    fn param_layers(&self) -> Vec<ParamLayer<'_>> {
        self.minor
            .iter()
            .flat_map(|minor| minor.param_layers())
            .chain(self.major.param_layers())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::kind::FLOAT_CPU;

    #[test]
    fn shuffle_block_downsample() -> Result<()> {
        let vs = nn::VarStore::new(Device::Cpu);
        let root = vs.root();

        let block = ShuffleBlockInit {
            in_c: 24,
            out_c: 48,
            mid_c: 24,
            k: 3,
            s: 2,
        }
        .build(&root / "block")?;
        assert_eq!(block.stride(), 2);
        assert_eq!(block.param_layers().len(), 10);

        let input = Tensor::randn(&[2, 24, 16, 16], FLOAT_CPU);
        let output = block.forward_t(&input, true)?;
        assert_eq!(output.size4()?, (2, 48, 8, 8));
        Ok(())
    }

    #[test]
    fn shuffle_block_preserves_resolution() -> Result<()> {
        let vs = nn::VarStore::new(Device::Cpu);
        let root = vs.root();

        let block = ShuffleBlockInit {
            in_c: 58,
            out_c: 116,
            mid_c: 58,
            k: 3,
            s: 1,
        }
        .build(&root / "block")?;
        assert_eq!(block.stride(), 1);
        assert_eq!(block.param_layers().len(), 6);

        let input = Tensor::randn(&[2, 116, 8, 8], FLOAT_CPU);
        let output = block.forward_t(&input, true)?;
        assert_eq!(output.size4()?, (2, 116, 8, 8));

        // the even channels pass through untouched
        let passthrough = output.narrow(1, 0, 58);
        let expect = input.view([2, 58, 2, 8, 8]).select(2, 0);
        assert!(passthrough.allclose(&expect, 1e-6, 1e-6, false));
        Ok(())
    }

    #[test]
    fn shuffle_block_rejects_indivisible_channels() -> Result<()> {
        let vs = nn::VarStore::new(Device::Cpu);
        let root = vs.root();

        // 2 * 3 input channels are not divisible by 4
        let result = ShuffleBlockInit {
            in_c: 3,
            out_c: 6,
            mid_c: 3,
            k: 3,
            s: 1,
        }
        .build(&root / "odd");
        assert!(result.is_err());

        let block = ShuffleBlockInit {
            in_c: 8,
            out_c: 16,
            mid_c: 8,
            k: 3,
            s: 1,
        }
        .build(&root / "block")?;
        let input = Tensor::randn(&[1, 18, 4, 4], FLOAT_CPU);
        assert!(block.forward_t(&input, false).is_err());
        let input = Tensor::randn(&[1, 24, 4, 4], FLOAT_CPU);
        assert!(block.forward_t(&input, false).is_err());
        Ok(())
    }

    #[test]
    fn shuffle_block_rejects_bad_descriptor() {
        let vs = nn::VarStore::new(Device::Cpu);
        let root = vs.root();
        let base = ShuffleBlockInit {
            in_c: 8,
            out_c: 16,
            mid_c: 8,
            k: 3,
            s: 1,
        };

        assert!(ShuffleBlockInit { s: 3, ..base.clone() }
            .build(&root / "a")
            .is_err());
        assert!(ShuffleBlockInit { k: 2, ..base.clone() }
            .build(&root / "b")
            .is_err());
        assert!(ShuffleBlockInit { out_c: 8, ..base }
            .build(&root / "c")
            .is_err());
    }
}
