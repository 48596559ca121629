use super::stage::{ShuffleStage, ShuffleStageInit};
use crate::common::*;

/// The number of units in backbone stages 2 to 5.
pub const STAGE_REPEATS: [usize; 4] = [4, 8, 4, 4];

/// The overall stride of the deepest backbone feature.
pub const BACKBONE_STRIDE: usize = 32;

#[derive(Debug, Clone)]
pub struct BackboneInit {
    pub in_c: usize,
    pub stage_channels: StageChannels,
}

impl BackboneInit {
    pub fn new(model_size: ModelSize) -> Self {
        Self {
            in_c: 3,
            stage_channels: model_size.stage_channels(),
        }
    }

    pub fn build<'p, P>(self, path: P) -> Result<Backbone>
    where
        P: Borrow<nn::Path<'p>>,
    {
        let path = path.borrow();
        let Self {
            in_c,
            stage_channels,
        } = self;

        let stem_c = stage_channels.stage(1)?;
        let conv1 = ConvBn2DInit::new(in_c, stem_c, 3).build(path / "conv1")?;
        let maxpool = MaxPool2D::new(3, 2, 1)?;

        let (stages, _) = STAGE_REPEATS.iter().enumerate().try_fold(
            (vec![], stem_c),
            |(mut stages, in_c), (index, &repeats)| -> Result<_> {
                let stage_index = index + 2;
                let out_c = stage_channels.stage(stage_index)?;
                let stage = ShuffleStageInit {
                    in_c,
                    out_c,
                    repeats,
                    k: 3,
                }
                .build(path / format!("stage{}", stage_index))
                .with_context(|| format!("unable to build backbone stage {}", stage_index))?;
                stages.push(stage);
                Ok((stages, out_c))
            },
        )?;

        Ok(Backbone {
            conv1,
            maxpool,
            stages,
        })
    }
}

/// The feature maps at strides 8, 16 and 32.
#[derive(Debug, TensorLike)]
pub struct BackboneOutput {
    pub stage3: Tensor,
    pub stage4: Tensor,
    pub stage5: Tensor,
}

#[derive(Debug)]
pub struct Backbone {
    conv1: ConvBn2D,
    maxpool: MaxPool2D,
    /// Stages 2 to 5 in order.
    stages: Vec<ShuffleStage>,
}

impl Backbone {
    pub fn forward_t(&self, xs: &Tensor, train: bool) -> Result<BackboneOutput> {
        let Self {
            conv1,
            maxpool,
            stages,
        } = self;

        let xs = conv1.forward_t(xs, train)?;
        let xs = maxpool.forward(&xs)?;

        let mut features = vec![];
        stages.iter().try_fold(xs, |xs, stage| -> Result<_> {
            let xs = stage.forward_t(&xs, train)?;
            features.push(xs.shallow_clone());
            Ok(xs)
        })?;

        let (stage3, stage4, stage5) = features
            .into_iter()
            .skip(1)
            .collect_tuple()
            .ok_or_else(|| format_err!("the backbone must have exactly four stages"))?;

        Ok(BackboneOutput {
            stage3,
            stage4,
            stage5,
        })
    }
}

impl ParamLayers for Backbone {
    fn param_layers(&self) -> Vec<ParamLayer<'_>> {
        self.conv1
            .param_layers()
            .into_iter()
            .chain(self.stages.iter().flat_map(|stage| stage.param_layers()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::kind::FLOAT_CPU;

    #[test]
    fn backbone_feature_pyramid() -> Result<()> {
        let vs = nn::VarStore::new(Device::Cpu);
        let backbone = BackboneInit::new(ModelSize::X0_5).build(&vs.root() / "backbone")?;

        let BackboneOutput {
            stage3,
            stage4,
            stage5,
        } = backbone.forward_t(&Tensor::randn(&[2, 3, 64, 96], FLOAT_CPU), true)?;
        assert_eq!(stage3.size4()?, (2, 96, 8, 12));
        assert_eq!(stage4.size4()?, (2, 192, 4, 6));
        assert_eq!(stage5.size4()?, (2, 384, 2, 3));
        Ok(())
    }
}
