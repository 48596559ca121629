use crate::common::*;

/// A cascade of ShuffleNetV2 units.
///
/// The first unit halves the resolution and widens the input to `out_c`
/// channels. The remaining units keep both resolution and width.
#[derive(Debug, Clone)]
pub struct ShuffleStageInit {
    pub in_c: usize,
    pub out_c: usize,
    pub repeats: usize,
    pub k: usize,
}

impl ShuffleStageInit {
    pub fn build<'p, P>(self, path: P) -> Result<ShuffleStage>
    where
        P: Borrow<nn::Path<'p>>,
    {
        let path = path.borrow();
        let Self {
            in_c,
            out_c,
            repeats,
            k,
        } = self;
        ensure!(repeats >= 1, "a stage must have at least one unit");

        let mid_c = out_c / 2;
        let blocks: Vec<_> = (0..repeats)
            .map(|index| {
                let init = if index == 0 {
                    ShuffleBlockInit {
                        in_c,
                        out_c,
                        mid_c,
                        k,
                        s: 2,
                    }
                } else {
                    ShuffleBlockInit {
                        in_c: out_c / 2,
                        out_c,
                        mid_c,
                        k,
                        s: 1,
                    }
                };
                init.build(path / index.to_string())
                    .with_context(|| format!("unable to build unit {} of the stage", index))
            })
            .try_collect()?;

        Ok(ShuffleStage { blocks })
    }
}

#[derive(Debug)]
pub struct ShuffleStage {
    blocks: Vec<ShuffleBlock>,
}

impl ShuffleStage {
    pub fn forward_t(&self, xs: &Tensor, train: bool) -> Result<Tensor> {
        self.blocks
            .iter()
            .try_fold(xs.shallow_clone(), |xs, block| block.forward_t(&xs, train))
    }

    pub fn blocks(&self) -> &[ShuffleBlock] {
        &self.blocks
    }
}

impl ParamLayers for ShuffleStage {
    fn param_layers(&self) -> Vec<ParamLayer<'_>> {
        self.blocks
            .iter()
            .flat_map(|block| block.param_layers())
            .collect()
    }
}
