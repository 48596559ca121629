use crate::common::*;

#[derive(Debug, Clone)]
pub struct DetectionHeadInit {
    /// The channels of the backbone feature fed to the head.
    pub in_c: usize,
    /// The channels after the projection.
    pub mid_c: usize,
    pub detection_c: usize,
    pub embedding_c: usize,
}

impl DetectionHeadInit {
    pub fn build<'p, P>(self, path: P) -> Result<DetectionHead>
    where
        P: Borrow<nn::Path<'p>>,
    {
        let path = path.borrow();
        let Self {
            in_c,
            mid_c,
            detection_c,
            embedding_c,
        } = self;

        let projection = ConvBn2DInit::pointwise(in_c, mid_c).build(path / "projection")?;
        let block = ShuffleBlockInit {
            in_c: mid_c / 2,
            out_c: mid_c,
            mid_c: mid_c / 2,
            k: 3,
            s: 1,
        }
        .build(path / "block")?;
        let detection = Conv2DInit::new(1).build(path / "detection", mid_c, detection_c)?;
        let embedding = Conv2DInit::new(3).build(path / "embedding", mid_c, embedding_c)?;

        Ok(DetectionHead {
            mid_c,
            projection,
            block,
            detection,
            embedding,
        })
    }
}

#[derive(Debug, TensorLike)]
pub struct DetectionHeadOutput {
    /// Detection and embedding channels concatenated.
    pub output: Tensor,
    /// The processed feature passed to the next finer head.
    pub feature: Tensor,
}

#[derive(Debug)]
pub struct DetectionHead {
    mid_c: usize,
    projection: ConvBn2D,
    block: ShuffleBlock,
    detection: Conv2D,
    embedding: Conv2D,
}

impl DetectionHead {
    /// Runs the head on a backbone feature.
    ///
    /// The upsampled feature of the coarser head, if any, is added to the
    /// projected input before the shuffle unit.
    pub fn forward_t(
        &self,
        xs: &Tensor,
        top_down: Option<&Tensor>,
        train: bool,
    ) -> Result<DetectionHeadOutput> {
        let Self {
            projection,
            block,
            detection,
            embedding,
            ..
        } = self;

        let xs = projection.forward_t(xs, train)?;
        let xs = match top_down {
            Some(top_down) => {
                ensure!(
                    xs.size() == top_down.size(),
                    "cannot fuse top-down feature of shape {:?} into lateral feature of shape {:?}",
                    top_down.size(),
                    xs.size()
                );
                xs.f_add(top_down)?
            }
            None => xs,
        };
        let feature = block.forward_t(&xs, train)?;

        let det = detection.forward(&feature)?;
        let emb = embedding.forward(&feature)?;
        let output = Tensor::f_cat(&[det, emb], 1)?;

        Ok(DetectionHeadOutput { output, feature })
    }

    pub fn mid_c(&self) -> usize {
        self.mid_c
    }
}

impl ParamLayers for DetectionHead {
    fn param_layers(&self) -> Vec<ParamLayer<'_>> {
        let Self {
            projection,
            block,
            detection,
            embedding,
            ..
        } = self;

        projection
            .param_layers()
            .into_iter()
            .chain(block.param_layers())
            .chain([ParamLayer::Conv2D(detection), ParamLayer::Conv2D(embedding)])
            .collect()
    }
}
