use super::{
    backbone::{Backbone, BackboneInit, BackboneOutput, BACKBONE_STRIDE},
    head::{DetectionHead, DetectionHeadInit, DetectionHeadOutput},
};
use crate::{
    common::*,
    loss::{JdeCriterion, JdeLossOutput},
};

/// The construction parameters of [JdeModel].
#[derive(Debug, Clone)]
pub struct JdeModelInit {
    pub anchors: Anchors,
    pub num_classes: usize,
    /// The number of identities. Zero disables the identity classifier.
    pub num_ids: usize,
    pub model_size: ModelSize,
}

impl JdeModelInit {
    pub fn from_config(config: &ModelConfig) -> Self {
        let ModelConfig {
            model_size,
            num_classes,
            num_ids,
            ref anchors,
        } = *config;

        Self {
            anchors: anchors.clone(),
            num_classes,
            num_ids,
            model_size,
        }
    }

    pub fn build<'p, P>(self, path: P) -> Result<JdeModel>
    where
        P: Borrow<nn::Path<'p>>,
    {
        let path = path.borrow();
        let Self {
            anchors,
            num_classes,
            num_ids,
            model_size,
        } = self;

        ensure!(
            num_classes >= 1,
            "num_classes must be at least 1, but get {}",
            num_classes
        );

        let stage_channels = model_size.stage_channels();
        let detection_c = detection_channels(num_classes);

        let backbone = BackboneInit {
            in_c: 3,
            stage_channels,
        }
        .build(path / "backbone")?;

        // heads from the coarsest to the finest, fed by stages 5, 4 and 3
        let heads: Vec<_> = [(5, 6), (4, 7), (3, 8)]
            .into_iter()
            .enumerate()
            .map(|(index, (in_stage, mid_stage))| -> Result<_> {
                let head = DetectionHeadInit {
                    in_c: stage_channels.stage(in_stage)?,
                    mid_c: stage_channels.stage(mid_stage)?,
                    detection_c,
                    embedding_c: EMBEDDING_CHANNELS,
                }
                .build(path / format!("head{}", index + 1))
                .with_context(|| format!("unable to build detection head {}", index + 1))?;
                Ok(head)
            })
            .try_collect()?;

        heads
            .iter()
            .tuple_windows()
            .try_for_each(|(coarse, fine)| -> Result<_> {
                ensure!(
                    coarse.mid_c() == fine.mid_c(),
                    "top-down fusion requires equal head widths, but get {} and {}",
                    coarse.mid_c(),
                    fine.mid_c()
                );
                Ok(())
            })?;

        let classifier = IdClassifierInit {
            in_c: EMBEDDING_CHANNELS,
            num_ids,
        }
        .build(path / "classifier");

        let model = JdeModel {
            anchors,
            num_classes,
            model_size,
            backbone,
            heads,
            upsample: UpSample2D::new(2.0)?,
            classifier,
        };

        let num_layers = model.init_weights();
        info!(
            "built ShuffleNetV2 {} JDE model with {} classes and {} identities, {} layers initialized",
            model_size, num_classes, num_ids, num_layers
        );

        Ok(model)
    }
}

/// The ShuffleNetV2 detector with joint detection and embedding heads.
#[derive(Debug)]
pub struct JdeModel {
    anchors: Anchors,
    num_classes: usize,
    model_size: ModelSize,
    backbone: Backbone,
    /// Heads at strides 32, 16 and 8.
    heads: Vec<DetectionHead>,
    upsample: UpSample2D,
    classifier: IdClassifier,
}

impl JdeModel {
    /// Computes the raw outputs of the three heads, from the coarsest to the finest.
    ///
    /// Each output has `(5 + num_classes) * 4` detection channels followed by
    /// 512 embedding channels.
    pub fn forward_t(&self, xs: &Tensor, train: bool) -> Result<Vec<Tensor>> {
        #[cfg(debug_assertions)]
        ensure!(!self.has_nan(), "model parameters contain NaN");

        let BackboneOutput {
            stage3,
            stage4,
            stage5,
        } = self.backbone.forward_t(xs, train)?;

        let num_heads = self.heads.len();
        let mut outputs = Vec::with_capacity(NUM_HEADS);
        let mut top_down: Option<Tensor> = None;

        let features = [stage5, stage4, stage3];

        for (index, (head, feature)) in izip!(&self.heads, features).enumerate() {
            let DetectionHeadOutput {
                output,
                feature: head_feature,
            } = head.forward_t(&feature, top_down.as_ref(), train)?;
            outputs.push(output);

            if index + 1 < num_heads {
                top_down = Some(self.upsample.forward(&head_feature)?);
            }
        }

        Ok(outputs)
    }

    /// Runs a training forward pass and delegates the loss to the criterion.
    pub fn forward_loss<C>(
        &self,
        xs: &Tensor,
        targets: &C::Target,
        frame_size: FrameSize,
        criterion: &C,
    ) -> Result<JdeLossOutput>
    where
        C: JdeCriterion,
    {
        let outputs = self.forward_t(xs, true)?;
        criterion.forward(&outputs, targets, frame_size, &self.classifier)
    }

    /// Splits a head output into its detection and embedding parts.
    pub fn split_output(&self, output: &Tensor) -> Result<(Tensor, Tensor)> {
        let (_, channels, _, _) = output.size4()?;
        let detection_c = self.detection_channels() as i64;
        let expect_c = detection_c + EMBEDDING_CHANNELS as i64;
        ensure!(
            channels == expect_c,
            "expect {} output channels, but get {}",
            expect_c,
            channels
        );

        let det = output.f_narrow(1, 0, detection_c)?;
        let emb = output.f_narrow(1, detection_c, EMBEDDING_CHANNELS as i64)?;
        Ok((det, emb))
    }

    /// The output shapes of the heads for an input batch, without running the network.
    pub fn output_shapes(
        &self,
        batch_size: usize,
        frame_size: FrameSize,
    ) -> Result<Vec<[i64; 4]>> {
        let FrameSize { h, w } = frame_size;
        ensure!(
            h % BACKBONE_STRIDE == 0 && w % BACKBONE_STRIDE == 0,
            "frame size {} must be a multiple of {}",
            frame_size,
            BACKBONE_STRIDE
        );

        let channels = self.output_channels() as i64;
        let shapes = [32, 16, 8]
            .into_iter()
            .map(|stride| {
                [
                    batch_size as i64,
                    channels,
                    (h / stride) as i64,
                    (w / stride) as i64,
                ]
            })
            .collect();
        Ok(shapes)
    }

    /// Re-initializes every convolution and batch norm of the model.
    pub fn init_weights(&self) -> usize {
        init_weights(self.param_layers())
    }

    /// Checks every convolution and batch norm for NaN values.
    pub fn has_nan(&self) -> bool {
        self.param_layers().iter().any(|layer| layer.has_nan())
    }

    pub fn anchors(&self) -> &Anchors {
        &self.anchors
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    pub fn model_size(&self) -> ModelSize {
        self.model_size
    }

    pub fn classifier(&self) -> &IdClassifier {
        &self.classifier
    }

    pub fn detection_channels(&self) -> usize {
        detection_channels(self.num_classes)
    }

    pub fn output_channels(&self) -> usize {
        self.detection_channels() + EMBEDDING_CHANNELS
    }
}

impl ParamLayers for JdeModel {
    fn param_layers(&self) -> Vec<ParamLayer<'_>> {
        self.backbone
            .param_layers()
            .into_iter()
            .chain(self.heads.iter().flat_map(|head| head.param_layers()))
            .collect()
    }
}
