//! The seam between the model and the joint detection and embedding loss.

use crate::common::*;

/// A loss function consuming the raw head outputs.
///
/// Implementors own label assignment, box matching and the weighting of the
/// identity loss. The model only hands over its outputs, the shared
/// identity classifier and the frame size the targets refer to.
pub trait JdeCriterion {
    type Target;

    fn forward(
        &self,
        outputs: &[Tensor],
        targets: &Self::Target,
        frame_size: FrameSize,
        classifier: &IdClassifier,
    ) -> Result<JdeLossOutput>;
}

/// The scalar loss and its components.
#[derive(Debug, TensorLike)]
pub struct JdeLossOutput {
    pub total_loss: Tensor,
    pub detection_loss: Tensor,
    pub identity_loss: Tensor,
}

impl JdeLossOutput {
    /// Combines the components by summation.
    pub fn from_components(detection_loss: Tensor, identity_loss: Tensor) -> Result<Self> {
        let total_loss = detection_loss.f_add(&identity_loss)?;
        Ok(Self {
            total_loss,
            detection_loss,
            identity_loss,
        })
    }
}
