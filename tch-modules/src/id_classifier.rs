use crate::common::*;

/// Projects embeddings to identity logits.
#[derive(Debug, Clone)]
pub struct IdClassifierInit {
    pub in_c: usize,
    pub num_ids: usize,
}

impl IdClassifierInit {
    pub fn build<'p, P>(self, path: P) -> IdClassifier
    where
        P: Borrow<nn::Path<'p>>,
    {
        let path = path.borrow();
        let Self { in_c, num_ids } = self;

        if num_ids == 0 {
            debug!("identity classifier disabled");
            return IdClassifier::Identity;
        }

        let linear = nn::linear(
            path / "linear",
            in_c as i64,
            num_ids as i64,
            Default::default(),
        );
        IdClassifier::Linear(linear)
    }
}

/// The identity classifier shared by the detection heads.
///
/// Without identities it degenerates into a pass-through.
#[derive(Debug)]
pub enum IdClassifier {
    Linear(nn::Linear),
    Identity,
}

impl IdClassifier {
    pub fn is_identity(&self) -> bool {
        matches!(self, Self::Identity)
    }

    /// The number of identity classes, or `None` for the pass-through.
    pub fn num_ids(&self) -> Option<usize> {
        match self {
            Self::Linear(linear) => Some(linear.ws.size()[0] as usize),
            Self::Identity => None,
        }
    }

    pub fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        let output = match self {
            Self::Linear(linear) => {
                let expect_c = linear.ws.size()[1];
                let in_c = xs.size().last().copied();
                ensure!(
                    in_c == Some(expect_c),
                    "expect {} embedding channels in the last dimension, but get shape {:?}",
                    expect_c,
                    xs.size()
                );
                linear.forward(xs)
            }
            Self::Identity => xs.shallow_clone(),
        };
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::kind::FLOAT_CPU;

    #[test]
    fn id_classifier_disabled_is_identity() -> Result<()> {
        let vs = nn::VarStore::new(Device::Cpu);
        let classifier = IdClassifierInit {
            in_c: 512,
            num_ids: 0,
        }
        .build(&vs.root() / "classifier");
        assert!(classifier.is_identity());
        assert_eq!(classifier.num_ids(), None);
        assert!(vs.trainable_variables().is_empty());

        let input = Tensor::randn(&[7, 512], FLOAT_CPU);
        let output = classifier.forward(&input)?;
        assert_eq!(output.size(), input.size());
        assert!(output.equal(&input));
        Ok(())
    }

    #[test]
    fn id_classifier_projects_embeddings() -> Result<()> {
        let vs = nn::VarStore::new(Device::Cpu);
        let classifier = IdClassifierInit {
            in_c: 512,
            num_ids: 100,
        }
        .build(&vs.root() / "classifier");
        assert_eq!(classifier.num_ids(), Some(100));

        let output = classifier.forward(&Tensor::randn(&[7, 512], FLOAT_CPU))?;
        assert_eq!(output.size2()?, (7, 100));
        assert!(classifier
            .forward(&Tensor::randn(&[7, 128], FLOAT_CPU))
            .is_err());
        Ok(())
    }

    #[test]
    fn id_classifier_maps_last_dimension() -> Result<()> {
        let vs = nn::VarStore::new(Device::Cpu);
        let classifier = IdClassifierInit {
            in_c: 512,
            num_ids: 100,
        }
        .build(&vs.root() / "classifier");

        let output = classifier.forward(&Tensor::randn(&[4, 3, 512], FLOAT_CPU))?;
        assert_eq!(output.size(), [4, 3, 100]);

        let output = classifier.forward(&Tensor::randn(&[512], FLOAT_CPU))?;
        assert_eq!(output.size(), [100]);

        assert!(classifier
            .forward(&Tensor::randn(&[4, 512, 3], FLOAT_CPU))
            .is_err());
        Ok(())
    }
}
