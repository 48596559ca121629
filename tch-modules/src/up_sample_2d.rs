use crate::common::*;

/// Nearest neighbor upsampling by a fixed scale.
#[derive(Debug, Clone)]
pub struct UpSample2D {
    scale: f64,
}

impl UpSample2D {
    pub fn new(scale: f64) -> Result<Self> {
        ensure!(
            scale.is_finite() && scale.is_sign_positive(),
            "invalid scale value"
        );
        Ok(Self { scale })
    }

    pub fn forward(&self, input: &Tensor) -> Result<Tensor> {
        let Self { scale } = *self;
        let (_b, _c, in_h, in_w) = input.size4()?;
        let out_h = (in_h as f64 * scale) as i64;
        let out_w = (in_w as f64 * scale) as i64;
        let output = input.f_upsample_nearest2d(&[out_h, out_w], None, None)?;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::kind::FLOAT_CPU;

    #[test]
    fn up_sample_2d_nearest() -> Result<()> {
        let input = Tensor::arange(4, FLOAT_CPU).view([1, 1, 2, 2]);
        let output = UpSample2D::new(2.0)?.forward(&input)?;
        assert_eq!(output.size4()?, (1, 1, 4, 4));
        assert_eq!(f64::from(output.i((0, 0, 1, 1))), 0.0);
        assert_eq!(f64::from(output.i((0, 0, 0, 3))), 1.0);
        assert_eq!(f64::from(output.i((0, 0, 3, 0))), 2.0);
        assert_eq!(f64::from(output.i((0, 0, 2, 2))), 3.0);

        assert!(UpSample2D::new(-1.0).is_err());
        assert!(UpSample2D::new(f64::NAN).is_err());
        Ok(())
    }
}
