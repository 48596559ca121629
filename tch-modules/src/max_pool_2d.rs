use crate::common::*;

#[derive(Debug, Clone)]
pub struct MaxPool2D {
    ksize: i64,
    stride: i64,
    padding: i64,
}

impl MaxPool2D {
    pub fn new(ksize: usize, stride: usize, padding: usize) -> Result<Self> {
        ensure!(ksize > 0 && stride > 0, "ksize and stride must be positive");
        ensure!(
            padding <= ksize / 2,
            "padding must not exceed half of ksize"
        );
        Ok(Self {
            ksize: ksize as i64,
            stride: stride as i64,
            padding: padding as i64,
        })
    }

    pub fn forward(&self, input: &Tensor) -> Result<Tensor> {
        let Self {
            ksize: k,
            stride: s,
            padding: p,
        } = *self;
        let output = input.f_max_pool2d(&[k, k], &[s, s], &[p, p], &[1, 1], false)?;
        Ok(output)
    }
}
