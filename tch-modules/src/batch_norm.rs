use crate::common::*;

#[cfg(debug_assertions)]
static SMALL_VAR_WARN: Once = Once::new();

#[derive(Debug, Clone)]
pub struct BatchNormInit {
    pub cudnn_enabled: bool,
    pub eps: R64,
    pub momentum: R64,
    pub ws_init: nn::Init,
    pub bs_init: nn::Init,
}

impl Default for BatchNormInit {
    fn default() -> Self {
        Self {
            cudnn_enabled: true,
            eps: r64(1e-5),
            momentum: r64(0.1),
            ws_init: nn::Init::Const(1.0),
            bs_init: nn::Init::Const(0.0),
        }
    }
}

impl BatchNormInit {
    pub fn build<'a>(self, path: impl Borrow<nn::Path<'a>>, out_dim: i64) -> BatchNorm {
        let path = path.borrow();
        let Self {
            cudnn_enabled,
            eps,
            momentum,
            ws_init,
            bs_init,
        } = self;

        BatchNorm {
            running_mean: path.zeros_no_train("running_mean", &[out_dim]),
            running_var: path.ones_no_train("running_var", &[out_dim]),
            ws: path.var("weight", &[out_dim], ws_init),
            bs: path.var("bias", &[out_dim], bs_init),
            cudnn_enabled,
            eps: eps.raw(),
            momentum: momentum.raw(),
        }
    }
}

#[derive(Debug)]
pub struct BatchNorm {
    running_mean: Tensor,
    running_var: Tensor,
    ws: Tensor,
    bs: Tensor,
    cudnn_enabled: bool,
    eps: f64,
    momentum: f64,
}

impl nn::ModuleT for BatchNorm {
    fn forward_t(&self, input: &Tensor, train: bool) -> Tensor {
        let Self {
            ref running_mean,
            ref running_var,
            ref ws,
            ref bs,
            momentum,
            eps,
            cudnn_enabled,
        } = *self;

        #[cfg(debug_assertions)]
        if !train && bool::from(running_var.abs().le(1e-15).any()) {
            SMALL_VAR_WARN.call_once(|| {
                warn!(
                    "running variance {} is too small for inference",
                    f64::from(running_var.abs().min())
                );
            });
        }

        Tensor::batch_norm(
            input,
            Some(ws),
            Some(bs),
            Some(running_mean),
            Some(running_var),
            train,
            momentum,
            eps,
            cudnn_enabled,
        )
    }
}

impl BatchNorm {
    /// Resets the affine parameters to identity and zeros the running statistics.
    pub fn reset_parameters(&self) {
        tch::no_grad(|| {
            let _ = self.ws.shallow_clone().fill_(1.0);
            let _ = self.bs.shallow_clone().zero_();
            let _ = self.running_mean.shallow_clone().zero_();
            let _ = self.running_var.shallow_clone().zero_();
        });
    }

    pub fn has_nan(&self) -> bool {
        let Self {
            ws,
            bs,
            running_mean,
            running_var,
            ..
        } = self;

        [ws, bs, running_mean, running_var]
            .into_iter()
            .any(|tensor| bool::from(tensor.isnan().any()))
    }

    pub fn weight(&self) -> &Tensor {
        &self.ws
    }

    pub fn bias(&self) -> &Tensor {
        &self.bs
    }

    pub fn running_mean(&self) -> &Tensor {
        &self.running_mean
    }

    pub fn running_var(&self) -> &Tensor {
        &self.running_var
    }
}
