use crate::{
    common::*,
    dtype::DType,
    kernel::{BuildConfig, ComputeGraph, DecodeParams, DecoderKernel, TensorDesc},
};

/// The default operator name.
pub const DEFAULT_KERNEL_NAME: &str = "JDEcoder";

/// The build parameters of the `JDEcoder` operator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecoderInit {
    /// The shape of the input tensor.
    pub shape: Vec<usize>,
    /// The element type name, either `float16` or `float32`, case-insensitive.
    pub dtype: String,
    pub num_classes: i64,
    pub num_boxes: usize,
    pub conf_thresh: R64,
    pub iou_thresh: R64,
    /// Interleaved anchor widths and heights.
    pub biases: Vec<R64>,
    /// Anchor indices grouped per scale.
    pub masks: Vec<usize>,
    /// The stride of each scale.
    pub strides: Vec<usize>,
    #[serde(default = "default_kernel_name")]
    pub kernel_name: String,
    #[serde(default = "default_need_build")]
    pub need_build: bool,
    #[serde(default)]
    pub need_print: bool,
}

fn default_kernel_name() -> String {
    DEFAULT_KERNEL_NAME.to_owned()
}

fn default_need_build() -> bool {
    true
}

impl DecoderInit {
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("unable to read file '{}'", path.display()))?;
        let init = json5::from_str(&text)
            .with_context(|| format!("unable to parse decoder file '{}'", path.display()))?;
        Ok(init)
    }

    /// Validates the parameters and builds the operator kernel.
    pub fn build(self) -> Result<DecoderKernel> {
        let Self {
            shape,
            dtype,
            num_classes,
            num_boxes,
            conf_thresh,
            iou_thresh,
            biases,
            masks,
            strides,
            kernel_name,
            need_build,
            need_print,
        } = self;

        let dtype: DType = dtype.parse()?;
        ensure!(
            num_classes >= 1,
            "num_classes must be at least 1, but get {}",
            num_classes
        );

        let input = TensorDesc {
            name: "inp_tensor".to_owned(),
            shape,
            dtype,
        };
        let graph = ComputeGraph::identity(input);
        let config = BuildConfig {
            print_ir: need_print,
            need_build,
            name: kernel_name,
            tensor_list: graph.tensor_list(),
        };
        let params = DecodeParams {
            num_classes: num_classes as usize,
            num_boxes,
            conf_thresh,
            iou_thresh,
            biases,
            masks,
            strides,
        };

        DecoderKernel::build(graph, config, params)
    }
}

impl Default for DecoderInit {
    /// The 1088x608 single-class tracker configuration with twelve anchors.
    fn default() -> Self {
        let biases = [
            6, 16, 8, 23, 11, 32, 16, 45, 21, 64, 30, 90, 43, 128, 60, 180, 85, 255, 120, 360, 170,
            420, 340, 320,
        ];

        Self {
            shape: vec![1, 536, 10, 18],
            dtype: "float16".to_owned(),
            num_classes: 1,
            num_boxes: 4,
            conf_thresh: r64(0.5),
            iou_thresh: r64(0.45),
            biases: biases.iter().map(|&value| r64(value as f64)).collect(),
            masks: vec![8, 9, 10, 11, 4, 5, 6, 7, 0, 1, 2, 3],
            strides: vec![32, 16, 8],
            kernel_name: default_kernel_name(),
            need_build: true,
            need_print: false,
        }
    }
}
