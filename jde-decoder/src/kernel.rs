use crate::{common::*, dtype::DType};

/// A named tensor in the operator graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TensorDesc {
    pub name: String,
    pub shape: Vec<usize>,
    pub dtype: DType,
}

impl Display for TensorDesc {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}[{}]",
            self.name,
            self.dtype,
            self.shape.iter().join(", ")
        )
    }
}

/// The computation lowered to the accelerator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComputeGraph {
    /// The output is the input placeholder itself.
    Identity { input: TensorDesc },
}

impl ComputeGraph {
    pub fn identity(input: TensorDesc) -> Self {
        Self::Identity { input }
    }

    pub fn input(&self) -> &TensorDesc {
        match self {
            Self::Identity { input } => input,
        }
    }

    pub fn output(&self) -> &TensorDesc {
        match self {
            Self::Identity { input } => input,
        }
    }

    /// The kernel arguments, inputs followed by outputs.
    pub fn tensor_list(&self) -> Vec<TensorDesc> {
        vec![self.input().clone(), self.output().clone()]
    }

    /// A textual dump of the graph.
    pub fn ir(&self, name: &str) -> String {
        let input = self.input();
        let output = self.output();
        format!(
            "// kernel {}\n// input {}\nproduce {} {{\n  {} = {}\n}}\n",
            name, input, output.name, output.name, input.name
        )
    }
}

/// The decode parameters the operator is declared with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecodeParams {
    pub num_classes: usize,
    pub num_boxes: usize,
    pub conf_thresh: R64,
    pub iou_thresh: R64,
    pub biases: Vec<R64>,
    pub masks: Vec<usize>,
    pub strides: Vec<usize>,
}

/// The options handed to the kernel code generator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildConfig {
    pub print_ir: bool,
    pub need_build: bool,
    pub name: String,
    pub tensor_list: Vec<TensorDesc>,
}

/// The serialized description of a built kernel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KernelArtifact {
    pub name: String,
    pub graph: ComputeGraph,
    pub tensor_list: Vec<TensorDesc>,
    pub params: DecodeParams,
}

#[derive(Debug, Clone)]
pub struct DecoderKernel {
    graph: ComputeGraph,
    config: BuildConfig,
    params: DecodeParams,
    artifact: Option<KernelArtifact>,
}

impl DecoderKernel {
    pub(crate) fn build(
        graph: ComputeGraph,
        config: BuildConfig,
        params: DecodeParams,
    ) -> Result<Self> {
        if config.print_ir {
            info!("IR of kernel '{}':\n{}", config.name, graph.ir(&config.name));
        }

        // TODO: lower the decode stage (score thresholding, anchor box
        // assembly and NMS) once its semantics are fixed for the accelerator.
        debug!(
            "kernel '{}' lowers to a pass-through, decode parameters are not applied",
            config.name
        );

        let artifact = config.need_build.then(|| KernelArtifact {
            name: config.name.clone(),
            graph: graph.clone(),
            tensor_list: config.tensor_list.clone(),
            params: params.clone(),
        });

        Ok(Self {
            graph,
            config,
            params,
            artifact,
        })
    }

    pub fn graph(&self) -> &ComputeGraph {
        &self.graph
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn params(&self) -> &DecodeParams {
        &self.params
    }

    /// The built kernel, absent when building was not requested.
    pub fn artifact(&self) -> Option<&KernelArtifact> {
        self.artifact.as_ref()
    }

    pub fn artifact_json(&self) -> Result<String> {
        let artifact = self
            .artifact
            .as_ref()
            .ok_or_else(|| format_err!("kernel '{}' was not built", self.config.name))?;
        let text = serde_json::to_string_pretty(artifact)?;
        Ok(text)
    }

    pub fn write_artifact<P>(&self, path: P) -> Result<()>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let text = self.artifact_json()?;
        std::fs::write(path, text)
            .with_context(|| format!("unable to write file '{}'", path.display()))?;
        Ok(())
    }

    /// Evaluates the kernel graph on a host tensor.
    pub fn forward(&self, input: &Tensor) -> Result<Tensor> {
        let desc = self.graph.input();
        let expect_shape: Vec<i64> = desc.shape.iter().map(|&size| size as i64).collect();
        ensure!(
            input.size() == expect_shape,
            "expect input shape {:?}, but get {:?}",
            expect_shape,
            input.size()
        );
        ensure!(
            input.kind() == desc.dtype.kind(),
            "expect input of {}, but get {:?}",
            desc.dtype,
            input.kind()
        );

        let output = match &self.graph {
            ComputeGraph::Identity { .. } => input.shallow_clone(),
        };
        Ok(output)
    }
}
