use anyhow::Result;
use jde_decoder::{DType, DecoderInit, KernelArtifact};
use std::path::{Path, PathBuf};
use tch::{Device, Kind, Tensor};

lazy_static::lazy_static! {
    static ref CONFIG_DIR: PathBuf = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("cfg");
}

#[test]
fn build_from_file() -> Result<()> {
    let init = DecoderInit::open(CONFIG_DIR.join("jdecoder-1088x608.json5"))?;
    assert_eq!(init.kernel_name, "JDEcoder");
    assert!(init.need_print);

    let kernel = init.build()?;
    let input = kernel.graph().input();
    assert_eq!(input.dtype, DType::Float16);
    assert_eq!(input.shape, [1, 536, 19, 34]);
    assert_eq!(kernel.params().biases.len(), 24);

    let xs = Tensor::zeros(&[1, 536, 19, 34], (Kind::Half, Device::Cpu));
    let ys = kernel.forward(&xs)?;
    assert_eq!(ys.size(), xs.size());
    assert_eq!(ys.kind(), Kind::Half);
    Ok(())
}

#[test]
fn reject_unsupported_dtype_file() -> Result<()> {
    let init = DecoderInit::open(CONFIG_DIR.join("jdecoder-float64.json5"))?;
    let err = init.build().unwrap_err();
    assert!(format!("{}", err).contains("float64"));
    Ok(())
}

#[test]
fn write_artifact_file() -> Result<()> {
    let kernel = DecoderInit::open(CONFIG_DIR.join("jdecoder-1088x608.json5"))?.build()?;
    let path = std::env::temp_dir().join(format!("jdecoder-artifact-{}.json", std::process::id()));
    kernel.write_artifact(&path)?;

    let text = std::fs::read_to_string(&path)?;
    std::fs::remove_file(&path)?;
    let artifact: KernelArtifact = serde_json::from_str(&text)?;
    assert_eq!(artifact.name, "JDEcoder");
    assert_eq!(artifact.tensor_list.len(), 2);
    Ok(())
}
