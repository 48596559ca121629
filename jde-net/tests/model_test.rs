use anyhow::Result;
use jde_net::{JdeModel, JdeModelInit};
use model_config::{Anchors, FrameSize, ModelConfig, ModelSize};
use std::path::Path;
use tch::{kind::FLOAT_CPU, nn, Device, Tensor};

const FRAME_SIZE: FrameSize = FrameSize { h: 64, w: 96 };

fn anchors() -> Result<Anchors> {
    Anchors::from_flat(&[
        6.0, 16.0, 8.0, 23.0, 11.0, 32.0, 16.0, 45.0, 21.0, 64.0, 30.0, 90.0, 43.0, 128.0, 60.0,
        180.0, 85.0, 255.0, 120.0, 360.0, 170.0, 420.0, 340.0, 320.0,
    ])
}

fn build(vs: &nn::VarStore, model_size: ModelSize, num_classes: usize) -> Result<JdeModel> {
    JdeModelInit {
        anchors: anchors()?,
        num_classes,
        num_ids: 0,
        model_size,
    }
    .build(&vs.root())
}

#[test]
fn all_model_sizes_produce_three_outputs() -> Result<()> {
    for model_size in ModelSize::all() {
        for num_classes in [1, 5] {
            let vs = nn::VarStore::new(Device::Cpu);
            let model = build(&vs, model_size, num_classes)?;
            assert_eq!(model.anchors().len(), 12);

            let input = Tensor::rand(&[2, 3, FRAME_SIZE.h as i64, FRAME_SIZE.w as i64], FLOAT_CPU);
            let outputs = tch::no_grad(|| model.forward_t(&input, false))?;
            let expect = model.output_shapes(2, FRAME_SIZE)?;

            assert_eq!(outputs.len(), 3, "{} model", model_size);
            for (output, shape) in outputs.iter().zip(&expect) {
                assert_eq!(output.size(), shape.to_vec(), "{} model", model_size);
                assert_eq!(output.size()[1], ((5 + num_classes) * 4 + 512) as i64);
            }
        }
    }
    Ok(())
}

#[test]
fn unsupported_model_size_fails() {
    for text in ["0.25x", "3.0x", "2.0", "large"] {
        assert!(text.parse::<ModelSize>().is_err(), "'{}' accepted", text);
    }

    let text = r#"{ model_size: "0.75x", num_classes: 1, anchors: [] }"#;
    assert!(json5::from_str::<ModelConfig>(text).is_err());
}

#[test]
fn build_from_config_file() -> Result<()> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("cfg")
        .join("jde-2.0x.json5");
    let config = ModelConfig::open(path)?;

    let vs = nn::VarStore::new(Device::Cpu);
    let model = JdeModelInit::from_config(&config).build(&vs.root())?;
    assert_eq!(model.model_size(), ModelSize::X2_0);
    assert_eq!(model.classifier().num_ids(), Some(14455));
    assert_eq!(model.output_channels(), 536);

    let input = Tensor::rand(&[1, 3, 32, 32], FLOAT_CPU);
    let outputs = tch::no_grad(|| model.forward_t(&input, false))?;
    let sizes: Vec<_> = outputs.iter().map(|output| output.size()).collect();
    assert_eq!(
        sizes,
        [[1, 536, 1, 1], [1, 536, 2, 2], [1, 536, 4, 4]]
            .iter()
            .map(|shape| shape.to_vec())
            .collect::<Vec<_>>()
    );
    Ok(())
}
