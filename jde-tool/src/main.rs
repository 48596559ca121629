use anyhow::{bail, Result};
use clap::Parser;
use jde_decoder::DecoderInit;
use jde_net::{JdeModel, JdeModelInit};
use log::info;
use model_config::{Anchors, FrameSize, ModelConfig, ModelSize};
use prettytable::{cell, row, Table};
use std::path::{Path, PathBuf};
use tch::{nn, Device, Kind, Tensor};

/// The twelve anchors of the 1088x608 tracker, as width and height pairs.
const DEFAULT_ANCHORS: &[f64] = &[
    6.0, 16.0, 8.0, 23.0, 11.0, 32.0, 16.0, 45.0, 21.0, 64.0, 30.0, 90.0, 43.0, 128.0, 60.0,
    180.0, 85.0, 255.0, 120.0, 360.0, 170.0, 420.0, 340.0, 320.0,
];

#[derive(Debug, Clone, Parser)]
enum Opts {
    /// Show the head outputs of a model
    Info {
        /// model size, one of 0.5x, 1.0x, 1.5x, 2.0x
        #[clap(long, default_value = "2.0x")]
        model_size: ModelSize,
        #[clap(long, default_value = "1")]
        num_classes: usize,
        #[clap(long, default_value = "0")]
        num_ids: usize,
        #[clap(long, default_value = "320")]
        height: usize,
        #[clap(long, default_value = "576")]
        width: usize,
        /// run the model on a random batch
        #[clap(long)]
        forward: bool,
    },
    /// Show the head outputs of a model configuration file
    InfoConfig {
        /// configuration file
        config_file: PathBuf,
        #[clap(long, default_value = "608")]
        height: usize,
        #[clap(long, default_value = "1088")]
        width: usize,
    },
    /// Build the decoder kernel from a parameter file
    BuildDecoder {
        /// decoder parameter file
        decoder_file: PathBuf,
        /// output artifact file
        #[clap(long)]
        output: Option<PathBuf>,
    },
    /// Solve an assignment problem stored in a JSON cost file
    Assign {
        /// cost matrix file
        cost_file: PathBuf,
        #[clap(long)]
        extend_cost: bool,
        #[clap(long)]
        cost_limit: Option<f32>,
    },
}

fn main() -> Result<()> {
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "info");
    }
    pretty_env_logger::init();

    match Opts::parse() {
        Opts::Info {
            model_size,
            num_classes,
            num_ids,
            height,
            width,
            forward,
        } => {
            let init = JdeModelInit {
                anchors: Anchors::from_flat(DEFAULT_ANCHORS)?,
                num_classes,
                num_ids,
                model_size,
            };
            info_model(init, FrameSize::new(height, width), forward)?;
        }
        Opts::InfoConfig {
            config_file,
            height,
            width,
        } => {
            let config = ModelConfig::open(config_file)?;
            let init = JdeModelInit::from_config(&config);
            info_model(init, FrameSize::new(height, width), false)?;
        }
        Opts::BuildDecoder {
            decoder_file,
            output,
        } => {
            build_decoder(decoder_file, output)?;
        }
        Opts::Assign {
            cost_file,
            extend_cost,
            cost_limit,
        } => {
            assign(cost_file, extend_cost, cost_limit.unwrap_or(f32::INFINITY))?;
        }
    }

    Ok(())
}

fn info_model(init: JdeModelInit, frame_size: FrameSize, forward: bool) -> Result<()> {
    let vs = nn::VarStore::new(Device::Cpu);
    let model = init.build(&vs.root())?;
    let batch_size = 1;

    let shapes = model.output_shapes(batch_size, frame_size)?;
    let forward_shapes = if forward {
        Some(forward_random(&model, batch_size, frame_size)?)
    } else {
        None
    };

    // print model information
    {
        let mut table = Table::new();
        table.add_row(row!["model size", model.model_size()]);
        table.add_row(row!["classes", model.num_classes()]);
        table.add_row(row![
            "identities",
            model
                .classifier()
                .num_ids()
                .map(|num| num.to_string())
                .unwrap_or_else(|| "-".to_owned())
        ]);
        table.add_row(row!["anchors", model.anchors().len()]);
        table.add_row(row!["detection channels", model.detection_channels()]);
        table.add_row(row!["output channels", model.output_channels()]);
        table.add_row(row!["parameter tensors", vs.trainable_variables().len()]);
        table.add_row(row!["parameters", count_parameters(&vs)]);
        table.printstd();
    }

    // print head outputs
    {
        let mut table = Table::new();
        table.add_row(row!["head", "stride", "output shape", "forward shape"]);

        shapes
            .iter()
            .zip([32, 16, 8])
            .enumerate()
            .for_each(|(index, (shape, stride))| {
                let forward_shape = forward_shapes
                    .as_ref()
                    .map(|shapes| format!("{:?}", shapes[index]))
                    .unwrap_or_default();
                table.add_row(row![index, stride, format!("{:?}", shape), forward_shape]);
            });

        table.printstd();
    }

    Ok(())
}

/// The number of scalar trainable parameters.
fn count_parameters(vs: &nn::VarStore) -> usize {
    vs.trainable_variables()
        .iter()
        .map(|var| var.numel())
        .sum()
}

fn forward_random(
    model: &JdeModel,
    batch_size: usize,
    frame_size: FrameSize,
) -> Result<Vec<Vec<i64>>> {
    let FrameSize { h, w } = frame_size;
    let input = Tensor::rand(
        &[batch_size as i64, 3, h as i64, w as i64],
        (Kind::Float, Device::Cpu),
    );
    let outputs = tch::no_grad(|| model.forward_t(&input, false))?;
    info!("ran forward pass on a {}x{} frame", h, w);
    Ok(outputs.iter().map(|output| output.size()).collect())
}

fn build_decoder(decoder_file: impl AsRef<Path>, output: Option<PathBuf>) -> Result<()> {
    let init = DecoderInit::open(decoder_file)?;
    let kernel = init.build()?;
    let config = kernel.config();

    let mut table = Table::new();
    table.add_row(row!["tensor", "dtype", "shape"]);
    config.tensor_list.iter().for_each(|desc| {
        table.add_row(row![desc.name, desc.dtype, format!("{:?}", desc.shape)]);
    });
    table.printstd();

    match (output, kernel.artifact()) {
        (Some(output), Some(_)) => {
            kernel.write_artifact(&output)?;
            info!("kernel '{}' written to '{}'", config.name, output.display());
        }
        (Some(_), None) => {
            bail!(
                "kernel '{}' is not built, set need_build to write the artifact",
                config.name
            );
        }
        (None, _) => {}
    }

    Ok(())
}

fn assign(cost_file: impl AsRef<Path>, extend_cost: bool, cost_limit: f32) -> Result<()> {
    let cost = lap::open_cost_matrix(cost_file)?;
    let assignment = lap::solve(&cost, extend_cost, cost_limit)?;

    let mut table = Table::new();
    table.add_row(row!["row", "col", "cost"]);
    assignment.pairs().for_each(|(r, c)| {
        table.add_row(row![r, c, cost[[r, c]]]);
    });
    table.printstd();

    info!(
        "total cost {}, unassigned rows {:?}, unassigned cols {:?}",
        assignment.opt,
        assignment.unassigned_rows().collect::<Vec<_>>(),
        assignment.unassigned_cols().collect::<Vec<_>>()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_scalar_parameters() {
        let vs = nn::VarStore::new(Device::Cpu);
        let root = vs.root();
        let _ = root.zeros("weight", &[4, 3, 3, 3]);
        let _ = root.zeros("bias", &[4]);
        let _ = root.zeros_no_train("running_var", &[4]);

        assert_eq!(vs.trainable_variables().len(), 2);
        assert_eq!(count_parameters(&vs), 4 * 3 * 3 * 3 + 4);
    }
}
