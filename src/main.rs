use std::process::exit;

extern crate nalgebra as na;

mod observers;
mod postprocessing;
mod preprocessing;
mod sim;

use clap::Parser;
use na::DMatrix;
use tracing::{Level, error};

use preprocessing::cli::CliArgs;

type ScalarField = DMatrix<f32>;

fn main() {
    let args = CliArgs::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .init();

    let simulation_input = args
        .create_input()
        .inspect_err(|err| {
            error!("{}", err);
            exit(1);
        })
        .unwrap();

    if let Some(savepath) = &args.input_json_savepath {
        _ = simulation_input
            .save(savepath)
            .inspect_err(|err| error!("Failed to save input file: {}", err));
    }

    simulation_input.log();

    let simulation_output = sim::task::run(simulation_input.clone())
        .inspect_err(|err| {
            error!("Simulation failed: {}", err);
            exit(1);
        })
        .unwrap();

    postprocessing::postprocess(&simulation_input, simulation_output);
}
