// Task runners for the solver

use std::{
    error::Error,
    sync::mpsc,
    thread::{self, JoinHandle},
};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::{
    observers::{
        imgstream::{self, DisplayPacket},
        window,
    },
    preprocessing::{ImageStreamSettings, InterfaceMode, SimulationInput},
    sim::scenario::Scenario,
};

pub struct SimulationOutput {
    pub temporal_map: Vec<f32>, // maps idx->timestamp
}

/// The solver task to run in ImageStream mode. Frames are written by a
/// separate image-io thread fed through a channel.
pub fn imgstream_task(
    settings: &ImageStreamSettings,
    scenario: Scenario,
    simulation_input: &SimulationInput,
) -> Result<SimulationOutput, Box<dyn Error>> {
    let bar = ProgressBar::new(scenario.frame_count() as u64);
    bar.set_style(
        ProgressStyle::with_template(
            "[Elapsed: {elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} frames (Remaining: {eta_precise})"
        )?
        .progress_chars("##-"),
    );

    let (sender, receiver) = mpsc::channel();

    // spawn image io thread
    let frames_dir = settings.frames_dir.clone();
    let field = simulation_input.field;
    let io_thread = thread::spawn(move || {
        imgstream::image_io_loop(receiver, field, &frames_dir)
            .map_err(|err| err.to_string())
    });

    let mut temporal_map: Vec<f32> = Vec::new();
    for (i, (snapshot, t)) in scenario.enumerate() {
        // the writer only hangs up early when it failed; its error is reported below
        if sender.send(DisplayPacket { snapshot, i }).is_err() {
            break;
        }

        bar.inc(1);
        temporal_map.push(t);
    }
    bar.finish();

    drop(sender);
    io_thread
        .join()
        .map_err(|_| "Image io thread panicked")?
        .map_err(|err| format!("Image io failed: {err}"))?;

    info!(
        "Wrote {} frames to {:?}",
        temporal_map.len(),
        settings.frames_dir
    );

    Ok(SimulationOutput { temporal_map })
}

/// Spawns the simulation thread for a headless (ImageStream) run
pub fn spawn_sim_thread(
    simulation_input: SimulationInput,
    settings: ImageStreamSettings,
) -> JoinHandle<Result<SimulationOutput, String>> {
    thread::spawn(move || {
        let scenario = Scenario::new(
            simulation_input.build_fluid(),
            simulation_input.drag_path,
            simulation_input.ball_radius,
            simulation_input.timestep,
            simulation_input.simulation_time,
        );

        imgstream_task(&settings, scenario, &simulation_input).map_err(|err| err.to_string())
    })
}

/// Run the simulation in the configured mode. The interactive window stays
/// on the calling thread; headless runs solve on a worker thread.
pub fn run(simulation_input: SimulationInput) -> Result<Option<SimulationOutput>, Box<dyn Error>> {
    match simulation_input.mode.clone() {
        InterfaceMode::ImageStream(settings) => {
            let output = spawn_sim_thread(simulation_input, settings)
                .join()
                .map_err(|_| "Simulation thread panicked")??;
            Ok(Some(output))
        }
        InterfaceMode::Interactive(settings) => {
            window::run_interactive(&settings, &simulation_input)?;
            Ok(None)
        }
    }
}
