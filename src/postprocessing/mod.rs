// Contains post-processers for analyzing simulation results

use std::{error::Error, fs::File, io::BufWriter, path::Path};

use serde::Serialize;
use tracing::{info, warn};

use crate::{
    preprocessing::{InterfaceMode, SimulationInput},
    sim::task::SimulationOutput,
};

pub const INDEX_FILENAME: &str = "index.json";

/// Describes a directory of rendered frames
#[derive(Serialize)]
pub struct FrameIndex<'a> {
    pub input: &'a SimulationInput,

    /// Simulated time after each frame, indexed by frame number
    pub times: &'a [f32],
}

/// Write the frame index next to the frames
pub fn write_frame_index(
    frames_dir: &Path,
    input: &SimulationInput,
    times: &[f32],
) -> Result<(), Box<dyn Error>> {
    let path = frames_dir.join(INDEX_FILENAME);
    let writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(writer, &FrameIndex { input, times })?;

    info!("Frame index written to {:?}", path);
    Ok(())
}

pub fn postprocess(sim_input: &SimulationInput, sim_output: Option<SimulationOutput>) {
    let Some(output) = sim_output else {
        return;
    };

    if let InterfaceMode::ImageStream(settings) = &sim_input.mode {
        _ = write_frame_index(&settings.frames_dir, sim_input, &output.temporal_map)
            .inspect_err(|err| warn!("Unable to write frame index: {:?}", err));
    }

    if let Some(t) = output.temporal_map.last() {
        info!(
            "Simulated {:.3} s in {} frames",
            t,
            output.temporal_map.len()
        );
    }
}
