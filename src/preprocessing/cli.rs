use std::{
    error::Error,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use clap::Parser;
use tracing::info;

use crate::{
    preprocessing::{
        ImageStreamSettings, InteractiveSettings, InterfaceMode, RenderedField, SimulationInput,
    },
    sim::{field::InitialVelocity, fluid::SolverConfig, scenario::DragPath},
};

static DEFAULT_FRAMES_PATH: LazyLock<&Path> = LazyLock::new(|| Path::new("sim-frames"));

// Raw, CLI input
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct CliArgs {
    #[arg(long, help = "An input file with pre-loaded parameters.")]
    input_json: Option<PathBuf>,

    #[arg(
        long,
        help = "The mode to run the simulation in: `video` or `interactive`",
        default_value = "video"
    )]
    mode: String,

    #[arg(long, help = "Optional path to save the resolved input file to.")]
    pub input_json_savepath: Option<PathBuf>,

    #[arg(
        long,
        help = "An optional directory pointing to where frames should be saved."
    )]
    frames_dir: Option<PathBuf>,

    #[arg(short, long, help = "Enable debug logging.")]
    pub verbose: bool,

    #[arg(long, help = "Velocity grid columns.", default_value = "160")]
    grid_x: usize,

    #[arg(long, help = "Velocity grid rows.", default_value = "90")]
    grid_y: usize,

    #[arg(long, help = "Physical domain height in m.", default_value = "1.0")]
    height: f32,

    #[arg(long, help = "Overrelaxation factor in (0, 2).", default_value = "1.9")]
    overrelax: f32,

    #[arg(long, help = "Relaxation sweeps per frame.", default_value = "75")]
    iterations: usize,

    #[arg(long, default_value = "1000.0", help = "Fluid density in kg/m³")]
    density: f32,

    #[arg(long, default_value = "0.0", help = "Downward gravity in m/s²")]
    gravity: f32,

    #[arg(long, help = "Optional upper bound on the timestep.")]
    max_dt: Option<f32>,

    #[arg(long, default_value = "0.016666668", help = "Fixed timestep in video mode.")]
    dt: f32,

    #[arg(
        short,
        long,
        default_value = "4.0",
        help = "Simulation time in seconds (video mode)."
    )]
    simtime: f32,

    #[arg(long, default_value = "0.12", help = "Obstacle radius in m.")]
    ball_radius: f32,

    #[arg(
        long,
        default_value = "smoke",
        help = "The field to render: `smoke` or `pressure`"
    )]
    field: String,

    #[arg(
        long,
        help = "Seed the velocity field uniformly at random in [-x, x)."
    )]
    random_velocity: Option<f32>,

    #[arg(long, help = "Seed for the random initial velocity.")]
    seed: Option<u64>,

    #[arg(
        long,
        default_value = "0.6",
        help = "Window width as a fraction of the screen (interactive mode)."
    )]
    screen_fraction: f32,
}

impl CliArgs {
    pub fn create_input(&self) -> Result<SimulationInput, Box<dyn Error>> {
        // if the input file is supplied, just use that
        if let Some(input_filepath) = &self.input_json {
            if !input_filepath.exists() {
                return Err(format!("Input file {:?} does not exist.", input_filepath).into());
            }
            if input_filepath.is_dir() {
                return Err(format!("Input file {:?} is a directory.", input_filepath).into());
            }

            info!(
                "Using input file {}",
                input_filepath.to_str().unwrap_or("<unknown>")
            );

            let reader = BufReader::new(File::open(input_filepath)?);
            let loaded_input: SimulationInput = serde_json::from_reader(reader)
                .map_err(|err| format!("Failed to deserialize input file: {err}"))?;

            loaded_input.validate()?;
            return Ok(loaded_input);
        }

        // otherwise, build the input from the other arguments
        let mode = match self.mode.as_str() {
            "video" => {
                let frames_dir = self
                    .frames_dir
                    .clone()
                    .unwrap_or((*DEFAULT_FRAMES_PATH).into());

                InterfaceMode::ImageStream(ImageStreamSettings { frames_dir })
            }
            "interactive" => InterfaceMode::Interactive(InteractiveSettings {
                screen_fraction: self.screen_fraction,
            }),
            _ => {
                return Err(format!(
                    "'{}' is not a valid interface mode. Use --help for info.",
                    self.mode
                )
                .into());
            }
        };

        let field = match self.field.as_str() {
            "smoke" => RenderedField::Smoke,
            "pressure" => RenderedField::Pressure,
            _ => {
                return Err(format!("'{}' is not a field that can be rendered.", self.field).into());
            }
        };

        let initial_velocity = match self.random_velocity {
            Some(amplitude) => InitialVelocity::Random {
                min: -amplitude,
                max: amplitude,
            },
            None => InitialVelocity::Zero,
        };

        let input = SimulationInput {
            mode,
            grid: (self.grid_x, self.grid_y),
            height: self.height,
            solver: SolverConfig {
                iterations: self.iterations,
                overrelax: self.overrelax,
                density: self.density,
                gravity: self.gravity,
                max_dt: self.max_dt,
            },
            initial_velocity,
            seed: self.seed,
            ball_radius: self.ball_radius,
            drag_path: Some(DragPath::default()),
            field,
            timestep: self.dt,
            simulation_time: self.simtime,
        };

        input.validate()?;
        Ok(input)
    }
}
