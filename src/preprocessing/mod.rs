use std::{
    error::Error,
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::sim::{
    field::InitialVelocity,
    fluid::{Fluid, SolverConfig},
    scenario::DragPath,
};

pub mod cli;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ImageStreamSettings {
    pub frames_dir: PathBuf,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct InteractiveSettings {
    /// Window width as a fraction of the primary screen width
    pub screen_fraction: f32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum InterfaceMode {
    ImageStream(ImageStreamSettings),
    Interactive(InteractiveSettings),
}

/// Which cell-centered field is colour-mapped for display
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Default)]
pub enum RenderedField {
    #[default]
    Smoke,
    Pressure,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SimulationInput {
    pub mode: InterfaceMode,

    /// Velocity grid resolution (x, y)
    pub grid: (usize, usize),

    /// Physical height of the domain
    pub height: f32,

    pub solver: SolverConfig,

    #[serde(default)]
    pub initial_velocity: InitialVelocity,

    /// RNG seed for random initial velocities; entropy when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Obstacle radius in physical units
    pub ball_radius: f32,

    /// Scripted obstacle motion for headless runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drag_path: Option<DragPath>,

    #[serde(default)]
    pub field: RenderedField,

    /// Fixed timestep for headless runs
    pub timestep: f32,

    pub simulation_time: f32,
}

impl SimulationInput {
    /// Reject parameters the solver cannot run with
    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        let (nx, ny) = self.grid;
        if nx < 3 || ny < 3 {
            return Err(format!("Grid must be at least 3x3, got {nx}x{ny}").into());
        }
        if self.height <= 0. {
            return Err("Domain height must be positive".into());
        }
        if self.solver.density <= 0. {
            return Err("Density must be positive".into());
        }
        if self.solver.overrelax <= 0. || self.solver.overrelax >= 2. {
            return Err(format!(
                "Overrelaxation must be in (0, 2), got {}",
                self.solver.overrelax
            )
            .into());
        }
        if self.solver.iterations == 0 {
            return Err("At least one relaxation iteration is required".into());
        }
        if let Some(max_dt) = self.solver.max_dt {
            if max_dt <= 0. {
                return Err("max-dt must be positive".into());
            }
        }
        if self.timestep <= 0. {
            return Err("Timestep must be positive".into());
        }
        if self.simulation_time <= 0. {
            return Err("Simulation time must be positive".into());
        }
        if self.ball_radius < 0. {
            return Err("Ball radius cannot be negative".into());
        }
        if let InitialVelocity::Random { min, max } = self.initial_velocity {
            if min >= max {
                return Err("Random initial velocity needs min < max".into());
            }
        }
        if let Some(path) = &self.drag_path {
            if !path.is_valid() {
                return Err("Drag path period must be positive".into());
            }
        }

        Ok(())
    }

    /// Build the fluid described by this input
    pub fn build_fluid(&self) -> Fluid {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };

        Fluid::with_initial_velocity(
            self.grid.0,
            self.grid.1,
            self.height,
            self.solver,
            self.initial_velocity,
            &mut rng,
        )
    }

    /// Write this input as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), Box<dyn Error>> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        info!("Saved simulation input to {:?}", path);
        Ok(())
    }

    pub fn log(&self) {
        info!(
            "Simulation is shown below:\n\n\
        \t mode:        {}\n\
        \t grid:        {} x {}\n\
        \t height:      {} m\n\
        \t time range:  {} s (dt = {} s)\n\
        \t density:     {} kg/m³\n\
        \t gravity:     {} m/s²\n\
        \t relaxation:  {} iterations, ω = {}\n\
        \t max dt:      {:?}\n\
        \t ball radius: {} m\n\
        \t field:       {:?}\n\n\
        ",
            match self.mode {
                InterfaceMode::ImageStream(_) => "video",
                InterfaceMode::Interactive(_) => "interactive",
            },
            self.grid.0,
            self.grid.1,
            self.height,
            self.simulation_time,
            self.timestep,
            self.solver.density,
            self.solver.gravity,
            self.solver.iterations,
            self.solver.overrelax,
            self.solver.max_dt,
            self.ball_radius,
            self.field,
        );

        let mode_str = serde_json::to_string_pretty(&self.mode).unwrap_or_default();

        info!("Mode parameters are:\n\n{}", mode_str);
    }
}
