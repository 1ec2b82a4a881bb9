// Eulerian smoke solver: owns the field and advances it one frame at a time

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::sim::{
    advection,
    field::{FluidField, InitialVelocity},
    gravity::{self, GRAVITY},
    obstacle::{self, DragPos},
    projection,
};

/// Tunables of the solver
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct SolverConfig {
    /// Relaxation sweeps per frame
    pub iterations: usize,

    /// Relaxation multiplier (1 < ω < 2 speeds up convergence)
    pub overrelax: f32,

    /// Fluid density
    pub density: f32,

    /// Downward acceleration applied to vertical velocities
    pub gravity: f32,

    /// Optional upper bound on the caller's timestep
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_dt: Option<f32>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            iterations: 75,
            overrelax: 1.9,
            density: 1.,
            gravity: GRAVITY,
            max_dt: None,
        }
    }
}

/// High-level timestepping object. Contains the field and the solver
/// parameters and advances the simulation on demand.
pub struct Fluid {
    /// The simulation state
    field: FluidField,

    /// The solver parameters
    config: SolverConfig,

    /// Accumulated simulated time
    t: f32,
}

impl Fluid {
    /// Create a fluid at rest.
    ///
    /// Parameters
    /// - `size_x` - Velocity grid columns
    /// - `size_y` - Velocity grid rows
    /// - `height` - Physical height of the domain
    /// - `config` - Solver parameters
    pub fn new(size_x: usize, size_y: usize, height: f32, config: SolverConfig) -> Self {
        let field =
            FluidField::new(size_x, size_y, config.overrelax, height).with_density(config.density);

        Fluid {
            field,
            config,
            t: 0.,
        }
    }

    /// Create a fluid and seed its velocities
    pub fn with_initial_velocity<R: Rng>(
        size_x: usize,
        size_y: usize,
        height: f32,
        config: SolverConfig,
        initial: InitialVelocity,
        rng: &mut R,
    ) -> Self {
        let mut fluid = Self::new(size_x, size_y, height, config);
        fluid.field.seed_velocity(initial, rng);
        fluid
    }

    pub fn field(&self) -> &FluidField {
        &self.field
    }

    #[cfg(test)]
    pub fn field_mut(&mut self) -> &mut FluidField {
        &mut self.field
    }

    /// Simulated time so far
    pub fn time(&self) -> f32 {
        self.t
    }

    /// The timestep actually used for a caller-supplied `dt`
    pub fn effective_dt(&self, dt: f32) -> f32 {
        match self.config.max_dt {
            Some(max_dt) if dt > max_dt => max_dt,
            _ => dt,
        }
    }

    /// Advance one frame: gravity, projection, velocity advection, smoke
    /// advection. `dt` is used as given unless `max_dt` is configured.
    pub fn step(&mut self, dt: f32) {
        let dt = {
            let clamped = self.effective_dt(dt);
            if clamped != dt {
                debug!("Clamped timestep {dt} to {clamped}");
            }
            clamped
        };

        gravity::apply_gravity(&mut self.field, dt, self.config.gravity);
        projection::solve_incompressibility(&mut self.field, dt, self.config.iterations);

        #[cfg(debug_assertions)]
        {
            if tracing::enabled!(tracing::Level::DEBUG) {
                debug!(
                    "Frame {} residual divergence: {}",
                    self.field.frame,
                    projection::max_divergence(&self.field)
                );
            }
        }

        advection::advect_velocity(&mut self.field, dt);
        advection::advect_smoke(&mut self.field, dt);

        self.field.frame += 1;
        self.t += dt;
    }

    /// Move the obstacle from `prev` to `next`; see [`obstacle::inject_obstacle`]
    pub fn inject_obstacle(&mut self, prev: DragPos, next: DragPos, radius: f32, dt: f32) {
        let dt = self.effective_dt(dt);
        obstacle::inject_obstacle(&mut self.field, prev, next, radius, dt);
    }
}
