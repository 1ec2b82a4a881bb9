// Dense storage for the staggered (MAC) grid

use na::DMatrix;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ScalarField;

/// How the velocity arrays are seeded when a field is created
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Default)]
pub enum InitialVelocity {
    #[default]
    Zero,
    Uniform {
        value: f32,
    },
    Random {
        min: f32,
        max: f32,
    },
}

/// Owns every array of the simulation. Velocities live on cell faces and
/// are `size_y x size_x`; cell-centered scalars are `(size_y-1) x (size_x-1)`.
///
/// Rows (`i`) grow downward, columns (`j`) grow to the right. `x_velocity[(i, j)]`
/// is the left face of cell `(i, j)` and `y_velocity[(i, j)]` is its top face.
pub struct FluidField {
    /// Number of velocity columns
    size_x: usize,

    /// Number of velocity rows
    size_y: usize,

    /// Horizontal face velocities
    pub(super) x_velocity: ScalarField,

    /// Vertical face velocities
    pub(super) y_velocity: ScalarField,

    /// Scratch buffer for horizontal advection
    pub(super) new_u: ScalarField,

    /// Scratch buffer for vertical advection
    pub(super) new_v: ScalarField,

    /// Pressure estimate, rebuilt every frame
    pub(super) pressure: ScalarField,

    /// Cell openness; 0 is solid, 1 is fluid
    pub(super) obstacle_mask: ScalarField,

    /// Passive dye
    pub(super) smoke: ScalarField,

    /// Dye snapshot read during advection
    pub(super) old_smoke: ScalarField,

    /// Fluid density used to scale the pressure estimate
    pub(super) density: f32,

    /// Physical size of one cell
    pub(super) spacing: f32,

    /// Relaxation multiplier for the projection sweeps
    pub(super) overrelax: f32,

    /// Number of completed steps
    pub(super) frame: u64,
}

impl FluidField {
    /// Allocate a field at rest: zero velocity, everything open, full smoke.
    ///
    /// Parameters
    /// - `size_x` - Velocity grid columns (cells are one fewer)
    /// - `size_y` - Velocity grid rows (cells are one fewer)
    /// - `overrelax` - Projection relaxation multiplier
    /// - `height` - Physical height of the domain; sets the cell spacing
    pub fn new(size_x: usize, size_y: usize, overrelax: f32, height: f32) -> Self {
        assert!(size_x >= 2, "size_x must be >= 2");
        assert!(size_y >= 2, "size_y must be >= 2");
        assert!(height > 0.0, "height must be > 0");

        let (rows, cols) = (size_y - 1, size_x - 1);

        FluidField {
            size_x,
            size_y,
            x_velocity: DMatrix::zeros(size_y, size_x),
            y_velocity: DMatrix::zeros(size_y, size_x),
            new_u: DMatrix::zeros(size_y, size_x),
            new_v: DMatrix::zeros(size_y, size_x),
            pressure: DMatrix::zeros(rows, cols),
            obstacle_mask: DMatrix::from_element(rows, cols, 1.),
            smoke: DMatrix::from_element(rows, cols, 1.),
            old_smoke: DMatrix::from_element(rows, cols, 1.),
            density: 1.,
            spacing: height / size_y as f32,
            overrelax,
            frame: 0,
        }
    }

    /// Builder-style override of the fluid density
    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    /// Seed both velocity arrays
    pub fn seed_velocity<R: Rng>(&mut self, initial: InitialVelocity, rng: &mut R) {
        match initial {
            InitialVelocity::Zero => {
                self.x_velocity.fill(0.);
                self.y_velocity.fill(0.);
            }
            InitialVelocity::Uniform { value } => {
                self.x_velocity.fill(value);
                self.y_velocity.fill(value);
            }
            InitialVelocity::Random { min, max } => {
                for u in self.x_velocity.iter_mut() {
                    *u = rng.random_range(min..max);
                }
                for v in self.y_velocity.iter_mut() {
                    *v = rng.random_range(min..max);
                }
            }
        }
    }

    pub fn size_x(&self) -> usize {
        self.size_x
    }

    pub fn size_y(&self) -> usize {
        self.size_y
    }

    /// Number of cell rows, i.e. `size_y - 1`
    pub fn cell_rows(&self) -> usize {
        self.size_y - 1
    }

    /// Number of cell columns, i.e. `size_x - 1`
    pub fn cell_cols(&self) -> usize {
        self.size_x - 1
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    #[cfg(test)]
    pub fn density(&self) -> f32 {
        self.density
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Horizontal velocity on the left face of cell `(i, j)`
    pub fn u(&self, i: usize, j: usize) -> f32 {
        *self.x_velocity.index((i, j))
    }

    /// Vertical velocity on the top face of cell `(i, j)`
    pub fn v(&self, i: usize, j: usize) -> f32 {
        *self.y_velocity.index((i, j))
    }

    pub fn u_mut(&mut self, i: usize, j: usize) -> &mut f32 {
        self.x_velocity.index_mut((i, j))
    }

    pub fn v_mut(&mut self, i: usize, j: usize) -> &mut f32 {
        self.y_velocity.index_mut((i, j))
    }

    #[cfg(test)]
    pub fn smoke_at(&self, i: usize, j: usize) -> f32 {
        *self.smoke.index((i, j))
    }

    pub fn smoke_mut(&mut self, i: usize, j: usize) -> &mut f32 {
        self.smoke.index_mut((i, j))
    }

    #[cfg(test)]
    pub fn pressure_at(&self, i: usize, j: usize) -> f32 {
        *self.pressure.index((i, j))
    }

    /// Mark cell `(i, j)` solid or open
    pub fn set_solid(&mut self, i: usize, j: usize, solid: bool) {
        *self.obstacle_mask.index_mut((i, j)) = if solid { 0. } else { 1. };
    }

    #[cfg(test)]
    pub fn x_velocity(&self) -> &ScalarField {
        &self.x_velocity
    }

    #[cfg(test)]
    pub fn y_velocity(&self) -> &ScalarField {
        &self.y_velocity
    }

    pub fn pressure(&self) -> &ScalarField {
        &self.pressure
    }

    pub fn obstacle_mask(&self) -> &ScalarField {
        &self.obstacle_mask
    }

    pub fn smoke(&self) -> &ScalarField {
        &self.smoke
    }

    /// Whether every velocity and smoke sample is finite
    pub fn is_finite(&self) -> bool {
        self.x_velocity.iter().all(|u| u.is_finite())
            && self.y_velocity.iter().all(|v| v.is_finite())
            && self.smoke.iter().all(|s| s.is_finite())
    }
}
