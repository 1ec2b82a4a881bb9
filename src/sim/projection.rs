// Gauss-Seidel pressure projection on the staggered grid.
//
// Each sweep walks the cells row-major and corrects the four face
// velocities of every open cell in place, so later cells see the updates of
// earlier ones. The resulting directional bias is part of the scheme.

use crate::sim::{boundary::openness, field::FluidField};

/// Net outflow of cell `(i, j)` through its four faces
pub fn divergence(field: &FluidField, i: usize, j: usize) -> f32 {
    field.u(i, j + 1) - field.u(i, j) + field.v(i + 1, j) - field.v(i, j)
}

/// Largest absolute divergence over open cells that have an open
/// neighbour. Enclosed cells are left out since the solver cannot act on them.
pub fn max_divergence(field: &FluidField) -> f32 {
    let mut max_div = 0.0f32;

    for i in 0..field.cell_rows() {
        for j in 0..field.cell_cols() {
            let (ii, jj) = (i as isize, j as isize);
            if openness(field, ii, jj) == 0. {
                continue;
            }

            let s = openness(field, ii + 1, jj)
                + openness(field, ii - 1, jj)
                + openness(field, ii, jj + 1)
                + openness(field, ii, jj - 1);
            if s == 0. {
                continue;
            }

            max_div = max_div.max(divergence(field, i, j).abs());
        }
    }

    max_div
}

/// Run a single relaxation sweep over the whole cell grid.
///
/// Parameters
/// - `field` - The field to project; velocities and pressure are updated in place
/// - `dt` - The timestep, used only to scale the pressure estimate. A
///   non-positive `dt` leaves the pressure untouched.
pub fn relax(field: &mut FluidField, dt: f32) {
    let cp = if dt > 0. {
        field.density * field.spacing / dt
    } else {
        0.
    };
    let overrelax = field.overrelax;

    for i in 0..field.cell_rows() {
        for j in 0..field.cell_cols() {
            let (ii, jj) = (i as isize, j as isize);
            if openness(field, ii, jj) == 0. {
                continue;
            }

            let s_down = openness(field, ii + 1, jj);
            let s_up = openness(field, ii - 1, jj);
            let s_right = openness(field, ii, jj + 1);
            let s_left = openness(field, ii, jj - 1);

            let s = s_down + s_up + s_right + s_left;
            if s == 0. {
                continue;
            }

            let p = overrelax * divergence(field, i, j) / s;

            *field.u_mut(i, j) += p * s_left;
            *field.u_mut(i, j + 1) -= p * s_right;
            *field.v_mut(i, j) += p * s_up;
            *field.v_mut(i + 1, j) -= p * s_down;

            *field.pressure.index_mut((i, j)) -= p * cp;
        }
    }
}

/// Zero the pressure estimate and run `iterations` relaxation sweeps
pub fn solve_incompressibility(field: &mut FluidField, dt: f32, iterations: usize) {
    field.pressure.fill(0.);

    for _ in 0..iterations {
        relax(field, dt);
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng, rngs::StdRng};

    use crate::sim::fluid::SolverConfig;

    use super::*;

    /// Field with random interior face velocities and still walls
    fn stirred_field(size: usize, overrelax: f32) -> FluidField {
        let mut rng = StdRng::seed_from_u64(42);
        let mut field = FluidField::new(size, size, overrelax, 1.0);

        let cells = size - 1;
        for i in 0..cells {
            for j in 1..cells {
                *field.u_mut(i, j) = rng.random_range(-1.0..1.0);
            }
        }
        for i in 1..cells {
            for j in 0..cells {
                *field.v_mut(i, j) = rng.random_range(-1.0..1.0);
            }
        }

        field
    }

    #[test]
    fn test_divergence_bound() {
        let config = SolverConfig::default();

        let mut field = stirred_field(12, config.overrelax);
        assert!(max_divergence(&field) > 0.1);
        solve_incompressibility(&mut field, 1. / 60., config.iterations);
        let residual = max_divergence(&field);
        assert!(residual < 1e-2, "residual divergence {residual}");

        // more sweeps leave less divergence behind
        let mut coarse = stirred_field(12, config.overrelax);
        solve_incompressibility(&mut coarse, 1. / 60., 10);
        let coarse_residual = max_divergence(&coarse);
        assert!(
            residual < coarse_residual,
            "{residual} after {} sweeps vs {coarse_residual} after 10",
            config.iterations
        );
    }

    #[test]
    fn test_zero_dt_keeps_pressure_finite() {
        let mut field = stirred_field(8, 1.9);
        solve_incompressibility(&mut field, 0., 20);

        assert!(field.pressure().iter().all(|p| *p == 0.));
        assert!(field.is_finite());
    }

    #[test]
    fn test_walls_stay_closed() {
        let mut field = stirred_field(10, 1.9);
        solve_incompressibility(&mut field, 1. / 60., 50);

        // faces on the domain edge border a solid sentinel and are never touched
        for i in 0..9 {
            assert_eq!(field.u(i, 0), 0.);
            assert_eq!(field.u(i, 9), 0.);
        }
        for j in 0..9 {
            assert_eq!(field.v(0, j), 0.);
            assert_eq!(field.v(9, j), 0.);
        }
    }

    #[test]
    fn test_enclosed_cell_untouched() {
        let mut field = FluidField::new(8, 8, 1.9, 1.0);

        for (i, j) in [(2, 3), (4, 3), (3, 2), (3, 4)] {
            field.set_solid(i, j, true);
        }

        *field.u_mut(3, 3) = 1.0;
        *field.u_mut(3, 4) = -2.0;
        *field.v_mut(3, 3) = 0.5;
        *field.v_mut(4, 3) = 3.0;
        *field.pressure.index_mut((3, 3)) = 7.0;

        relax(&mut field, 0.1);

        assert_eq!(field.u(3, 3), 1.0);
        assert_eq!(field.u(3, 4), -2.0);
        assert_eq!(field.v(3, 3), 0.5);
        assert_eq!(field.v(4, 3), 3.0);
        assert_eq!(field.pressure_at(3, 3), 7.0);
    }

    #[test]
    fn test_solid_cell_skipped() {
        let mut field = FluidField::new(6, 6, 1.9, 1.0);
        field.set_solid(2, 2, true);
        *field.u_mut(2, 2) = 4.0;

        relax(&mut field, 0.1);

        assert_eq!(field.pressure_at(2, 2), 0.);
    }

    #[test]
    fn test_single_cell_pressure() {
        // a single row of three cells with unit spacing
        let mut field = FluidField::new(4, 2, 1.0, 2.0);
        *field.u_mut(0, 1) = 1.0;

        assert_eq!(divergence(&field, 0, 1), -1.0);
        relax(&mut field, 0.5);

        // cell (0,0) only has its right neighbour: s = 1, d = 1, p = 1
        assert_eq!(field.u(0, 1), 0.);
        assert_eq!(field.u(0, 0), 0.);
        assert_eq!(divergence(&field, 0, 0), 0.);
        assert_eq!(divergence(&field, 0, 1), 0.);

        // cp = density * spacing / dt = 2
        assert_eq!(field.pressure_at(0, 0), -2.0);
        assert_eq!(field.pressure_at(0, 1), 0.);
    }
}
