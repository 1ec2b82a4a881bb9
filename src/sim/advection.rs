// Semi-Lagrangian advection of the face velocities and the smoke field

use std::mem;

use crate::{
    ScalarField,
    sim::{
        boundary::{is_open, openness},
        field::FluidField,
    },
};

/// Bilinearly sample `grid` at the fractional position `(x, y)` = (column, row).
/// The position is clamped into the grid first so no drift can index outside
/// it. With `weights` each corner is scaled by that cell's openness, which
/// keeps stale values inside solids out of the result.
///
/// Parameters
/// - `field` - The field whose obstacle mask supplies the corner weights
/// - `grid` - The matrix to sample
/// - `x` - Column coordinate
/// - `y` - Row coordinate
/// - `weighted` - Whether to scale corners by openness
///
/// Returns
/// - The interpolated value
pub fn sample_grid(field: &FluidField, grid: &ScalarField, x: f32, y: f32, weighted: bool) -> f32 {
    let (rows, cols) = grid.shape();
    let (max_x, max_y) = ((cols - 1) as f32, (rows - 1) as f32);

    let x = x.clamp(0., max_x);
    let y = y.clamp(0., max_y);

    // NaN survives the clamp; `as usize` saturates it to zero
    let x0 = (x.floor() as usize).min(cols - 1);
    let y0 = (y.floor() as usize).min(rows - 1);
    let x1 = (x0 + 1).min(cols - 1);
    let y1 = (y0 + 1).min(rows - 1);

    let dx = x - x0 as f32;
    let dy = y - y0 as f32;

    let corner = |r: usize, c: usize| {
        let value = *grid.index((r, c));
        if weighted {
            value * openness(field, r as isize, c as isize)
        } else {
            value
        }
    };

    let v00 = corner(y0, x0);
    let v01 = corner(y1, x0);
    let v10 = corner(y0, x1);
    let v11 = corner(y1, x1);

    (1. - dx) * ((1. - dy) * v00 + dy * v01) + dx * ((1. - dy) * v10 + dy * v11)
}

/// Mean of the four horizontal samples around the top face of cell `(i, j)`
fn avg_u(field: &FluidField, i: usize, j: usize) -> f32 {
    (field.u(i - 1, j) + field.u(i, j) + field.u(i - 1, j + 1) + field.u(i, j + 1)) / 4.
}

/// Mean of the four vertical samples around the left face of cell `(i, j)`
fn avg_v(field: &FluidField, i: usize, j: usize) -> f32 {
    (field.v(i, j - 1) + field.v(i, j) + field.v(i + 1, j - 1) + field.v(i + 1, j)) / 4.
}

/// Advect both velocity components along themselves. Reads only the
/// pre-advection velocities and writes into the scratch buffers, which are
/// swapped in at the end.
pub fn advect_velocity(field: &mut FluidField, dt: f32) {
    field.new_u.copy_from(&field.x_velocity);
    field.new_v.copy_from(&field.y_velocity);

    let h = dt / field.spacing;

    for i in 0..field.size_y() {
        for j in 0..field.size_x() {
            // vertical sample on the top face, between (i-1, j) and (i, j)
            if is_open(field, i, j) && i > 0 && is_open(field, i - 1, j) {
                let x = j as f32 - avg_u(field, i, j) * h;
                let y = i as f32 - field.v(i, j) * h;

                let v = sample_grid(field, &field.y_velocity, x, y, true);
                *field.new_v.index_mut((i, j)) = v;
            }

            // horizontal sample on the left face, between (i, j-1) and (i, j)
            if is_open(field, i, j) && j > 0 && is_open(field, i, j - 1) {
                let x = j as f32 - field.u(i, j) * h;
                let y = i as f32 - avg_v(field, i, j) * h;

                let u = sample_grid(field, &field.x_velocity, x, y, true);
                *field.new_u.index_mut((i, j)) = u;
            }
        }
    }

    mem::swap(&mut field.x_velocity, &mut field.new_u);
    mem::swap(&mut field.y_velocity, &mut field.new_v);
}

/// Advect the smoke through the current velocity field. Corners are not
/// weighted by openness, so smoke may bleed into cells a moving obstacle has
/// just left.
pub fn advect_smoke(field: &mut FluidField, dt: f32) {
    field.old_smoke.copy_from(&field.smoke);

    let h = dt / field.spacing;

    for i in 0..field.cell_rows() {
        for j in 0..field.cell_cols() {
            if !is_open(field, i, j) {
                continue;
            }

            let u = (field.u(i, j) + field.u(i, j + 1)) * 0.5;
            let v = (field.v(i, j) + field.v(i + 1, j)) * 0.5;

            let x = j as f32 - u * h;
            let y = i as f32 - v * h;

            let s = sample_grid(field, &field.old_smoke, x, y, false);
            *field.smoke.index_mut((i, j)) = s;
        }
    }
}
