// Obstacle-mask lookups that treat the domain edge as a solid wall

use crate::sim::field::FluidField;

/// Openness of cell `(i, j)`: the mask value inside the cell grid, and `0`
/// (solid) for any index outside it. Lets callers read neighbours blindly.
pub fn openness(field: &FluidField, i: isize, j: isize) -> f32 {
    if i < 0 || j < 0 {
        return 0.;
    }

    let (i, j) = (i as usize, j as usize);
    if i >= field.cell_rows() || j >= field.cell_cols() {
        return 0.;
    }

    *field.obstacle_mask.index((i, j))
}

/// `openness` for callers holding unsigned indices
pub fn is_open(field: &FluidField, i: usize, j: usize) -> bool {
    openness(field, i as isize, j as isize) != 0.
}
