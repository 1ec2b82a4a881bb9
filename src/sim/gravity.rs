// External acceleration on the vertical velocity samples

use crate::sim::{boundary::is_open, field::FluidField};

/// Standard gravitational acceleration (m/s²)
pub const GRAVITY: f32 = 9.81;

/// Accelerate every interior vertical sample whose cell and vertical
/// neighbours are all open. A positive `gravity` pulls toward larger row
/// indices (downward).
///
/// Parameters
/// - `field` - The field to mutate
/// - `dt` - The timestep
/// - `gravity` - The acceleration to apply
pub fn apply_gravity(field: &mut FluidField, dt: f32, gravity: f32) {
    let (size_x, size_y) = (field.size_x(), field.size_y());

    for i in 1..(size_y - 1) {
        for j in 1..(size_x - 1) {
            if is_open(field, i, j) && is_open(field, i - 1, j) && is_open(field, i + 1, j) {
                *field.v_mut(i, j) += dt * gravity;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gravity_delta() {
        let mut field = FluidField::new(4, 4, 1.9, 1.0);
        let dt = 0.1;

        apply_gravity(&mut field, dt, GRAVITY);

        for i in 0..4 {
            for j in 0..4 {
                // qualifying samples need rows i-1, i, i+1 inside the 3x3 cell grid
                let qualifies = i == 1 && (1..=2).contains(&j);
                let expected = if qualifies { dt * GRAVITY } else { 0. };

                assert_eq!(field.v(i, j), expected, "sample ({i}, {j})");
                assert_eq!(field.u(i, j), 0.);
            }
        }
    }

    #[test]
    fn test_skips_samples_next_to_solid() {
        let mut field = FluidField::new(8, 8, 1.9, 1.0);
        field.set_solid(3, 3, true);

        apply_gravity(&mut field, 1.0, GRAVITY);

        // (2,3), (3,3), (4,3) all touch the solid cell vertically
        assert_eq!(field.v(2, 3), 0.);
        assert_eq!(field.v(3, 3), 0.);
        assert_eq!(field.v(4, 3), 0.);
        assert_eq!(field.v(3, 2), GRAVITY);
        assert_eq!(field.v(5, 3), GRAVITY);
    }
}
