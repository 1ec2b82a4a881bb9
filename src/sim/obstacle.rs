// Moving circular obstacle driven by drag events

use serde::{Deserialize, Serialize};

use crate::sim::field::FluidField;

/// Drag speeds at or below this are not stamped into the velocity field
pub const STAMP_DEADBAND: f32 = 0.1;

/// Rate of the cosmetic smoke pulse painted inside the obstacle
const SMOKE_PULSE_RATE: f32 = 0.01;

/// A point in normalized domain coordinates; `(0, 0)` is the top-left
/// corner, `(1, 1)` the bottom-right.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Default)]
pub struct DragPos {
    pub x: f32,
    pub y: f32,
}

impl DragPos {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Smoke value painted inside the obstacle on a given frame
pub fn smoke_pulse(frame: u64) -> f32 {
    0.5 + 0.5 * (frame as f32 * SMOKE_PULSE_RATE).sin()
}

/// Velocity implied by dragging from `prev` to `next` over `dt`. Both axes
/// scale by the physical height of the domain. A non-positive `dt` gives no
/// motion.
pub fn drag_velocity(field: &FluidField, prev: DragPos, next: DragPos, dt: f32) -> (f32, f32) {
    if dt <= 0. {
        return (0., 0.);
    }

    let scale = field.spacing() * field.size_y() as f32 / dt;
    ((next.x - prev.x) * scale, (next.y - prev.y) * scale)
}

/// Rebuild the obstacle mask for a ball of `radius` (physical units) at
/// `next` and push its drag velocity into the faces of the covered cells.
///
/// The whole mask is cleared first, so only one obstacle exists at a time.
///
/// Parameters
/// - `field` - The field to modify
/// - `prev` - The drag position on the previous frame
/// - `next` - The current drag position
/// - `radius` - Ball radius in physical units
/// - `dt` - Time between the two positions
pub fn inject_obstacle(field: &mut FluidField, prev: DragPos, next: DragPos, radius: f32, dt: f32) {
    let (vx, vy) = drag_velocity(field, prev, next, dt);

    let h = field.spacing();
    let center_x = next.x * field.size_x() as f32 * h;
    let center_y = next.y * field.size_y() as f32 * h;
    let pulse = smoke_pulse(field.frame());

    field.obstacle_mask.fill(1.);

    for i in 0..field.cell_rows() {
        for j in 0..field.cell_cols() {
            let dx = (j as f32 + 0.5) * h - center_x;
            let dy = (i as f32 + 0.5) * h - center_y;

            if dx * dx + dy * dy >= radius * radius {
                continue;
            }

            field.set_solid(i, j, true);

            if vx.abs() > STAMP_DEADBAND {
                *field.u_mut(i, j) = vx;
                *field.u_mut(i, j + 1) = vx;
            }
            if vy.abs() > STAMP_DEADBAND {
                *field.v_mut(i, j) = vy;
                *field.v_mut(i + 1, j) = vy;
            }

            *field.smoke_mut(i, j) = pulse;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_cells(field: &FluidField) -> Vec<(usize, usize)> {
        let mut cells = Vec::new();
        for i in 0..field.cell_rows() {
            for j in 0..field.cell_cols() {
                if *field.obstacle_mask().index((i, j)) == 0. {
                    cells.push((i, j));
                }
            }
        }
        cells
    }

    #[test]
    fn test_stationary_drag_deadband() {
        let mut field = FluidField::new(21, 21, 1.9, 1.0);
        *field.u_mut(10, 10) = 0.3;
        *field.v_mut(10, 10) = -0.7;

        let pos = DragPos::new(0.5, 0.5);
        assert_eq!(drag_velocity(&field, pos, pos, 0.016), (0., 0.));

        inject_obstacle(&mut field, pos, pos, 0.1, 0.016);
        let first_cells = solid_cells(&field);
        let first_smoke = field.smoke_at(10, 10);

        inject_obstacle(&mut field, pos, pos, 0.1, 0.016);

        assert!(!first_cells.is_empty());
        assert_eq!(solid_cells(&field), first_cells);
        assert_eq!(field.u(10, 10), 0.3);
        assert_eq!(field.v(10, 10), -0.7);
        assert_eq!(field.smoke_at(10, 10), first_smoke);
        assert_eq!(first_smoke, smoke_pulse(0));
    }

    #[test]
    fn test_covers_cells_within_radius() {
        let mut field = FluidField::new(11, 11, 1.9, 1.0);
        let h = field.spacing();
        let pos = DragPos::new(0.5, 0.5);
        let radius = 0.15;

        inject_obstacle(&mut field, pos, pos, radius, 0.1);

        for i in 0..10 {
            for j in 0..10 {
                let dx = (j as f32 + 0.5) * h - 0.5 * 11. * h;
                let dy = (i as f32 + 0.5) * h - 0.5 * 11. * h;
                let inside = dx * dx + dy * dy < radius * radius;
                let expected = if inside { 0. } else { 1. };
                assert_eq!(*field.obstacle_mask().index((i, j)), expected);
            }
        }
    }

    #[test]
    fn test_moving_drag_stamps_faces() {
        let mut field = FluidField::new(21, 21, 1.9, 1.0);
        let prev = DragPos::new(0.45, 0.5);
        let next = DragPos::new(0.5, 0.5);
        let dt = 0.1;

        let (vx, vy) = drag_velocity(&field, prev, next, dt);
        assert!(vx > STAMP_DEADBAND);
        assert_eq!(vy, 0.);

        inject_obstacle(&mut field, prev, next, 0.08, dt);

        for (i, j) in solid_cells(&field) {
            assert_eq!(field.u(i, j), vx);
            assert_eq!(field.u(i, j + 1), vx);
            assert_eq!(field.v(i, j), 0.);
            assert_eq!(field.v(i + 1, j), 0.);
        }
    }

    #[test]
    fn test_mask_cleared_on_move() {
        let mut field = FluidField::new(21, 21, 1.9, 1.0);
        let left = DragPos::new(0.2, 0.5);
        let right = DragPos::new(0.8, 0.5);

        inject_obstacle(&mut field, left, left, 0.1, 0.1);
        let left_cells = solid_cells(&field);

        inject_obstacle(&mut field, left, right, 0.1, 0.1);
        let right_cells = solid_cells(&field);

        assert!(!left_cells.is_empty());
        assert!(!right_cells.is_empty());
        assert!(left_cells.iter().all(|c| !right_cells.contains(c)));
    }

    #[test]
    fn test_zero_dt_has_no_velocity() {
        let field = FluidField::new(8, 8, 1.9, 1.0);
        let v = drag_velocity(&field, DragPos::new(0., 0.), DragPos::new(1., 1.), 0.);
        assert_eq!(v, (0., 0.));
    }
}
