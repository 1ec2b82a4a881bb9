// Headless driver: moves the obstacle along a scripted path with a fixed timestep

use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    ScalarField,
    preprocessing::RenderedField,
    sim::{fluid::Fluid, obstacle::DragPos},
};

/// Scripted obstacle motion in normalized coordinates
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub enum DragPath {
    /// The obstacle stays put
    Fixed { x: f32, y: f32 },

    /// Circles `center` once every `period` seconds
    Orbit {
        center: (f32, f32),
        radius: f32,
        period: f32,
    },

    /// Goes from `from` to `to` and back once every `period` seconds
    Sweep {
        from: (f32, f32),
        to: (f32, f32),
        period: f32,
    },
}

impl Default for DragPath {
    fn default() -> Self {
        DragPath::Sweep {
            from: (0.2, 0.5),
            to: (0.8, 0.5),
            period: 4.,
        }
    }
}

impl DragPath {
    /// Position of the obstacle at time `t`
    pub fn position(&self, t: f32) -> DragPos {
        match *self {
            DragPath::Fixed { x, y } => DragPos::new(x, y),
            DragPath::Orbit {
                center,
                radius,
                period,
            } => {
                let angle = TAU * t / period;
                DragPos::new(
                    center.0 + radius * angle.cos(),
                    center.1 + radius * angle.sin(),
                )
            }
            DragPath::Sweep { from, to, period } => {
                // triangle wave in [0, 1]
                let phase = (t / period).rem_euclid(1.);
                let k = 1. - (2. * phase - 1.).abs();
                DragPos::new(from.0 + (to.0 - from.0) * k, from.1 + (to.1 - from.1) * k)
            }
        }
    }

    /// Whether the parameters describe a usable path
    pub fn is_valid(&self) -> bool {
        match *self {
            DragPath::Fixed { .. } => true,
            DragPath::Orbit { period, .. } | DragPath::Sweep { period, .. } => period > 0.,
        }
    }
}

/// Copies of the rendered fields for one frame
#[derive(Clone)]
pub struct Snapshot {
    pub smoke: ScalarField,
    pub pressure: ScalarField,
    pub obstacle_mask: ScalarField,
}

impl Snapshot {
    /// The cell-centered values selected for display
    pub fn field(&self, field: RenderedField) -> &ScalarField {
        match field {
            RenderedField::Smoke => &self.smoke,
            RenderedField::Pressure => &self.pressure,
        }
    }
}

/// Runs a fluid with a scripted obstacle until `simtime` is reached,
/// yielding a snapshot and the simulated time after every frame.
pub struct Scenario {
    fluid: Fluid,

    /// Obstacle trajectory; `None` runs without an obstacle
    path: Option<DragPath>,

    /// Obstacle radius in physical units
    radius: f32,

    /// Fixed timestep
    dt: f32,

    /// The total time domain to simulate over
    simtime: f32,

    /// Iteration-counter
    i: usize,

    /// Set once the non-finite warning has been emitted
    warned: bool,
}

impl Scenario {
    pub fn new(fluid: Fluid, path: Option<DragPath>, radius: f32, dt: f32, simtime: f32) -> Self {
        Scenario {
            fluid,
            path,
            radius,
            dt,
            simtime,
            i: 0,
            warned: false,
        }
    }

    /// Number of frames the scenario will produce
    pub fn frame_count(&self) -> usize {
        let n = self.simtime / self.dt;

        // absorb rounding so e.g. 0.5 / 0.05 is ten frames, not eleven
        if (n - n.round()).abs() < 1e-4 {
            n.round() as usize
        } else {
            n.ceil() as usize
        }
    }
}

impl Iterator for Scenario {
    type Item = (Snapshot, f32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.i >= self.frame_count() {
            return None;
        }

        let t = self.fluid.time();

        if let Some(path) = &self.path {
            let prev = path.position(t - self.dt);
            let next = path.position(t);
            self.fluid.inject_obstacle(prev, next, self.radius, self.dt);
        }

        self.fluid.step(self.dt);
        self.i += 1;

        let field = self.fluid.field();
        if !self.warned && !field.is_finite() {
            warn!(
                "Field became non-finite at frame {}; consider a smaller timestep",
                field.frame()
            );
            self.warned = true;
        }

        let snapshot = Snapshot {
            smoke: field.smoke().clone(),
            pressure: field.pressure().clone(),
            obstacle_mask: field.obstacle_mask().clone(),
        };

        Some((snapshot, self.fluid.time()))
    }
}

#[cfg(test)]
mod tests {
    use crate::sim::fluid::SolverConfig;

    use super::*;

    #[test]
    fn test_paths() {
        let fixed = DragPath::Fixed { x: 0.4, y: 0.6 };
        assert_eq!(fixed.position(3.), DragPos::new(0.4, 0.6));

        let sweep = DragPath::Sweep {
            from: (0., 0.5),
            to: (1., 0.5),
            period: 2.,
        };
        assert_eq!(sweep.position(0.), DragPos::new(0., 0.5));
        assert_eq!(sweep.position(1.), DragPos::new(1., 0.5));
        assert_eq!(sweep.position(0.5), DragPos::new(0.5, 0.5));
        assert_eq!(sweep.position(2.), DragPos::new(0., 0.5));

        let orbit = DragPath::Orbit {
            center: (0.5, 0.5),
            radius: 0.25,
            period: 1.,
        };
        let p = orbit.position(0.);
        assert!((p.x - 0.75).abs() < 1e-6 && (p.y - 0.5).abs() < 1e-6);
        let p = orbit.position(0.25);
        assert!((p.x - 0.5).abs() < 1e-6 && (p.y - 0.75).abs() < 1e-6);

        assert!(!DragPath::Orbit { center: (0.5, 0.5), radius: 0.1, period: 0. }.is_valid());
    }

    #[test]
    fn test_scenario_runs_to_simtime() {
        let config = SolverConfig {
            iterations: 20,
            gravity: 0.,
            ..SolverConfig::default()
        };
        let fluid = Fluid::new(24, 16, 1.0, config);
        let scenario = Scenario::new(fluid, Some(DragPath::default()), 0.1, 0.05, 0.5);

        assert_eq!(scenario.frame_count(), 10);

        let frames: Vec<(Snapshot, f32)> = scenario.collect();
        assert_eq!(frames.len(), 10);

        let (last, t) = frames.last().unwrap();
        assert!((t - 0.5).abs() < 1e-5);
        assert_eq!(last.smoke.shape(), (15, 23));
        assert!(last.obstacle_mask.iter().any(|s| *s == 0.));
    }

    #[test]
    fn test_scenario_without_obstacle() {
        let config = SolverConfig {
            gravity: 0.,
            ..SolverConfig::default()
        };
        let fluid = Fluid::new(10, 10, 1.0, config);
        let mut scenario = Scenario::new(fluid, None, 0.1, 0.1, 0.3);

        let (snapshot, _) = scenario.next().unwrap();
        assert!(snapshot.obstacle_mask.iter().all(|s| *s == 1.));
        assert!(snapshot.smoke.iter().all(|s| *s == 1.));
    }
}
